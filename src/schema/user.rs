use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
    PaginateResponse, UnauthorizedResponse,
};
use crate::{core::utils::datetime_to_string_opt, model::user::User};

/// Public view of a user, the password hash is never exposed.
#[derive(Object, Deserialize, Serialize, Debug, PartialEq)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    #[oai(rename = "username")]
    #[serde(rename = "username")]
    pub user_name: String,
    pub role: String,
    pub status: String,
    pub created_at: Option<String>,
    pub last_login: Option<String>,
    pub district: Option<String>,
    pub branch: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            user_name: user.user_name,
            role: user.role,
            status: user.status,
            created_at: datetime_to_string_opt(user.created_date),
            last_login: datetime_to_string_opt(user.last_login),
            district: user.district,
            branch: user.branch,
            avatar_url: user.avatar_url,
        }
    }
}

#[derive(ApiResponse)]
pub enum PaginateUserResponses {
    #[oai(status = 200)]
    Ok(Json<PaginateResponse<UserResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum UserDetailResponses {
    #[oai(status = 200)]
    Ok(Json<UserResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct UserCreateRequest {
    pub name: String,
    pub email: String,
    #[oai(rename = "username")]
    #[serde(rename = "username")]
    pub user_name: String,
    pub password: String,
    pub role: String,
    pub status: Option<String>,
    pub district: Option<String>,
    pub branch: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(ApiResponse)]
pub enum UserCreateResponses {
    #[oai(status = 201)]
    Ok(Json<UserResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize, Serialize)]
pub struct UserStatusRequest {
    pub status: String,
}

#[derive(ApiResponse)]
pub enum UserStatusResponses {
    #[oai(status = 200)]
    Ok(Json<UserResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum UserDeleteResponses {
    #[oai(status = 204)]
    NoContent,

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
