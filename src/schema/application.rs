use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::{
    common::{
        BadRequestResponse, ConflictResponse, ForbiddenResponse, GoneResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    job::JobResponse,
};
use crate::{
    core::utils::{datetime_to_string, datetime_to_string_opt},
    model::{application_link::ApplicationLink, job_application::JobApplication},
};

/// Applicant details shared by the public and the secure-link forms.
#[derive(Object, Deserialize, Serialize, Clone)]
pub struct ApplicantRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub other_experience: Option<String>,
    pub other_experience_years: Option<i32>,
    pub resume_url: Option<String>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct PublicApplicationRequest {
    pub job_id: String,
    #[oai(flatten)]
    #[serde(flatten)]
    pub applicant: ApplicantRequest,
}

#[derive(Object, Deserialize, Serialize, Debug, PartialEq)]
pub struct ApplicationResponse {
    pub id: String,
    pub job_id: String,
    pub application_type: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub other_experience: Option<String>,
    pub other_experience_years: Option<i32>,
    pub resume_url: Option<String>,
    pub matched_employee_id: Option<i32>,
    pub promotion_status: Option<String>,
    pub status: String,
    pub created_at: Option<String>,
}

impl From<JobApplication> for ApplicationResponse {
    fn from(item: JobApplication) -> Self {
        Self {
            id: item.id.to_string(),
            job_id: item.job_id.to_string(),
            application_type: item.application_type,
            first_name: item.first_name,
            last_name: item.last_name,
            email: item.email,
            phone: item.phone,
            other_experience: item.other_experience,
            other_experience_years: item.other_experience_years,
            resume_url: item.resume_url,
            matched_employee_id: item.matched_employee_id,
            promotion_status: item.promotion_status,
            status: item.status,
            created_at: datetime_to_string_opt(item.created_date),
        }
    }
}

#[derive(Object, Deserialize, Serialize, Debug, PartialEq)]
pub struct ApplicationLinkResponse {
    pub id: String,
    pub job_id: String,
    pub link_type: String,
    pub token: String,
    pub url: String,
    pub expires_at: String,
    pub is_used: bool,
    pub created_at: Option<String>,
}

impl ApplicationLinkResponse {
    pub fn new(link: ApplicationLink, base_url: &str) -> Self {
        Self {
            id: link.id.to_string(),
            job_id: link.job_id.to_string(),
            url: format!(
                "{}/apply/{}/{}",
                base_url.trim_end_matches('/'),
                link.link_type,
                link.token
            ),
            link_type: link.link_type,
            token: link.token,
            expires_at: datetime_to_string(link.expires_at),
            is_used: link.is_used,
            created_at: datetime_to_string_opt(link.created_date),
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
pub struct SecureLinkResponse {
    pub job: JobResponse,
    pub link_type: String,
    pub expires_at: String,
}

#[derive(ApiResponse)]
pub enum ApplyResponses {
    #[oai(status = 201)]
    Ok(Json<ApplicationResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum ApplicationListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<ApplicationResponse>>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum ApplicationLinksResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<ApplicationLinkResponse>>),

    #[oai(status = 201)]
    Created(Json<Vec<ApplicationLinkResponse>>),

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
pub enum SecureLinkResponses {
    #[oai(status = 200)]
    Ok(Json<SecureLinkResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 409)]
    Conflict(Json<ConflictResponse>),

    #[oai(status = 410)]
    Gone(Json<GoneResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum SecureApplyResponses {
    #[oai(status = 201)]
    Ok(Json<ApplicationResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 409)]
    Conflict(Json<ConflictResponse>),

    #[oai(status = 410)]
    Gone(Json<GoneResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
