use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
    UnauthorizedResponse,
};
use crate::{core::utils::datetime_to_string_opt, model::notification::Notification};

#[derive(Object, Deserialize, Serialize, Debug, PartialEq)]
#[oai(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub recipient_role: String,
    pub recipient_id: Option<String>,
    #[oai(rename = "type")]
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    #[oai(rename = "read")]
    #[serde(rename = "read")]
    pub is_read: bool,
    pub created_at: Option<String>,
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
}

impl From<Notification> for NotificationResponse {
    fn from(item: Notification) -> Self {
        Self {
            id: item.id.to_string(),
            recipient_role: item.recipient_role,
            recipient_id: item.recipient_id.map(|x| x.to_string()),
            notification_type: item.notification_type,
            title: item.title,
            message: item.message,
            is_read: item.is_read,
            created_at: datetime_to_string_opt(item.created_date),
            employee_id: item.employee_id,
            employee_name: item.employee_name,
        }
    }
}

#[derive(Object, Deserialize, Serialize)]
#[oai(rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub struct NotificationCreateRequest {
    pub recipient_role: String,
    pub recipient_id: Option<String>,
    #[oai(rename = "type")]
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(ApiResponse)]
pub enum NotificationListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<NotificationResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum NotificationCountResponses {
    #[oai(status = 200)]
    Ok(Json<CountResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum NotificationCreateResponses {
    #[oai(status = 201)]
    Ok(Json<NotificationResponse>),

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
pub enum NotificationReadResponses {
    #[oai(status = 200)]
    Ok(Json<NotificationResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
