use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::{
    application::ApplicationResponse,
    common::{
        BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
        PaginateResponse, UnauthorizedResponse,
    },
};
use crate::{core::utils::datetime_to_string_opt, model::job::Job};

#[derive(Object, Deserialize, Serialize, Debug, PartialEq)]
pub struct JobResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub qualifications: String,
    pub department: String,
    pub location: String,
    pub job_type: String,
    pub salary: Option<String>,
    pub status: String,
    pub deadline: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id.to_string(),
            title: job.title,
            description: job.description,
            qualifications: job.qualifications,
            department: job.department,
            location: job.location,
            job_type: job.job_type,
            salary: job.salary,
            status: job.status,
            deadline: datetime_to_string_opt(job.deadline),
            created_at: datetime_to_string_opt(job.created_date),
            updated_at: datetime_to_string_opt(job.updated_date),
        }
    }
}

/// Body of the job creation and update forms.
#[derive(Object, Deserialize, Serialize)]
pub struct JobRequest {
    pub title: String,
    pub description: String,
    pub qualifications: Option<String>,
    pub department: String,
    pub location: Option<String>,
    pub job_type: String,
    pub salary: Option<String>,
    pub status: Option<String>,
    /// `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or RFC 3339.
    pub deadline: Option<String>,
}

#[derive(ApiResponse)]
pub enum PaginateJobResponses {
    #[oai(status = 200)]
    Ok(Json<PaginateResponse<JobResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 403)]
    Forbidden(Json<ForbiddenResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum JobDetailResponses {
    #[oai(status = 200)]
    Ok(Json<JobResponse>),

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
pub enum JobCreateResponses {
    #[oai(status = 201)]
    Ok(Json<JobResponse>),

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
pub enum JobUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<JobResponse>),

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
pub enum JobDeleteResponses {
    #[oai(status = 204)]
    NoContent,

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
pub enum JobApplicationsResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<ApplicationResponse>>),

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
pub enum PublicJobListResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<JobResponse>>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum PublicJobDetailResponses {
    #[oai(status = 200)]
    Ok(Json<JobResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
