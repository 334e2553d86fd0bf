use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

use super::common::{
    BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
    PaginateResponse, UnauthorizedResponse,
};
use crate::{
    core::utils::{date_to_string, date_to_string_opt},
    model::employee::Employee,
};

#[derive(Object, Deserialize, Serialize, Debug, PartialEq)]
pub struct EmployeeResponse {
    pub id: i32,
    pub file_number: String,
    pub full_name: String,
    pub sex: String,
    pub employment_date: String,
    pub last_dop: Option<String>,
    pub job_grade: String,
    pub job_category: String,
    pub current_position: String,
    pub branch: String,
    pub department: String,
    pub district: String,
    pub region: String,
    pub field_of_study: String,
    pub educational_level: String,
    pub twin_branch: Option<String>,
    pub cluster: Option<String>,
    pub individual_pms: Option<f64>,
    pub total: Option<f64>,
}

impl From<Employee> for EmployeeResponse {
    fn from(item: Employee) -> Self {
        Self {
            id: item.id,
            file_number: item.file_number,
            full_name: item.full_name,
            sex: item.sex,
            employment_date: date_to_string(item.employment_date),
            last_dop: date_to_string_opt(item.last_dop),
            job_grade: item.job_grade,
            job_category: item.job_category,
            current_position: item.current_position,
            branch: item.branch,
            department: item.department,
            district: item.district,
            region: item.region,
            field_of_study: item.field_of_study,
            educational_level: item.educational_level,
            twin_branch: item.twin_branch,
            cluster: item.cluster,
            individual_pms: item.individual_pms,
            total: item.total,
        }
    }
}

/// Score breakdown of an employee's promotion evaluation.
#[derive(Object, Deserialize, Serialize, Debug, PartialEq)]
pub struct EvaluationResponse {
    pub id: i32,
    pub full_name: String,
    pub district: String,
    pub individual_pms: Option<f64>,
    pub indpms25: Option<f64>,
    pub totalexp: Option<i32>,
    pub totalexp20: Option<f64>,
    pub relatedexp: Option<i32>,
    pub expafterpromo: Option<f64>,
    pub tmdrec20: Option<f64>,
    pub disrec15: Option<f64>,
    pub total: Option<f64>,
}

impl From<Employee> for EvaluationResponse {
    fn from(item: Employee) -> Self {
        Self {
            id: item.id,
            full_name: item.full_name,
            district: item.district,
            individual_pms: item.individual_pms,
            indpms25: item.indpms25,
            totalexp: item.totalexp,
            totalexp20: item.totalexp20,
            relatedexp: item.relatedexp,
            expafterpromo: item.expafterpromo,
            tmdrec20: item.tmdrec20,
            disrec15: item.disrec15,
            total: item.total,
        }
    }
}

#[derive(Object, Deserialize, Serialize, Clone)]
pub struct EmployeeRequest {
    pub id: i32,
    pub file_number: String,
    pub full_name: String,
    pub sex: String,
    /// `YYYY-MM-DD`
    pub employment_date: String,
    pub last_dop: Option<String>,
    pub job_grade: Option<String>,
    pub job_category: Option<String>,
    pub current_position: Option<String>,
    pub branch: Option<String>,
    pub department: Option<String>,
    pub district: Option<String>,
    pub region: Option<String>,
    pub field_of_study: Option<String>,
    pub educational_level: Option<String>,
    pub twin_branch: Option<String>,
    pub cluster: Option<String>,
    pub individual_pms: Option<f64>,
}

#[derive(Object, Deserialize, Serialize)]
pub struct ScoreRequest {
    pub score: f64,
}

#[derive(ApiResponse)]
pub enum PaginateEmployeeResponses {
    #[oai(status = 200)]
    Ok(Json<PaginateResponse<EmployeeResponse>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum EmployeeDetailResponses {
    #[oai(status = 200)]
    Ok(Json<EmployeeResponse>),

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
pub enum EmployeeSaveResponses {
    #[oai(status = 200)]
    Ok(Json<EmployeeResponse>),

    #[oai(status = 201)]
    Created(Json<EmployeeResponse>),

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
pub enum EvaluationResponses {
    #[oai(status = 200)]
    Ok(Json<EvaluationResponse>),

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
