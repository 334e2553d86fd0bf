use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::{
        security::{get_user_from_token, BearerAuthorization},
        sqlx_utils::clamp_page_size,
        utils::parse_datetime,
        validation::{one_of, require, ValidationError},
    },
    model::{
        job::{JOB_STATUSES, JOB_TYPES, STATUS_OPEN},
        user::UserRole,
    },
    repository::{
        job::{
            create_job, get_job_by_id, paginate_job, soft_delete_job, update_job, JobData,
            JobFilter,
        },
        job_application::get_applications_by_job,
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            PaginateResponse, UnauthorizedResponse,
        },
        job::{
            JobApplicationsResponses, JobCreateResponses, JobDeleteResponses, JobDetailResponses,
            JobRequest, JobUpdateResponses, PaginateJobResponses,
        },
    },
    AppState,
};

/// Validates the job form and normalises it into repository input.
pub fn job_data_from_request(json: JobRequest) -> Result<JobData, ValidationError> {
    require("title", &json.title)?;
    require("description", &json.description)?;
    require("department", &json.department)?;
    one_of("job_type", &json.job_type, &JOB_TYPES)?;
    let status = json.status.unwrap_or(STATUS_OPEN.to_string());
    one_of("status", &status, &JOB_STATUSES)?;
    let deadline = match json.deadline.filter(|x| !x.trim().is_empty()) {
        Some(val) => Some(parse_datetime(&val).ok_or(ValidationError::InvalidDate("deadline"))?),
        None => None,
    };
    Ok(JobData {
        title: json.title.trim().to_string(),
        description: json.description,
        qualifications: json.qualifications.unwrap_or_default(),
        department: json.department.trim().to_string(),
        location: json.location.unwrap_or_default(),
        job_type: json.job_type,
        salary: json.salary,
        status,
        deadline,
    })
}

#[derive(Tags)]
enum ApiJobTags {
    Job,
}

pub struct ApiJob;

#[OpenApi]
impl ApiJob {
    #[oai(path = "/job/", method = "get", tag = "ApiJobTags::Job")]
    #[allow(clippy::too_many_arguments)]
    async fn paginate_job_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        Query(status): Query<Option<String>>,
        Query(job_type): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateJobResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PaginateJobResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "paginate_job_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return PaginateJobResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "paginate_job_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return PaginateJobResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "paginate_job_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return PaginateJobResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Admin]) {
            return PaginateJobResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let page = page.unwrap_or(1).max(1);
        let page_size = clamp_page_size(page_size);
        let filter = JobFilter {
            search,
            status,
            job_type,
        };
        let (data, counts, page_count) =
            match paginate_job(&mut tx, page, page_size, filter).await {
                Ok(val) => val,
                Err(err) => {
                    return PaginateJobResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.job",
                            "paginate_job_api",
                            "paginate_job",
                            &err.to_string(),
                        ),
                    ))
                }
            };

        PaginateJobResponses::Ok(Json(PaginateResponse {
            counts,
            page,
            page_count,
            page_size,
            results: data.into_iter().map(|x| x.into()).collect(),
        }))
    }

    #[oai(path = "/job/detail/", method = "get", tag = "ApiJobTags::Job")]
    async fn detail_job_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> JobDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return JobDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "detail_job_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return JobDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "detail_job_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return JobDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "detail_job_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return JobDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Admin]) {
            return JobDetailResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let Ok(job_id) = Uuid::parse_str(&id) else {
            return JobDetailResponses::NotFound(Json(NotFoundResponse::new(format!(
                "job with id = {} not found",
                id
            ))));
        };
        match get_job_by_id(&mut tx, &job_id).await {
            Ok(Some(val)) => JobDetailResponses::Ok(Json(val.into())),
            Ok(None) => JobDetailResponses::NotFound(Json(NotFoundResponse::new(format!(
                "job with id = {} not found",
                id
            )))),
            Err(err) => JobDetailResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.job",
                    "detail_job_api",
                    "get_job_by_id",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/job/", method = "post", tag = "ApiJobTags::Job")]
    async fn create_job_api(
        &self,
        json: Json<JobRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> JobCreateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return JobCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "create_job_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return JobCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "create_job_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return JobCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "create_job_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return JobCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Admin]) {
            return JobCreateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let data = match job_data_from_request(json.0) {
            Ok(val) => val,
            Err(err) => {
                return JobCreateResponses::BadRequest(Json(BadRequestResponse::new(
                    err.to_string(),
                )))
            }
        };
        let job = match create_job(&mut tx, None, data, &user, None).await {
            Ok(val) => val,
            Err(err) => {
                return JobCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "create_job_api",
                        "create_job",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return JobCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.job",
                    "create_job_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        JobCreateResponses::Ok(Json(job.into()))
    }

    #[oai(path = "/job/", method = "put", tag = "ApiJobTags::Job")]
    async fn update_job_api(
        &self,
        Query(id): Query<String>,
        json: Json<JobRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> JobUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return JobUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "update_job_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return JobUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "update_job_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return JobUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "update_job_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return JobUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Admin]) {
            return JobUpdateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let Ok(job_id) = Uuid::parse_str(&id) else {
            return JobUpdateResponses::NotFound(Json(NotFoundResponse::new(format!(
                "job with id = {} not found",
                id
            ))));
        };
        let job = match get_job_by_id(&mut tx, &job_id).await {
            Ok(val) => val,
            Err(err) => {
                return JobUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "update_job_api",
                        "get_job_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(mut job) = job else {
            return JobUpdateResponses::NotFound(Json(NotFoundResponse::new(format!(
                "job with id = {} not found",
                id
            ))));
        };

        let data = match job_data_from_request(json.0) {
            Ok(val) => val,
            Err(err) => {
                return JobUpdateResponses::BadRequest(Json(BadRequestResponse::new(
                    err.to_string(),
                )))
            }
        };
        if let Err(err) = update_job(&mut tx, &mut job, data, &user, None).await {
            return JobUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.job",
                    "update_job_api",
                    "update_job",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return JobUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.job",
                    "update_job_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        JobUpdateResponses::Ok(Json(job.into()))
    }

    #[oai(path = "/job/", method = "delete", tag = "ApiJobTags::Job")]
    async fn delete_job_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> JobDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return JobDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "delete_job_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return JobDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "delete_job_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return JobDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "delete_job_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return JobDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Admin]) {
            return JobDeleteResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let Ok(job_id) = Uuid::parse_str(&id) else {
            return JobDeleteResponses::NotFound(Json(NotFoundResponse::new(format!(
                "job with id = {} not found",
                id
            ))));
        };
        let job = match get_job_by_id(&mut tx, &job_id).await {
            Ok(val) => val,
            Err(err) => {
                return JobDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "delete_job_api",
                        "get_job_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(mut job) = job else {
            return JobDeleteResponses::NotFound(Json(NotFoundResponse::new(format!(
                "job with id = {} not found",
                id
            ))));
        };

        if let Err(err) = soft_delete_job(&mut tx, &mut job, &user, None).await {
            return JobDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.job",
                    "delete_job_api",
                    "soft_delete_job",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return JobDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.job",
                    "delete_job_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        JobDeleteResponses::NoContent
    }

    #[oai(path = "/job/applications/", method = "get", tag = "ApiJobTags::Job")]
    async fn job_applications_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> JobApplicationsResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return JobApplicationsResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "job_applications_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return JobApplicationsResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "job_applications_api",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return JobApplicationsResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "job_applications_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return JobApplicationsResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Admin]) {
            return JobApplicationsResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let Ok(job_id) = Uuid::parse_str(&id) else {
            return JobApplicationsResponses::NotFound(Json(NotFoundResponse::new(format!(
                "job with id = {} not found",
                id
            ))));
        };
        match get_job_by_id(&mut tx, &job_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return JobApplicationsResponses::NotFound(Json(NotFoundResponse::new(format!(
                    "job with id = {} not found",
                    id
                ))))
            }
            Err(err) => {
                return JobApplicationsResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.job",
                        "job_applications_api",
                        "get_job_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        }
        match get_applications_by_job(&mut tx, &job_id).await {
            Ok(data) => {
                JobApplicationsResponses::Ok(Json(data.into_iter().map(|x| x.into()).collect()))
            }
            Err(err) => JobApplicationsResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.job",
                    "job_applications_api",
                    "get_applications_by_job",
                    &err.to_string(),
                ),
            )),
        }
    }
}
