use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local};
use poem::web::Data;
use poem_openapi::{
    param::{Path, Query},
    payload::Json,
    OpenApi, Tags,
};
use sqlx::{Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::{
    core::{
        utils::datetime_to_string,
        validation::{one_of, require, ValidationError},
    },
    model::{
        application_link::LinkState,
        job::{Job, JOB_TYPES},
        job_application::{JobApplication, TYPE_EXTERNAL, TYPE_INTERNAL},
        user::UserRole,
    },
    repository::{
        application_link::{get_application_link_by_token, mark_application_link_used},
        employee::get_employees_by_full_name,
        job::{get_job_by_id, get_open_jobs},
        job_application::{create_application, ApplicationData},
        notification::{create_notification, NotificationData},
    },
    schema::{
        application::{
            ApplicantRequest, ApplyResponses, PublicApplicationRequest, SecureApplyResponses,
            SecureLinkResponse, SecureLinkResponses,
        },
        common::{
            BadRequestResponse, ConflictResponse, GoneResponse, InternalServerErrorResponse,
            NotFoundResponse,
        },
        job::{PublicJobDetailResponses, PublicJobListResponses},
    },
    AppState,
};

fn validate_applicant(applicant: &ApplicantRequest) -> Result<(), ValidationError> {
    require("first_name", &applicant.first_name)?;
    require("last_name", &applicant.last_name)?;
    if let Some(years) = applicant.other_experience_years {
        if years < 0 {
            return Err(ValidationError::NotPositive("other_experience_years"));
        }
    }
    Ok(())
}

/// Stores an application for `job` and notifies the admins.
///
/// Internal applicants are matched against the employee register by full
/// name; the first match is attached to the application.
pub async fn submit_application(
    tx: &mut Transaction<'_, Postgres>,
    job: &Job,
    application_type: &str,
    applicant: ApplicantRequest,
    now: DateTime<FixedOffset>,
) -> anyhow::Result<JobApplication> {
    let data = ApplicationData {
        job_id: job.id,
        application_type: application_type.to_string(),
        first_name: applicant.first_name.trim().to_string(),
        last_name: applicant.last_name.trim().to_string(),
        email: applicant.email,
        phone: applicant.phone,
        other_experience: applicant.other_experience,
        other_experience_years: applicant.other_experience_years,
        resume_url: applicant.resume_url,
    };
    let full_name = format!("{} {}", data.first_name, data.last_name);

    let mut matched = None;
    if application_type == TYPE_INTERNAL {
        let employees = get_employees_by_full_name(tx, &full_name).await?;
        matched = employees.into_iter().next();
    }

    let application =
        create_application(tx, data, matched.as_ref().map(|x| x.id), Some(now)).await?;
    info!(
        "application {} for job {} submitted ({})",
        application.id, job.id, application_type
    );

    create_notification(
        tx,
        NotificationData {
            recipient_role: UserRole::Admin.to_string(),
            recipient_id: None,
            notification_type: "application".to_string(),
            title: "New job application".to_string(),
            message: format!(
                "{} submitted an {} application for {}",
                application.full_name(),
                application_type,
                job.title
            ),
            employee_id: matched.as_ref().map(|x| x.id.to_string()),
            employee_name: matched.map(|x| x.full_name),
        },
        Some(now),
    )
    .await?;
    Ok(application)
}

#[derive(Tags)]
enum ApiPublicTags {
    Public,
}

pub struct ApiPublic;

#[OpenApi]
impl ApiPublic {
    #[oai(path = "/public/job/", method = "get", tag = "ApiPublicTags::Public")]
    async fn public_job_list_api(
        &self,
        Query(job_type): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
    ) -> PublicJobListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PublicJobListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.public",
                        "public_job_list_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        if let Some(job_type) = &job_type {
            if let Err(err) = one_of("job_type", job_type, &JOB_TYPES) {
                return PublicJobListResponses::BadRequest(Json(BadRequestResponse::new(
                    err.to_string(),
                )));
            }
        }
        let now = Local::now().fixed_offset();
        match get_open_jobs(&mut tx, job_type, now).await {
            Ok(data) => {
                PublicJobListResponses::Ok(Json(data.into_iter().map(|x| x.into()).collect()))
            }
            Err(err) => PublicJobListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.public",
                    "public_job_list_api",
                    "get_open_jobs",
                    &err.to_string(),
                ),
            )),
        }
    }

    /// Job shown on the public application page `/job-apply/{id}`.
    #[oai(path = "/public/job/:id", method = "get", tag = "ApiPublicTags::Public")]
    async fn public_job_detail_api(
        &self,
        Path(id): Path<String>,
        state: Data<&Arc<AppState>>,
    ) -> PublicJobDetailResponses {
        let id = id.trim();
        if id.is_empty() {
            return PublicJobDetailResponses::BadRequest(Json(BadRequestResponse::new(
                "job id is required",
            )));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PublicJobDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.public",
                        "public_job_detail_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        let Ok(job_id) = Uuid::parse_str(id) else {
            return PublicJobDetailResponses::NotFound(Json(NotFoundResponse::new(format!(
                "job with id = {} not found",
                id
            ))));
        };
        match get_job_by_id(&mut tx, &job_id).await {
            Ok(Some(val)) => PublicJobDetailResponses::Ok(Json(val.into())),
            Ok(None) => PublicJobDetailResponses::NotFound(Json(NotFoundResponse::new(format!(
                "job with id = {} not found",
                id
            )))),
            Err(err) => PublicJobDetailResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.public",
                    "public_job_detail_api",
                    "get_job_by_id",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(
        path = "/public/apply/:application_type",
        method = "post",
        tag = "ApiPublicTags::Public"
    )]
    async fn public_apply_api(
        &self,
        Path(application_type): Path<String>,
        json: Json<PublicApplicationRequest>,
        state: Data<&Arc<AppState>>,
    ) -> ApplyResponses {
        if let Err(err) = one_of(
            "application_type",
            &application_type,
            &[TYPE_INTERNAL, TYPE_EXTERNAL],
        ) {
            return ApplyResponses::BadRequest(Json(BadRequestResponse::new(err.to_string())));
        }
        if let Err(err) = validate_applicant(&json.applicant) {
            return ApplyResponses::BadRequest(Json(BadRequestResponse::new(err.to_string())));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ApplyResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.public",
                        "public_apply_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        let json = json.0;
        let Ok(job_id) = Uuid::parse_str(json.job_id.trim()) else {
            return ApplyResponses::NotFound(Json(NotFoundResponse::new(format!(
                "job with id = {} not found",
                json.job_id
            ))));
        };
        let job = match get_job_by_id(&mut tx, &job_id).await {
            Ok(val) => val,
            Err(err) => {
                return ApplyResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.public",
                        "public_apply_api",
                        "get_job_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(job) = job else {
            return ApplyResponses::NotFound(Json(NotFoundResponse::new(format!(
                "job with id = {} not found",
                json.job_id
            ))));
        };
        let now = Local::now().fixed_offset();
        if !job.accepts(&application_type, &now) {
            return ApplyResponses::BadRequest(Json(BadRequestResponse::new(format!(
                "job is not accepting {} applications",
                application_type
            ))));
        }

        let application =
            match submit_application(&mut tx, &job, &application_type, json.applicant, now).await
            {
                Ok(val) => val,
                Err(err) => {
                    return ApplyResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.public",
                            "public_apply_api",
                            "submit_application",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if let Err(err) = tx.commit().await {
            return ApplyResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.public",
                "public_apply_api",
                "commit transaction",
                &err.to_string(),
            )));
        }
        ApplyResponses::Ok(Json(application.into()))
    }

    #[oai(
        path = "/secure/apply/:token",
        method = "get",
        tag = "ApiPublicTags::Public"
    )]
    async fn secure_link_api(
        &self,
        Path(token): Path<String>,
        state: Data<&Arc<AppState>>,
    ) -> SecureLinkResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return SecureLinkResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.public",
                        "secure_link_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        let link = match get_application_link_by_token(&mut tx, &token).await {
            Ok(val) => val,
            Err(err) => {
                return SecureLinkResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.public",
                        "secure_link_api",
                        "get_application_link_by_token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(link) = link else {
            return SecureLinkResponses::NotFound(Json(NotFoundResponse::new(
                "application link not found",
            )));
        };
        match link.state(&Local::now().fixed_offset()) {
            LinkState::Valid => {}
            LinkState::Used => {
                return SecureLinkResponses::Conflict(Json(ConflictResponse {
                    message: "application link has already been used".to_string(),
                }))
            }
            LinkState::Expired => {
                return SecureLinkResponses::Gone(Json(GoneResponse {
                    message: "application link has expired".to_string(),
                }))
            }
        }

        match get_job_by_id(&mut tx, &link.job_id).await {
            Ok(Some(job)) => SecureLinkResponses::Ok(Json(SecureLinkResponse {
                job: job.into(),
                link_type: link.link_type,
                expires_at: datetime_to_string(link.expires_at),
            })),
            Ok(None) => SecureLinkResponses::NotFound(Json(NotFoundResponse::new(format!(
                "job with id = {} not found",
                link.job_id
            )))),
            Err(err) => SecureLinkResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.public",
                    "secure_link_api",
                    "get_job_by_id",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(
        path = "/secure/apply/:token",
        method = "post",
        tag = "ApiPublicTags::Public"
    )]
    async fn secure_apply_api(
        &self,
        Path(token): Path<String>,
        json: Json<ApplicantRequest>,
        state: Data<&Arc<AppState>>,
    ) -> SecureApplyResponses {
        if let Err(err) = validate_applicant(&json) {
            return SecureApplyResponses::BadRequest(Json(BadRequestResponse::new(
                err.to_string(),
            )));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return SecureApplyResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.public",
                        "secure_apply_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        let link = match get_application_link_by_token(&mut tx, &token).await {
            Ok(val) => val,
            Err(err) => {
                return SecureApplyResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.public",
                        "secure_apply_api",
                        "get_application_link_by_token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(mut link) = link else {
            return SecureApplyResponses::NotFound(Json(NotFoundResponse::new(
                "application link not found",
            )));
        };
        let now = Local::now().fixed_offset();
        match link.state(&now) {
            LinkState::Valid => {}
            LinkState::Used => {
                return SecureApplyResponses::Conflict(Json(ConflictResponse {
                    message: "application link has already been used".to_string(),
                }))
            }
            LinkState::Expired => {
                return SecureApplyResponses::Gone(Json(GoneResponse {
                    message: "application link has expired".to_string(),
                }))
            }
        }

        let job = match get_job_by_id(&mut tx, &link.job_id).await {
            Ok(val) => val,
            Err(err) => {
                return SecureApplyResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.public",
                        "secure_apply_api",
                        "get_job_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(job) = job else {
            return SecureApplyResponses::NotFound(Json(NotFoundResponse::new(format!(
                "job with id = {} not found",
                link.job_id
            ))));
        };

        match mark_application_link_used(&mut tx, &mut link).await {
            Ok(true) => {}
            Ok(false) => {
                return SecureApplyResponses::Conflict(Json(ConflictResponse {
                    message: "application link has already been used".to_string(),
                }))
            }
            Err(err) => {
                return SecureApplyResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.public",
                        "secure_apply_api",
                        "mark_application_link_used",
                        &err.to_string(),
                    ),
                ))
            }
        }
        let application =
            match submit_application(&mut tx, &job, &link.link_type, json.0, now).await {
                Ok(val) => val,
                Err(err) => {
                    return SecureApplyResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.public",
                            "secure_apply_api",
                            "submit_application",
                            &err.to_string(),
                        ),
                    ))
                }
            };
        if let Err(err) = tx.commit().await {
            return SecureApplyResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.public",
                    "secure_apply_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        SecureApplyResponses::Ok(Json(application.into()))
    }
}
