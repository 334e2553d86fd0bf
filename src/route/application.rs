use std::sync::Arc;

use chrono::{Duration, Local};
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use tracing::info;
use uuid::Uuid;

use crate::{
    core::{
        security::{get_user_from_token, BearerAuthorization},
        token::generate_link_token,
        validation::one_of,
    },
    model::{
        job_application::{TYPE_EXTERNAL, TYPE_INTERNAL},
        user::UserRole,
    },
    repository::{
        application_link::{create_application_link, get_application_links_by_job},
        job::get_job_by_id,
        job_application::get_applications,
    },
    schema::{
        application::{ApplicationLinkResponse, ApplicationLinksResponses, ApplicationListResponses},
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
    },
    AppState,
};

#[derive(Tags)]
enum ApiApplicationTags {
    Application,
}

pub struct ApiApplication;

#[OpenApi]
impl ApiApplication {
    #[oai(
        path = "/application/",
        method = "get",
        tag = "ApiApplicationTags::Application"
    )]
    async fn list_application_api(
        &self,
        Query(application_type): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ApplicationListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ApplicationListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.application",
                        "list_application_api",
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
                return ApplicationListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.application",
                        "list_application_api",
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
                return ApplicationListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.application",
                        "list_application_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return ApplicationListResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Admin]) {
            return ApplicationListResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        if let Some(application_type) = &application_type {
            if let Err(err) = one_of(
                "application_type",
                application_type,
                &[TYPE_INTERNAL, TYPE_EXTERNAL],
            ) {
                return ApplicationListResponses::BadRequest(Json(BadRequestResponse::new(
                    err.to_string(),
                )));
            }
        }

        match get_applications(&mut tx, application_type).await {
            Ok(data) => {
                ApplicationListResponses::Ok(Json(data.into_iter().map(|x| x.into()).collect()))
            }
            Err(err) => ApplicationListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.application",
                    "list_application_api",
                    "get_applications",
                    &err.to_string(),
                ),
            )),
        }
    }

    /// Issues a fresh internal and external link pair for the job.
    #[oai(
        path = "/application/link/",
        method = "post",
        tag = "ApiApplicationTags::Application"
    )]
    async fn create_application_link_api(
        &self,
        Query(job_id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ApplicationLinksResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ApplicationLinksResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.application",
                        "create_application_link_api",
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
                return ApplicationLinksResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.application",
                        "create_application_link_api",
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
                return ApplicationLinksResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.application",
                        "create_application_link_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return ApplicationLinksResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Admin]) {
            return ApplicationLinksResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let Ok(job_uuid) = Uuid::parse_str(&job_id) else {
            return ApplicationLinksResponses::NotFound(Json(NotFoundResponse::new(format!(
                "job with id = {} not found",
                job_id
            ))));
        };
        let job = match get_job_by_id(&mut tx, &job_uuid).await {
            Ok(val) => val,
            Err(err) => {
                return ApplicationLinksResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.application",
                        "create_application_link_api",
                        "get_job_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(job) = job else {
            return ApplicationLinksResponses::NotFound(Json(NotFoundResponse::new(format!(
                "job with id = {} not found",
                job_id
            ))));
        };

        let now = Local::now().fixed_offset();
        let expires_at = now + Duration::days(state.config.application_link_exp_days as i64);
        let mut links = vec![];
        for link_type in [TYPE_INTERNAL, TYPE_EXTERNAL] {
            let link = match create_application_link(
                &mut tx,
                &job.id,
                link_type,
                generate_link_token(),
                expires_at,
                Some(now),
            )
            .await
            {
                Ok(val) => val,
                Err(err) => {
                    return ApplicationLinksResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.application",
                            "create_application_link_api",
                            "create_application_link",
                            &err.to_string(),
                        ),
                    ))
                }
            };
            links.push(ApplicationLinkResponse::new(
                link,
                &state.config.application_link_base_url,
            ));
        }

        if let Err(err) = tx.commit().await {
            return ApplicationLinksResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.application",
                    "create_application_link_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        info!(job_id = %job.id, user = %user.user_name, "application links issued");
        ApplicationLinksResponses::Created(Json(links))
    }

    #[oai(
        path = "/application/link/",
        method = "get",
        tag = "ApiApplicationTags::Application"
    )]
    async fn list_application_link_api(
        &self,
        Query(job_id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> ApplicationLinksResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ApplicationLinksResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.application",
                        "list_application_link_api",
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
                return ApplicationLinksResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.application",
                        "list_application_link_api",
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
                return ApplicationLinksResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.application",
                        "list_application_link_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return ApplicationLinksResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Admin]) {
            return ApplicationLinksResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let Ok(job_uuid) = Uuid::parse_str(&job_id) else {
            return ApplicationLinksResponses::NotFound(Json(NotFoundResponse::new(format!(
                "job with id = {} not found",
                job_id
            ))));
        };
        match get_application_links_by_job(&mut tx, &job_uuid).await {
            Ok(data) => ApplicationLinksResponses::Ok(Json(
                data.into_iter()
                    .map(|x| ApplicationLinkResponse::new(x, &state.config.application_link_base_url))
                    .collect(),
            )),
            Err(err) => ApplicationLinksResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.application",
                    "list_application_link_api",
                    "get_application_links_by_job",
                    &err.to_string(),
                ),
            )),
        }
    }
}
