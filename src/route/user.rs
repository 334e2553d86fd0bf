use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::{
        security::{get_user_from_token, hash_password, BearerAuthorization},
        sqlx_utils::clamp_page_size,
        validation::{one_of, require, ValidationError},
    },
    model::user::{User, UserRole, STATUS_ACTIVE, STATUS_INACTIVE},
    repository::user::{
        create_user, get_user_by_id, get_user_by_username, paginate_user, soft_delete_user,
        update_user_status,
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            PaginateResponse, UnauthorizedResponse,
        },
        user::{
            PaginateUserResponses, UserCreateRequest, UserCreateResponses, UserDeleteResponses,
            UserDetailResponses, UserStatusRequest, UserStatusResponses,
        },
    },
    AppState,
};

const ROLES: [&str; 3] = ["admin", "manager", "district_manager"];
const STATUSES: [&str; 2] = [STATUS_ACTIVE, STATUS_INACTIVE];

fn validate_user_request(json: &UserCreateRequest) -> Result<(), ValidationError> {
    require("name", &json.name)?;
    require("email", &json.email)?;
    require("username", &json.user_name)?;
    require("password", &json.password)?;
    one_of("role", &json.role, &ROLES)?;
    if let Some(status) = &json.status {
        one_of("status", status, &STATUSES)?;
    }
    Ok(())
}

#[derive(Tags)]
enum ApiUserTags {
    User,
}

pub struct ApiUser;

#[OpenApi]
impl ApiUser {
    #[oai(path = "/user/", method = "get", tag = "ApiUserTags::User")]
    async fn paginate_user_api(
        &self,
        Query(page): Query<Option<u32>>,
        Query(page_size): Query<Option<u32>>,
        Query(search): Query<Option<String>>,
        Query(role): Query<Option<String>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> PaginateUserResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return PaginateUserResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "paginate_user_api",
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
                return PaginateUserResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "paginate_user_api",
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
                return PaginateUserResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "paginate_user_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return PaginateUserResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Admin]) {
            return PaginateUserResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let page = page.unwrap_or(1).max(1);
        let page_size = clamp_page_size(page_size);
        let (data, counts, page_count) =
            match paginate_user(&mut tx, page, page_size, search, role).await {
                Ok(val) => val,
                Err(err) => {
                    return PaginateUserResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "paginate_user_api",
                            "paginate_user",
                            &err.to_string(),
                        ),
                    ))
                }
            };

        PaginateUserResponses::Ok(Json(PaginateResponse {
            counts,
            page,
            page_count,
            page_size,
            results: data.into_iter().map(|x| x.into()).collect(),
        }))
    }

    #[oai(path = "/user/detail/", method = "get", tag = "ApiUserTags::User")]
    async fn detail_user_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserDetailResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "detail_user_api",
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
                return UserDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "detail_user_api",
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
                return UserDetailResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "detail_user_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return UserDetailResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Admin]) {
            return UserDetailResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let Ok(user_id) = Uuid::parse_str(&id) else {
            return UserDetailResponses::NotFound(Json(NotFoundResponse::new(format!(
                "user with id = {} not found",
                id
            ))));
        };
        match get_user_by_id(&mut tx, &user_id).await {
            Ok(Some(val)) => UserDetailResponses::Ok(Json(val.into())),
            Ok(None) => UserDetailResponses::NotFound(Json(NotFoundResponse::new(format!(
                "user with id = {} not found",
                id
            )))),
            Err(err) => UserDetailResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "detail_user_api",
                    "get_user_by_id",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/user/", method = "post", tag = "ApiUserTags::User")]
    async fn create_user_api(
        &self,
        json: Json<UserCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserCreateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
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
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
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
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return UserCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Admin]) {
            return UserCreateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        if let Err(err) = validate_user_request(&json) {
            return UserCreateResponses::BadRequest(Json(BadRequestResponse::new(
                err.to_string(),
            )));
        }
        match get_user_by_username(&mut tx, json.user_name.trim()).await {
            Ok(Some(_)) => {
                return UserCreateResponses::BadRequest(Json(BadRequestResponse::new(
                    "username already exists",
                )))
            }
            Ok(None) => {}
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
                        "check username",
                        &err.to_string(),
                    ),
                ))
            }
        }

        let password = match hash_password(&json.password) {
            Ok(val) => val,
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "create_user_api",
                        "hash password",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let now = Local::now().fixed_offset();
        let json = json.0;
        let new_user = User {
            id: Uuid::now_v7(),
            name: json.name,
            email: json.email,
            user_name: json.user_name.trim().to_string(),
            password,
            role: json.role,
            status: json.status.unwrap_or(STATUS_ACTIVE.to_string()),
            district: json.district,
            branch: json.branch,
            avatar_url: json.avatar_url,
            last_login: None,
            created_date: Some(now),
            updated_date: Some(now),
            deleted_date: None,
        };
        if let Err(err) = create_user(&mut tx, &new_user).await {
            return UserCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "create_user_api",
                    "create_user",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return UserCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "create_user_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        UserCreateResponses::Ok(Json(new_user.into()))
    }

    #[oai(path = "/user/change-status/", method = "put", tag = "ApiUserTags::User")]
    async fn change_status_user_api(
        &self,
        Query(id): Query<String>,
        json: Json<UserStatusRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserStatusResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserStatusResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "change_status_user_api",
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
                return UserStatusResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "change_status_user_api",
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
                return UserStatusResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "change_status_user_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return UserStatusResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Admin]) {
            return UserStatusResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        if let Err(err) = one_of("status", &json.status, &STATUSES) {
            return UserStatusResponses::BadRequest(Json(BadRequestResponse::new(
                err.to_string(),
            )));
        }
        let Ok(user_id) = Uuid::parse_str(&id) else {
            return UserStatusResponses::NotFound(Json(NotFoundResponse::new(format!(
                "user with id = {} not found",
                id
            ))));
        };
        let data = match get_user_by_id(&mut tx, &user_id).await {
            Ok(val) => val,
            Err(err) => {
                return UserStatusResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "change_status_user_api",
                        "get_user_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(mut data) = data else {
            return UserStatusResponses::NotFound(Json(NotFoundResponse::new(format!(
                "user with id = {} not found",
                id
            ))));
        };

        if let Err(err) = update_user_status(&mut tx, &mut data, json.0.status, None).await {
            return UserStatusResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "change_status_user_api",
                    "update_user_status",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return UserStatusResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "change_status_user_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        UserStatusResponses::Ok(Json(data.into()))
    }

    #[oai(path = "/user/", method = "delete", tag = "ApiUserTags::User")]
    async fn delete_user_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserDeleteResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "delete_user_api",
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
                return UserDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "delete_user_api",
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
                return UserDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "delete_user_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return UserDeleteResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if !user.has_role(&[UserRole::Admin]) {
            return UserDeleteResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let Ok(user_id) = Uuid::parse_str(&id) else {
            return UserDeleteResponses::NotFound(Json(NotFoundResponse::new(format!(
                "user with id = {} not found",
                id
            ))));
        };
        if user_id == user.id {
            return UserDeleteResponses::BadRequest(Json(BadRequestResponse::new(
                "cannot delete your own account",
            )));
        }
        let data = match get_user_by_id(&mut tx, &user_id).await {
            Ok(val) => val,
            Err(err) => {
                return UserDeleteResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "delete_user_api",
                        "get_user_by_id",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(mut data) = data else {
            return UserDeleteResponses::NotFound(Json(NotFoundResponse::new(format!(
                "user with id = {} not found",
                id
            ))));
        };

        if let Err(err) = soft_delete_user(&mut tx, &mut data, None).await {
            return UserDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "delete_user_api",
                    "soft_delete_user",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return UserDeleteResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "delete_user_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        UserDeleteResponses::NoContent
    }
}
