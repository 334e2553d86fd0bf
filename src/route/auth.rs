use std::sync::Arc;

use chrono::{Duration, Local};
use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};
use redis::ConnectionLike;

use crate::{
    core::{
        security::{
            generate_refresh_token_from_user, generate_token_from_user,
            get_user_from_refresh_token, get_user_from_token, verify_hash_password,
            BearerAuthorization,
        },
        session::{add_session, remove_session},
        utils::datetime_to_string,
    },
    model::user::User,
    repository::user::{get_user_by_username, update_last_login},
    schema::{
        auth::{
            LoginRequest, LoginResponse, LoginResponses, LogoutResponses, MeResponses,
            RefreshTokenRequest, RefreshTokenResponses,
        },
        common::{BadRequestResponse, InternalServerErrorResponse, UnauthorizedResponse},
    },
    settings::Config,
    AppState,
};

#[derive(Tags)]
enum ApiAuthTags {
    Auth,
}

/// Issues an access/refresh token pair and opens the redis session.
fn issue_tokens<C: ConnectionLike>(
    redis_conn: &mut C,
    user: &User,
    config: &Config,
) -> anyhow::Result<LoginResponse> {
    let token = generate_token_from_user(user, config)?;
    let refresh_token = generate_refresh_token_from_user(user, config)?;
    add_session(
        redis_conn,
        user,
        config,
        token.clone(),
        refresh_token.clone(),
    )?;
    let now = Local::now().fixed_offset();
    let exp = now + Duration::minutes(config.jwt_exp as i64);
    let exp_refresh_token = now + Duration::minutes(config.jwt_refresh_exp as i64);
    Ok(LoginResponse {
        exp: datetime_to_string(exp),
        exp_in: exp.timestamp(),
        exp_refresh_token: datetime_to_string(exp_refresh_token),
        refresh_token,
        token,
        token_type: "Bearer".to_string(),
        role: user.role.clone(),
    })
}

pub struct ApiAuth;

#[OpenApi]
impl ApiAuth {
    #[oai(path = "/auth/login", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_login(
        &self,
        json: Json<LoginRequest>,
        state: Data<&Arc<AppState>>,
    ) -> LoginResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_login",
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
                return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_login",
                    "get redis pool connection",
                    &err.to_string(),
                )))
            }
        };

        // get username on db
        let user = match get_user_by_username(&mut tx, json.user_name.trim()).await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_login",
                        "check user on database",
                        &err.to_string(),
                    ),
                ));
            }
        };
        let Some(mut user) = user.filter(|x| x.is_active()) else {
            return LoginResponses::BadRequest(Json(BadRequestResponse::new(
                "Invalid credentials",
            )));
        };

        // validate user password
        let is_valid = match verify_hash_password(&json.password, &user.password) {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_login",
                    "validate user password",
                    &err.to_string(),
                )))
            }
        };
        if !is_valid {
            return LoginResponses::BadRequest(Json(BadRequestResponse::new(
                "Invalid credentials",
            )));
        }

        let resp = match issue_tokens(&mut redis_conn, &user, &state.config) {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_login",
                    "issue tokens",
                    &err.to_string(),
                )))
            }
        };

        if let Err(err) = update_last_login(&mut tx, &mut user, None).await {
            return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_login",
                "update last login",
                &err.to_string(),
            )));
        }
        if let Err(err) = tx.commit().await {
            return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_login",
                "commit transaction",
                &err.to_string(),
            )));
        }
        LoginResponses::Ok(Json(resp))
    }

    #[oai(
        path = "/auth/refresh-token",
        method = "post",
        tag = "ApiAuthTags::Auth"
    )]
    async fn auth_refresh_token(
        &self,
        json: Json<RefreshTokenRequest>,
        state: Data<&Arc<AppState>>,
    ) -> RefreshTokenResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_refresh_token",
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
                return RefreshTokenResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let refresh_token_user = match get_user_from_refresh_token(
            &mut tx,
            Some(json.refresh_token.clone()),
            &state.config,
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "get user from refresh token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(refresh_token_user) = refresh_token_user else {
            return RefreshTokenResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        match issue_tokens(&mut redis_conn, &refresh_token_user, &state.config) {
            Ok(val) => RefreshTokenResponses::Ok(Json(val)),
            Err(err) => RefreshTokenResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_refresh_token",
                    "issue tokens",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/auth/logout", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_logout(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LogoutResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LogoutResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_logout",
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
                return LogoutResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_logout",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let user = match get_user_from_token(&mut tx, &mut redis_conn, jwt_token.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return LogoutResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_logout",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let (Some(_), Some(jwt_token)) = (user, jwt_token) else {
            return LogoutResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        match remove_session(&mut redis_conn, jwt_token) {
            Ok(true) => LogoutResponses::NoContent,
            Ok(false) => LogoutResponses::Unauthorized(Json(UnauthorizedResponse::default())),
            Err(err) => LogoutResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_logout",
                    "remove session",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/auth/me", method = "get", tag = "ApiAuthTags::Auth")]
    async fn auth_me(&self, state: Data<&Arc<AppState>>, auth: BearerAuthorization) -> MeResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return MeResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_me",
                    "begin transaction",
                    &err.to_string(),
                )));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return MeResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_me",
                    "get redis pool connection",
                    &err.to_string(),
                )))
            }
        };

        match get_user_from_token(&mut tx, &mut redis_conn, auth.0.token).await {
            Ok(Some(user)) => MeResponses::Ok(Json(user.into())),
            Ok(None) => MeResponses::Unauthorized(Json(UnauthorizedResponse::default())),
            Err(err) => MeResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_me",
                "get user from token",
                &err.to_string(),
            ))),
        }
    }
}
