use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, OpenApi, Tags};
use uuid::Uuid;

use crate::{
    core::{
        security::{get_user_from_token, BearerAuthorization},
        validation::{one_of, require, ValidationError},
    },
    model::user::UserRole,
    repository::notification::{
        clear_notifications, count_unread_notifications, create_notification,
        get_notification_for_user, get_notifications_for_user, mark_all_notifications_read,
        mark_notification_read, NotificationData,
    },
    schema::{
        common::{
            BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
        notification::{
            CountResponse, NotificationCountResponses, NotificationCreateRequest,
            NotificationCreateResponses, NotificationListResponses, NotificationReadResponses,
        },
    },
    AppState,
};

const NOTIFICATION_TYPES: [&str; 6] = [
    "info",
    "success",
    "warning",
    "error",
    "recommendation",
    "application",
];
const RECIPIENT_ROLES: [&str; 3] = ["admin", "manager", "district_manager"];

pub fn notification_data_from_request(
    json: NotificationCreateRequest,
) -> Result<NotificationData, ValidationError> {
    one_of("recipientRole", &json.recipient_role, &RECIPIENT_ROLES)?;
    one_of("type", &json.notification_type, &NOTIFICATION_TYPES)?;
    require("title", &json.title)?;
    require("message", &json.message)?;
    let recipient_id = match json.recipient_id.filter(|x| !x.trim().is_empty()) {
        Some(val) => Some(Uuid::parse_str(val.trim()).map_err(|_| {
            ValidationError::NotAllowed {
                field: "recipientId",
                allowed: "a user id".to_string(),
            }
        })?),
        None => None,
    };
    Ok(NotificationData {
        recipient_role: json.recipient_role,
        recipient_id,
        notification_type: json.notification_type,
        title: json.title,
        message: json.message,
        employee_id: json.employee_id,
        employee_name: json.employee_name,
    })
}

#[derive(Tags)]
enum ApiNotificationTags {
    Notification,
}

pub struct ApiNotification;

#[OpenApi]
impl ApiNotification {
    #[oai(
        path = "/notification/",
        method = "get",
        tag = "ApiNotificationTags::Notification"
    )]
    async fn list_notification_api(
        &self,
        Query(unread_only): Query<Option<bool>>,
        Query(limit): Query<Option<u32>>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> NotificationListResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return NotificationListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "list_notification_api",
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
                return NotificationListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "list_notification_api",
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
                return NotificationListResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "list_notification_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return NotificationListResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        match get_notifications_for_user(&mut tx, &user, unread_only.unwrap_or(false), limit).await
        {
            Ok(data) => {
                NotificationListResponses::Ok(Json(data.into_iter().map(|x| x.into()).collect()))
            }
            Err(err) => NotificationListResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.notification",
                    "list_notification_api",
                    "get_notifications_for_user",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(
        path = "/notification/unread-count/",
        method = "get",
        tag = "ApiNotificationTags::Notification"
    )]
    async fn unread_count_notification_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> NotificationCountResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return NotificationCountResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "unread_count_notification_api",
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
                return NotificationCountResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "unread_count_notification_api",
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
                return NotificationCountResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "unread_count_notification_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return NotificationCountResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        match count_unread_notifications(&mut tx, &user).await {
            Ok(count) => NotificationCountResponses::Ok(Json(CountResponse {
                count: count as u64,
            })),
            Err(err) => NotificationCountResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.notification",
                    "unread_count_notification_api",
                    "count_unread_notifications",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(
        path = "/notification/",
        method = "post",
        tag = "ApiNotificationTags::Notification"
    )]
    async fn create_notification_api(
        &self,
        json: Json<NotificationCreateRequest>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> NotificationCreateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return NotificationCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "create_notification_api",
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
                return NotificationCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "create_notification_api",
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
                return NotificationCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "create_notification_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return NotificationCreateResponses::Unauthorized(Json(
                UnauthorizedResponse::default(),
            ));
        };
        if !user.has_role(&[UserRole::Admin, UserRole::Manager]) {
            return NotificationCreateResponses::Forbidden(Json(ForbiddenResponse::default()));
        }

        let data = match notification_data_from_request(json.0) {
            Ok(val) => val,
            Err(err) => {
                return NotificationCreateResponses::BadRequest(Json(BadRequestResponse::new(
                    err.to_string(),
                )))
            }
        };
        let notification = match create_notification(&mut tx, data, None).await {
            Ok(val) => val,
            Err(err) => {
                return NotificationCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "create_notification_api",
                        "create_notification",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return NotificationCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.notification",
                    "create_notification_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        NotificationCreateResponses::Ok(Json(notification.into()))
    }

    #[oai(
        path = "/notification/read/",
        method = "put",
        tag = "ApiNotificationTags::Notification"
    )]
    async fn read_notification_api(
        &self,
        Query(id): Query<String>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> NotificationReadResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return NotificationReadResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "read_notification_api",
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
                return NotificationReadResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "read_notification_api",
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
                return NotificationReadResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "read_notification_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return NotificationReadResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let Ok(notification_id) = Uuid::parse_str(&id) else {
            return NotificationReadResponses::NotFound(Json(NotFoundResponse::new(format!(
                "notification with id = {} not found",
                id
            ))));
        };
        let data = match get_notification_for_user(&mut tx, &notification_id, &user).await {
            Ok(val) => val,
            Err(err) => {
                return NotificationReadResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "read_notification_api",
                        "get_notification_for_user",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(mut notification) = data else {
            return NotificationReadResponses::NotFound(Json(NotFoundResponse::new(format!(
                "notification with id = {} not found",
                id
            ))));
        };

        if let Err(err) = mark_notification_read(&mut tx, &mut notification).await {
            return NotificationReadResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.notification",
                    "read_notification_api",
                    "mark_notification_read",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = tx.commit().await {
            return NotificationReadResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.notification",
                    "read_notification_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        NotificationReadResponses::Ok(Json(notification.into()))
    }

    #[oai(
        path = "/notification/read-all/",
        method = "put",
        tag = "ApiNotificationTags::Notification"
    )]
    async fn read_all_notification_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> NotificationCountResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return NotificationCountResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "read_all_notification_api",
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
                return NotificationCountResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "read_all_notification_api",
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
                return NotificationCountResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "read_all_notification_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return NotificationCountResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let count = match mark_all_notifications_read(&mut tx, &user).await {
            Ok(val) => val,
            Err(err) => {
                return NotificationCountResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "read_all_notification_api",
                        "mark_all_notifications_read",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return NotificationCountResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.notification",
                    "read_all_notification_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        NotificationCountResponses::Ok(Json(CountResponse { count }))
    }

    #[oai(
        path = "/notification/",
        method = "delete",
        tag = "ApiNotificationTags::Notification"
    )]
    async fn clear_notification_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> NotificationCountResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return NotificationCountResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "clear_notification_api",
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
                return NotificationCountResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "clear_notification_api",
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
                return NotificationCountResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "clear_notification_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return NotificationCountResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let count = match clear_notifications(&mut tx, &user).await {
            Ok(val) => val,
            Err(err) => {
                return NotificationCountResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.notification",
                        "clear_notification_api",
                        "clear_notifications",
                        &err.to_string(),
                    ),
                ))
            }
        };
        if let Err(err) = tx.commit().await {
            return NotificationCountResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.notification",
                    "clear_notification_api",
                    "commit transaction",
                    &err.to_string(),
                ),
            ));
        }
        NotificationCountResponses::Ok(Json(CountResponse { count }))
    }
}
