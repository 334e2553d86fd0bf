use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query, binds_query_as, query_builder, SqlxBinds},
    model::{
        notification::{Notification, TABLE_NAME},
        user::User,
    },
};

/// Notifications addressed to the user's role, either broadcast to the role
/// or sent to the user in person.
fn feed_filters(user: &User) -> (Vec<String>, Vec<SqlxBinds>) {
    let binds = vec![
        SqlxBinds::String(user.role.clone()),
        SqlxBinds::Uuid(user.id),
    ];
    let filters = vec![
        "recipient_role = $1".to_string(),
        "(recipient_id IS NULL OR recipient_id = $2)".to_string(),
    ];
    (filters, binds)
}

pub async fn get_notifications_for_user(
    tx: &mut Transaction<'_, Postgres>,
    user: &User,
    unread_only: bool,
    limit: Option<u32>,
) -> anyhow::Result<Vec<Notification>> {
    let (mut filters, binds) = feed_filters(user);
    if unread_only {
        filters.push("is_read = false".to_string());
    }
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["created_date DESC".to_string()],
        limit,
        None,
    );
    let data = binds_query_as::<Notification>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn count_unread_notifications(
    tx: &mut Transaction<'_, Postgres>,
    user: &User,
) -> anyhow::Result<u32> {
    let (mut filters, binds) = feed_filters(user);
    filters.push("is_read = false".to_string());
    let stmt = query_builder(
        Some("count(id)".to_string()),
        TABLE_NAME,
        &filters,
        vec![],
        None,
        None,
    );
    let count = binds_query_as::<(i64,)>(&stmt, binds)
        .fetch_one(&mut **tx)
        .await?;
    Ok(count.0 as u32)
}

pub async fn get_notification_for_user(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
    user: &User,
) -> anyhow::Result<Option<Notification>> {
    let (mut filters, mut binds) = feed_filters(user);
    binds.push(SqlxBinds::Uuid(*id));
    filters.push(format!("id = ${}", binds.len()));
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let data = binds_query_as::<Notification>(&stmt, binds)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

pub struct NotificationData {
    pub recipient_role: String,
    pub recipient_id: Option<Uuid>,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
}

pub async fn create_notification(
    tx: &mut Transaction<'_, Postgres>,
    data: NotificationData,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<Notification> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let notification = Notification {
        id: Uuid::now_v7(),
        recipient_role: data.recipient_role,
        recipient_id: data.recipient_id,
        notification_type: data.notification_type,
        title: data.title,
        message: data.message,
        is_read: false,
        employee_id: data.employee_id,
        employee_name: data.employee_name,
        created_date: Some(now),
    };
    sqlx::query(
        format!(
            r#"
        INSERT INTO {} (id, recipient_role, recipient_id, notification_type, title, message,
        is_read, employee_id, employee_name, created_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(notification.id)
    .bind(&notification.recipient_role)
    .bind(notification.recipient_id)
    .bind(&notification.notification_type)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(notification.is_read)
    .bind(&notification.employee_id)
    .bind(&notification.employee_name)
    .bind(notification.created_date)
    .execute(&mut **tx)
    .await?;
    Ok(notification)
}

pub async fn mark_notification_read(
    tx: &mut Transaction<'_, Postgres>,
    notification: &mut Notification,
) -> anyhow::Result<()> {
    notification.is_read = true;
    sqlx::query(format!("UPDATE {} SET is_read = true WHERE id = $1", TABLE_NAME).as_str())
        .bind(notification.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Returns the number of notifications that changed.
pub async fn mark_all_notifications_read(
    tx: &mut Transaction<'_, Postgres>,
    user: &User,
) -> anyhow::Result<u64> {
    let (filters, binds) = feed_filters(user);
    let stmt = format!(
        "UPDATE {} SET is_read = true WHERE {} AND is_read = false",
        TABLE_NAME,
        filters.join(" AND ")
    );
    let res = binds_query(&stmt, binds).execute(&mut **tx).await?;
    Ok(res.rows_affected())
}

/// Deletes the user's whole feed, returns the number of removed rows.
///
/// Role broadcasts are shared rows, so they go for the whole role.
pub async fn clear_notifications(
    tx: &mut Transaction<'_, Postgres>,
    user: &User,
) -> anyhow::Result<u64> {
    let (filters, binds) = feed_filters(user);
    let stmt = format!("DELETE FROM {} WHERE {}", TABLE_NAME, filters.join(" AND "));
    let res = binds_query(&stmt, binds).execute(&mut **tx).await?;
    Ok(res.rows_affected())
}
