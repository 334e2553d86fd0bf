use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::application_link::{ApplicationLink, TABLE_NAME},
};

pub async fn create_application_link(
    tx: &mut Transaction<'_, Postgres>,
    job_id: &Uuid,
    link_type: &str,
    token: String,
    expires_at: DateTime<FixedOffset>,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<ApplicationLink> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let link = ApplicationLink {
        id: Uuid::now_v7(),
        job_id: *job_id,
        token,
        link_type: link_type.to_string(),
        expires_at,
        is_used: false,
        created_date: Some(now),
    };
    sqlx::query(
        format!(
            r#"
        INSERT INTO {} (id, job_id, token, link_type, expires_at, is_used, created_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(link.id)
    .bind(link.job_id)
    .bind(&link.token)
    .bind(&link.link_type)
    .bind(link.expires_at)
    .bind(link.is_used)
    .bind(link.created_date)
    .execute(&mut **tx)
    .await?;
    Ok(link)
}

pub async fn get_application_link_by_token(
    tx: &mut Transaction<'_, Postgres>,
    token: &str,
) -> anyhow::Result<Option<ApplicationLink>> {
    let stmt = query_builder(None, TABLE_NAME, &["token = $1".to_string()], vec![], None, None);
    let data = binds_query_as::<ApplicationLink>(&stmt, vec![SqlxBinds::String(token.to_string())])
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn get_application_links_by_job(
    tx: &mut Transaction<'_, Postgres>,
    job_id: &Uuid,
) -> anyhow::Result<Vec<ApplicationLink>> {
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["job_id = $1".to_string()],
        vec!["created_date DESC".to_string(), "link_type".to_string()],
        None,
        None,
    );
    let data = binds_query_as::<ApplicationLink>(&stmt, vec![SqlxBinds::Uuid(*job_id)])
        .fetch_all(&mut **tx)
        .await?;
    Ok(data)
}

/// Flags the link as used. Returns false when another submission got there first.
pub async fn mark_application_link_used(
    tx: &mut Transaction<'_, Postgres>,
    link: &mut ApplicationLink,
) -> anyhow::Result<bool> {
    let res = sqlx::query(
        format!(
            "UPDATE {} SET is_used = TRUE WHERE id = $1 AND is_used = FALSE",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(link.id)
    .execute(&mut **tx)
    .await?;
    link.is_used = true;
    Ok(res.rows_affected() == 1)
}
