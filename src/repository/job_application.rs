use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::job_application::{
        JobApplication, PROMOTION_PENDING, STATUS_SUBMITTED, TABLE_NAME, TYPE_INTERNAL,
    },
};

pub struct ApplicationData {
    pub job_id: Uuid,
    pub application_type: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub other_experience: Option<String>,
    pub other_experience_years: Option<i32>,
    pub resume_url: Option<String>,
}

/// Stores a submitted application. Internal applications carry the id of the
/// employee matched by full name and start with a pending promotion status.
pub async fn create_application(
    tx: &mut Transaction<'_, Postgres>,
    data: ApplicationData,
    matched_employee_id: Option<i32>,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<JobApplication> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let promotion_status = if data.application_type == TYPE_INTERNAL {
        Some(PROMOTION_PENDING.to_string())
    } else {
        None
    };
    let application = JobApplication {
        id: Uuid::now_v7(),
        job_id: data.job_id,
        application_type: data.application_type,
        first_name: data.first_name,
        last_name: data.last_name,
        email: data.email,
        phone: data.phone,
        other_experience: data.other_experience,
        other_experience_years: data.other_experience_years,
        resume_url: data.resume_url,
        matched_employee_id,
        promotion_status,
        status: STATUS_SUBMITTED.to_string(),
        created_date: Some(now),
    };
    sqlx::query(
        format!(
            r#"
        INSERT INTO {} (id, job_id, application_type, first_name, last_name, email, phone,
        other_experience, other_experience_years, resume_url, matched_employee_id,
        promotion_status, status, created_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(application.id)
    .bind(application.job_id)
    .bind(&application.application_type)
    .bind(&application.first_name)
    .bind(&application.last_name)
    .bind(&application.email)
    .bind(&application.phone)
    .bind(&application.other_experience)
    .bind(application.other_experience_years)
    .bind(&application.resume_url)
    .bind(application.matched_employee_id)
    .bind(&application.promotion_status)
    .bind(&application.status)
    .bind(application.created_date)
    .execute(&mut **tx)
    .await?;
    Ok(application)
}

/// Newest first, optionally restricted to one application type.
pub async fn get_applications(
    tx: &mut Transaction<'_, Postgres>,
    application_type: Option<String>,
) -> anyhow::Result<Vec<JobApplication>> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec![];
    if let Some(application_type) = application_type {
        binds.push(SqlxBinds::String(application_type));
        filters.push(format!("application_type = ${}", binds.len()));
    }
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["created_date DESC".to_string()],
        None,
        None,
    );
    let data = binds_query_as::<JobApplication>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn get_applications_by_job(
    tx: &mut Transaction<'_, Postgres>,
    job_id: &Uuid,
) -> anyhow::Result<Vec<JobApplication>> {
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &["job_id = $1".to_string()],
        vec!["created_date DESC".to_string()],
        None,
        None,
    );
    let data = binds_query_as::<JobApplication>(&stmt, vec![SqlxBinds::Uuid(*job_id)])
        .fetch_all(&mut **tx)
        .await?;
    Ok(data)
}
