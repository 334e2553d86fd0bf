use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, page_offset, query_builder, SqlxBinds},
    model::{
        job::{Job, STATUS_OPEN, TABLE_NAME},
        user::User,
    },
};

#[derive(Clone, Debug, Default)]
pub struct JobFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub job_type: Option<String>,
}

fn job_filters(filter: JobFilter) -> (Vec<String>, Vec<SqlxBinds>) {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["deleted_date IS NULL".to_string()];

    if let Some(search) = filter.search {
        binds.push(SqlxBinds::String(format!("%{}%", search)));
        filters.push(format!("title ILIKE ${}", binds.len()));
    }
    if let Some(status) = filter.status {
        binds.push(SqlxBinds::String(status));
        filters.push(format!("status = ${}", binds.len()));
    }
    if let Some(job_type) = filter.job_type {
        binds.push(SqlxBinds::String(job_type));
        filters.push(format!("job_type = ${}", binds.len()));
    }
    (filters, binds)
}

pub async fn paginate_job(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    filter: JobFilter,
) -> anyhow::Result<(Vec<Job>, u32, u32)> {
    let (filters, binds) = job_filters(filter);
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["created_date DESC".to_string()],
        Some(page_size),
        Some(page_offset(page, page_size)),
    );
    let stmt_count = query_builder(
        Some("count(id)".to_string()),
        TABLE_NAME,
        &filters,
        vec![],
        None,
        None,
    );

    let q = binds_query_as::<Job>(&stmt, binds.clone());
    let q_count = binds_query_as::<(i64,)>(&stmt_count, binds);
    let data = q.fetch_all(&mut **tx).await?;
    let count = q_count.fetch_one(&mut **tx).await?;
    let num_page = (count.0 as u32).div_ceil(page_size);
    Ok((data, count.0 as u32, num_page))
}

/// Open postings whose deadline has not passed, for the public careers page.
pub async fn get_open_jobs(
    tx: &mut Transaction<'_, Postgres>,
    job_type: Option<String>,
    now: DateTime<FixedOffset>,
) -> anyhow::Result<Vec<Job>> {
    let mut binds: Vec<SqlxBinds> = vec![
        SqlxBinds::String(STATUS_OPEN.to_string()),
        SqlxBinds::DateTimeFixedOffset(now),
    ];
    let mut filters: Vec<String> = vec![
        "deleted_date IS NULL".to_string(),
        "status = $1".to_string(),
        "(deadline IS NULL OR deadline >= $2)".to_string(),
    ];
    if let Some(job_type) = job_type {
        binds.push(SqlxBinds::String(job_type));
        filters.push(format!("(job_type = ${} OR job_type = 'both')", binds.len()));
    }
    let stmt = query_builder(
        None,
        TABLE_NAME,
        &filters,
        vec!["created_date DESC".to_string()],
        None,
        None,
    );
    let data = binds_query_as::<Job>(&stmt, binds)
        .fetch_all(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn get_job_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<Job>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let filters: Vec<String> = vec!["id = $1".to_string(), "deleted_date IS NULL".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let data = binds_query_as::<Job>(&stmt, binds)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

pub struct JobData {
    pub title: String,
    pub description: String,
    pub qualifications: String,
    pub department: String,
    pub location: String,
    pub job_type: String,
    pub salary: Option<String>,
    pub status: String,
    pub deadline: Option<DateTime<FixedOffset>>,
}

pub async fn create_job(
    tx: &mut Transaction<'_, Postgres>,
    id: Option<Uuid>,
    data: JobData,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<Job> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    let new_job = Job {
        id: id.unwrap_or(Uuid::now_v7()),
        title: data.title,
        description: data.description,
        qualifications: data.qualifications,
        department: data.department,
        location: data.location,
        job_type: data.job_type,
        salary: data.salary,
        status: data.status,
        deadline: data.deadline,
        created_by: Some(request_user.id),
        updated_by: Some(request_user.id),
        created_date: Some(now),
        updated_date: Some(now),
        deleted_date: None,
    };
    sqlx::query(
        format!(
            r#"
    INSERT INTO {} (id, title, description, qualifications, department, location, job_type,
    salary, status, deadline, created_by, updated_by, created_date, updated_date, deleted_date)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(new_job.id)
    .bind(&new_job.title)
    .bind(&new_job.description)
    .bind(&new_job.qualifications)
    .bind(&new_job.department)
    .bind(&new_job.location)
    .bind(&new_job.job_type)
    .bind(&new_job.salary)
    .bind(&new_job.status)
    .bind(new_job.deadline)
    .bind(new_job.created_by)
    .bind(new_job.updated_by)
    .bind(new_job.created_date)
    .bind(new_job.updated_date)
    .bind(new_job.deleted_date)
    .execute(&mut **tx)
    .await?;
    Ok(new_job)
}

/// Overwrites the editable fields; `created_date` and `created_by` stay.
pub async fn update_job(
    tx: &mut Transaction<'_, Postgres>,
    job: &mut Job,
    data: JobData,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    job.title = data.title;
    job.description = data.description;
    job.qualifications = data.qualifications;
    job.department = data.department;
    job.location = data.location;
    job.job_type = data.job_type;
    job.salary = data.salary;
    job.status = data.status;
    job.deadline = data.deadline;
    job.updated_by = Some(request_user.id);
    job.updated_date = Some(now);
    sqlx::query(
        format!(
            r#"
        UPDATE {}
        SET title = $1, description = $2, qualifications = $3, department = $4, location = $5,
        job_type = $6, salary = $7, status = $8, deadline = $9, updated_by = $10, updated_date = $11
        WHERE id = $12"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&job.title)
    .bind(&job.description)
    .bind(&job.qualifications)
    .bind(&job.department)
    .bind(&job.location)
    .bind(&job.job_type)
    .bind(&job.salary)
    .bind(&job.status)
    .bind(job.deadline)
    .bind(job.updated_by)
    .bind(job.updated_date)
    .bind(job.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn soft_delete_job(
    tx: &mut Transaction<'_, Postgres>,
    job: &mut Job,
    request_user: &User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    job.updated_by = Some(request_user.id);
    job.updated_date = Some(now);
    job.deleted_date = Some(now);
    sqlx::query(
        format!(
            r#"UPDATE {}
    SET updated_by = $1, updated_date = $2, deleted_date = $3
    WHERE id = $4"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(job.updated_by)
    .bind(job.updated_date)
    .bind(job.deleted_date)
    .bind(job.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
