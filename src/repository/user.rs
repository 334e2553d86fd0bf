use chrono::{DateTime, FixedOffset, Local};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, page_offset, query_builder, SqlxBinds},
    model::user::{User, TABLE_NAME},
};

pub async fn paginate_user(
    tx: &mut Transaction<'_, Postgres>,
    page: u32,
    page_size: u32,
    search: Option<String>,
    role: Option<String>,
) -> anyhow::Result<(Vec<User>, u32, u32)> {
    let mut binds: Vec<SqlxBinds> = vec![];
    let mut filters: Vec<String> = vec!["deleted_date IS NULL".to_string()];

    if let Some(search) = search {
        binds.push(SqlxBinds::String(format!("%{}%", search)));
        filters.push(format!(
            "(name ILIKE ${0} OR user_name ILIKE ${0})",
            binds.len()
        ));
    }
    if let Some(role) = role {
        binds.push(SqlxBinds::String(role));
        filters.push(format!("role = ${}", binds.len()));
    }

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

    let q = binds_query_as::<User>(&stmt, binds.clone());
    let q_count = binds_query_as::<(i64,)>(&stmt_count, binds);
    let data = q.fetch_all(&mut **tx).await?;
    let count = q_count.fetch_one(&mut **tx).await?;
    let num_page = (count.0 as u32).div_ceil(page_size);
    Ok((data, count.0 as u32, num_page))
}

pub async fn get_user_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: &Uuid,
) -> anyhow::Result<Option<User>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::Uuid(*id)];
    let filters: Vec<String> = vec!["id = $1".to_string(), "deleted_date IS NULL".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, vec![], None, None);
    let data = binds_query_as::<User>(&stmt, binds)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(data)
}

pub async fn get_user_by_username(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
) -> anyhow::Result<Option<User>> {
    let res: Option<User> = sqlx::query_as(
        r#"SELECT *
        FROM public.user
        WHERE user_name = $1 AND deleted_date IS NULL
        "#,
    )
    .bind(username)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(res)
}

pub async fn create_user(tx: &mut Transaction<'_, Postgres>, user: &User) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
        INSERT INTO {} (id, name, email, user_name, password, role, status, district, branch,
        avatar_url, last_login, created_date, updated_date, deleted_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.user_name)
    .bind(&user.password)
    .bind(&user.role)
    .bind(&user.status)
    .bind(&user.district)
    .bind(&user.branch)
    .bind(&user.avatar_url)
    .bind(user.last_login)
    .bind(user.created_date)
    .bind(user.updated_date)
    .bind(user.deleted_date)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_user_status(
    tx: &mut Transaction<'_, Postgres>,
    user: &mut User,
    status: String,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    user.status = status;
    user.updated_date = Some(now);
    sqlx::query(
        format!(
            "UPDATE {} SET status = $1, updated_date = $2 WHERE id = $3",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&user.status)
    .bind(user.updated_date)
    .bind(user.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_last_login(
    tx: &mut Transaction<'_, Postgres>,
    user: &mut User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    user.last_login = Some(now);
    sqlx::query(format!("UPDATE {} SET last_login = $1 WHERE id = $2", TABLE_NAME).as_str())
        .bind(user.last_login)
        .bind(user.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn soft_delete_user(
    tx: &mut Transaction<'_, Postgres>,
    user: &mut User,
    now: Option<DateTime<FixedOffset>>,
) -> anyhow::Result<()> {
    let now = now.unwrap_or(Local::now().fixed_offset());
    user.updated_date = Some(now);
    user.deleted_date = Some(now);
    sqlx::query(
        format!(
            "UPDATE {} SET updated_date = $1, deleted_date = $2 WHERE id = $3",
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user.updated_date)
    .bind(user.deleted_date)
    .bind(user.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
