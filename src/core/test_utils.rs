use std::sync::Arc;

use chrono::Local;
use fake::{Fake, Faker};
use redis::ConnectionLike;
use sqlx::{pool::PoolConnection, PgPool, Postgres};
use uuid::Uuid;

use super::security::{generate_refresh_token_from_user, generate_token_from_user};
use crate::{
    core::{security::hash_password, session::add_session},
    model::user::{User, UserRole, STATUS_ACTIVE},
    settings::{get_config, Config},
    AppState,
};

pub fn generate_random<T: fake::Dummy<fake::Faker>>() -> T {
    Faker.fake()
}

/// App state over the test database, with the api mounted on `/api`.
pub fn init_test_app_state(pool: PgPool) -> anyhow::Result<(Arc<AppState>, Config)> {
    let mut config = get_config()?;
    config.prefix = Some("/api".to_string());
    let client = redis::Client::open(config.redis_url.clone())?;
    let redis_pool = r2d2::Pool::builder().build(client)?;
    let app_state = Arc::new(AppState {
        db: pool,
        redis_conn: redis_pool,
        config: config.clone(),
    });
    Ok((app_state, config))
}

pub struct TestUser {
    pub user: User,
    pub token: String,
    pub refresh_token: String,
}

pub async fn insert_user(
    db: &mut PoolConnection<Postgres>,
    username: &str,
    password: &str,
    role: UserRole,
) -> anyhow::Result<User> {
    let hashed_password =
        hash_password(password).map_err(|err| anyhow::anyhow!(err.to_string()))?;
    let now = Local::now().fixed_offset();
    let user = User {
        id: Uuid::now_v7(),
        name: format!("{} name", username),
        email: format!("{}@brehanbank.test", username),
        user_name: username.to_string(),
        password: hashed_password,
        role: role.to_string(),
        status: STATUS_ACTIVE.to_string(),
        district: Some("Central".to_string()),
        branch: Some("Bole".to_string()),
        avatar_url: None,
        last_login: None,
        created_date: Some(now),
        updated_date: Some(now),
        deleted_date: None,
    };

    sqlx::query(
        r#"
        INSERT INTO public.user (id, name, email, user_name, password, role, status,
        district, branch, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
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
    .bind(user.created_date)
    .bind(user.updated_date)
    .execute(&mut **db)
    .await?;
    Ok(user)
}

pub async fn generate_test_user<C: ConnectionLike>(
    db: &mut PoolConnection<Postgres>,
    redis_conn: &mut C,
    config: &Config,
    username: &str,
    role: UserRole,
) -> anyhow::Result<TestUser> {
    let user = insert_user(db, username, "password", role).await?;

    let token = generate_token_from_user(&user, config)?;
    let refresh_token = generate_refresh_token_from_user(&user, config)?;
    add_session(
        redis_conn,
        &user,
        config,
        token.clone(),
        refresh_token.clone(),
    )?;

    Ok(TestUser {
        user,
        token,
        refresh_token,
    })
}

#[cfg(test)]
mod tests {
    use sqlx::{Acquire, PgPool};
    use uuid::Uuid;

    use crate::{
        core::{
            security::get_user_from_token,
            session::get_session,
            test_utils::{generate_test_user, init_test_app_state},
        },
        model::user::UserRole,
    };

    #[sqlx::test]
    async fn test_generate_test_user(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let (app_state, config) = init_test_app_state(pool)?;
        let mut redis_conn = app_state.redis_conn.get()?;

        // When
        let mut db = app_state.db.acquire().await?;
        let res = generate_test_user(
            &mut db,
            &mut redis_conn,
            &config,
            "testuser",
            UserRole::Admin,
        )
        .await?;

        // Expect
        let user: Option<(Uuid, String, String)> =
            sqlx::query_as("SELECT id, user_name, role FROM public.user WHERE id = $1")
                .bind(res.user.id)
                .fetch_optional(&mut *db)
                .await?;
        assert!(user.is_some());
        assert_eq!(user.unwrap().2, "admin");

        let mut tx = db.begin().await?;
        let user_token =
            get_user_from_token(&mut tx, &mut redis_conn, Some(res.token.clone())).await?;
        assert!(user_token.is_some());
        assert_eq!(user_token.unwrap().user_name, "testuser".to_string());

        let session = get_session(&mut redis_conn, res.token)?;
        assert!(session.is_some());
        assert_eq!(session.unwrap().role, "admin");
        Ok(())
    }
}
