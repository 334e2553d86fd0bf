use anyhow::{anyhow, bail};
use chrono::Local;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::security::hash_password,
    model::user::{User, UserRole, STATUS_ACTIVE},
    repository,
};

pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub district: Option<String>,
    pub branch: Option<String>,
}

pub async fn create_user(pool: &PgPool, new_user: NewUser) -> anyhow::Result<User> {
    let role: UserRole = new_user.role.parse().map_err(|err: String| anyhow!(err))?;
    let mut tx = pool.begin().await?;
    if repository::user::get_user_by_username(&mut tx, &new_user.username)
        .await?
        .is_some()
    {
        bail!("user {} already exists", new_user.username);
    }

    let hashed_password =
        hash_password(&new_user.password).map_err(|err| anyhow!(err.to_string()))?;
    let now = Local::now().fixed_offset();
    let user = User {
        id: Uuid::now_v7(),
        name: new_user.name,
        email: new_user.email,
        user_name: new_user.username,
        password: hashed_password,
        role: role.to_string(),
        status: STATUS_ACTIVE.to_string(),
        district: new_user.district,
        branch: new_user.branch,
        avatar_url: None,
        last_login: None,
        created_date: Some(now),
        updated_date: Some(now),
        deleted_date: None,
    };
    repository::user::create_user(&mut tx, &user).await?;
    tx.commit().await?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::NewUser;
    use crate::{cli::auth::create_user, core::security::verify_hash_password};

    fn new_user(username: &str, role: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "secret".to_string(),
            name: "Abebe Kebede".to_string(),
            email: "abebe@brehanbank.test".to_string(),
            role: role.to_string(),
            district: Some("Central".to_string()),
            branch: None,
        }
    }

    #[sqlx::test]
    async fn test_create_user(pool: PgPool) -> anyhow::Result<()> {
        // When
        create_user(&pool, new_user("abebe", "district")).await?;

        // Expect
        let db_res: Option<(String, String, String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT user_name, password, role, district
            FROM public.user
            WHERE user_name = $1
            "#,
        )
        .bind("abebe")
        .fetch_optional(&pool)
        .await?;
        assert!(db_res.is_some());
        let db_res = db_res.unwrap();
        assert_eq!(db_res.0, "abebe");
        assert!(verify_hash_password("secret", &db_res.1).unwrap());
        assert_eq!(db_res.2, "district_manager");
        assert_eq!(db_res.3, Some("Central".to_string()));
        Ok(())
    }

    #[sqlx::test]
    async fn test_create_user_rejects_duplicate_and_unknown_role(pool: PgPool) -> anyhow::Result<()> {
        // Given
        create_user(&pool, new_user("abebe", "admin")).await?;

        // Expect
        assert!(create_user(&pool, new_user("abebe", "admin")).await.is_err());
        assert!(create_user(&pool, new_user("sara", "teller")).await.is_err());
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM public.user")
            .fetch_one(&pool)
            .await?;
        assert_eq!(count.0, 1);
        Ok(())
    }
}
