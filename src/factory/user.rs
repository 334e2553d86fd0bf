use chrono::{DateTime, FixedOffset};
use fake::{
    faker::{internet::en::SafeEmail, name::en::Name},
    Dummy, Fake, Faker,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::user::{User, UserRole, STATUS_ACTIVE};

pub struct UserFactory<T: Clone> {
    modifier_one: fn(x: &User, ext: T) -> User,
    modifier_many: fn(x: &User, idx: usize, ext: T) -> User,
}

impl<T: Clone> Default for UserFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> UserFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &User, ext: T) -> User) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &User, idx: usize, ext: T) -> User) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<User> {
        let data = UserDummy::new();
        let data = data.generate_one();
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(
            r#"
        INSERT INTO public.user (id, name, email, user_name, password, role, status, district,
        branch, avatar_url, last_login, created_date, updated_date, deleted_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"#,
        )
        .bind(data.id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.user_name)
        .bind(&data.password)
        .bind(&data.role)
        .bind(&data.status)
        .bind(&data.district)
        .bind(&data.branch)
        .bind(&data.avatar_url)
        .bind(data.last_login)
        .bind(data.created_date)
        .bind(data.updated_date)
        .bind(data.deleted_date)
        .execute(db)
        .await?;
        Ok(data.clone())
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<User>> {
        let data = UserDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<User> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.clone() {
            sqlx::query(
                r#"INSERT INTO public.user (id, name, email, user_name, password, role, status,
            district, branch, avatar_url, last_login, created_date, updated_date, deleted_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"#,
            )
            .bind(item.id)
            .bind(&item.name)
            .bind(&item.email)
            .bind(&item.user_name)
            .bind(&item.password)
            .bind(&item.role)
            .bind(&item.status)
            .bind(&item.district)
            .bind(&item.branch)
            .bind(&item.avatar_url)
            .bind(item.last_login)
            .bind(item.created_date)
            .bind(item.updated_date)
            .bind(item.deleted_date)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(result)
    }
}

#[derive(Debug, Default, Deserialize, Dummy, Clone)]
struct UserDummy {
    pub id: Uuid,
    #[dummy(faker = "Name()")]
    pub name: String,
    #[dummy(faker = "SafeEmail()")]
    pub email: String,
    pub user_name: String,
    pub password: String,
    pub district: Option<String>,
    pub branch: Option<String>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl UserDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    fn to_user(dummy: UserDummy) -> User {
        User {
            id: dummy.id,
            name: dummy.name,
            email: dummy.email,
            user_name: dummy.user_name,
            password: dummy.password,
            role: UserRole::Admin.to_string(),
            status: STATUS_ACTIVE.to_string(),
            district: dummy.district,
            branch: dummy.branch,
            avatar_url: None,
            last_login: None,
            created_date: dummy.created_date,
            updated_date: dummy.updated_date,
            deleted_date: None,
        }
    }

    pub fn generate_one(&self) -> User {
        Self::to_user(Faker.fake::<UserDummy>())
    }

    pub fn generate_many(&self, num: u32) -> Vec<User> {
        let mut result: Vec<User> = vec![];
        for _ in 0..num {
            result.push(Self::to_user(Faker.fake::<Self>()));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, Local};
    use sqlx::PgPool;
    use uuid::Uuid;

    use crate::{
        factory::user::UserFactory,
        model::user::{User, UserRole, STATUS_INACTIVE},
    };

    #[derive(Clone)]
    struct ExtData {
        pub id: Uuid,
        pub created_date: DateTime<FixedOffset>,
    }

    #[sqlx::test]
    async fn test_generate_one(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = UserFactory::new();
        let user = factory.generate_one(&pool, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.user"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 1);
        assert_eq!(user.role, "admin");
        assert_eq!(user.status, "active");
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_one_modified(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = UserFactory::<ExtData>::new();
        factory.modified_one(|data, ext| User {
            id: ext.id,
            user_name: "district_user".to_string(),
            role: UserRole::DistrictManager.to_string(),
            district: Some("North".to_string()),
            created_date: Some(ext.created_date),
            ..data.clone()
        });
        let ext = ExtData {
            id: Uuid::now_v7(),
            created_date: Local::now().fixed_offset(),
        };
        factory.generate_one(&pool, ext.clone()).await?;

        // Expect
        let res: (Uuid, String, String, Option<String>) =
            sqlx::query_as(r#"SELECT id, user_name, role, district FROM public.user"#)
                .fetch_one(&pool)
                .await?;
        assert_eq!(res.0, ext.id);
        assert_eq!(res.1, "district_user".to_string());
        assert_eq!(res.2, "district_manager".to_string());
        assert_eq!(res.3, Some("North".to_string()));
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_many_modified(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = UserFactory::<()>::new();
        factory.modified_many(|data, idx, _| User {
            status: if idx % 2 == 0 {
                STATUS_INACTIVE.to_string()
            } else {
                data.status.clone()
            },
            ..data.clone()
        });
        factory.generate_many(&pool, 5, ()).await?;

        // Expect
        let res: (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM public.user WHERE status = 'inactive'"#)
                .fetch_one(&pool)
                .await?;
        assert_eq!(res.0, 3);
        Ok(())
    }
}
