use chrono::{DateTime, FixedOffset};
use fake::{faker::lorem::en::Sentence, Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::{notification::Notification, user::UserRole};

pub struct NotificationFactory<T: Clone> {
    modifier_one: fn(x: &Notification, ext: T) -> Notification,
    modifier_many: fn(x: &Notification, idx: usize, ext: T) -> Notification,
}

impl<T: Clone> Default for NotificationFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> NotificationFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Notification, ext: T) -> Notification) {
        self.modifier_one = modifier
    }

    pub fn modified_many(
        &mut self,
        modifier: fn(x: &Notification, idx: usize, ext: T) -> Notification,
    ) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Notification> {
        let data = NotificationDummy::new();
        let data = data.generate_one();
        let data = (self.modifier_one)(&data, ext);
        insert_notification(db, &data).await?;
        Ok(data)
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<Notification>> {
        let data = NotificationDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<Notification> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        for item in result.iter() {
            insert_notification(db, item).await?;
        }
        Ok(result)
    }
}

async fn insert_notification(db: &PgPool, data: &Notification) -> anyhow::Result<()> {
    sqlx::query(
        r#"
    INSERT INTO public.notification (id, recipient_role, recipient_id, notification_type, title,
    message, is_read, employee_id, employee_name, created_date)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
    )
    .bind(data.id)
    .bind(&data.recipient_role)
    .bind(data.recipient_id)
    .bind(&data.notification_type)
    .bind(&data.title)
    .bind(&data.message)
    .bind(data.is_read)
    .bind(&data.employee_id)
    .bind(&data.employee_name)
    .bind(data.created_date)
    .execute(db)
    .await?;
    Ok(())
}

#[derive(Debug, Default, Deserialize, Dummy, Clone)]
struct NotificationDummy {
    pub id: Uuid,
    #[dummy(faker = "Sentence(2..4)")]
    pub title: String,
    #[dummy(faker = "Sentence(4..8)")]
    pub message: String,
    pub created_date: Option<DateTime<FixedOffset>>,
}

impl NotificationDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    fn to_notification(dummy: NotificationDummy) -> Notification {
        Notification {
            id: dummy.id,
            recipient_role: UserRole::Admin.to_string(),
            recipient_id: None,
            notification_type: "info".to_string(),
            title: dummy.title,
            message: dummy.message,
            is_read: false,
            employee_id: None,
            employee_name: None,
            created_date: dummy.created_date,
        }
    }

    pub fn generate_one(&self) -> Notification {
        Self::to_notification(Faker.fake::<NotificationDummy>())
    }

    pub fn generate_many(&self, num: u32) -> Vec<Notification> {
        let mut result: Vec<Notification> = vec![];
        for _ in 0..num {
            result.push(Self::to_notification(Faker.fake::<Self>()));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use crate::{factory::notification::NotificationFactory, model::notification::Notification};

    #[sqlx::test]
    async fn test_generate_many_modified(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = NotificationFactory::<()>::new();
        factory.modified_many(|data, idx, _| Notification {
            recipient_role: "manager".to_string(),
            is_read: idx == 0,
            ..data.clone()
        });
        factory.generate_many(&pool, 3, ()).await?;

        // Expect
        let res: Vec<(String, bool)> =
            sqlx::query_as(r#"SELECT recipient_role, is_read FROM public.notification"#)
                .fetch_all(&pool)
                .await?;
        assert_eq!(res.len(), 3);
        assert!(res.iter().all(|x| x.0 == "manager"));
        assert_eq!(res.iter().filter(|x| x.1).count(), 1);
        Ok(())
    }
}
