use chrono::{DateTime, FixedOffset};
use fake::{faker::lorem::en::Sentence, Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::job::{Job, STATUS_OPEN};

pub struct JobFactory<T: Clone> {
    modifier_one: fn(x: &Job, ext: T) -> Job,
    modifier_many: fn(x: &Job, idx: usize, ext: T) -> Job,
}

impl<T: Clone> Default for JobFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> JobFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Job, ext: T) -> Job) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Job, idx: usize, ext: T) -> Job) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Job> {
        let data = JobDummy::new();
        let data = data.generate_one();
        let data = (self.modifier_one)(&data, ext);
        insert_job(db, &data).await?;
        Ok(data)
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<Job>> {
        let data = JobDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<Job> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        for item in result.iter() {
            insert_job(db, item).await?;
        }
        Ok(result)
    }
}

async fn insert_job(db: &PgPool, data: &Job) -> anyhow::Result<()> {
    sqlx::query(
        r#"
    INSERT INTO public.job (id, title, description, qualifications, department, location, job_type,
    salary, status, deadline, created_by, updated_by, created_date, updated_date, deleted_date)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"#,
    )
    .bind(data.id)
    .bind(&data.title)
    .bind(&data.description)
    .bind(&data.qualifications)
    .bind(&data.department)
    .bind(&data.location)
    .bind(&data.job_type)
    .bind(&data.salary)
    .bind(&data.status)
    .bind(data.deadline)
    .bind(data.created_by)
    .bind(data.updated_by)
    .bind(data.created_date)
    .bind(data.updated_date)
    .bind(data.deleted_date)
    .execute(db)
    .await?;
    Ok(())
}

#[derive(Debug, Default, Deserialize, Dummy, Clone)]
struct JobDummy {
    pub id: Uuid,
    #[dummy(faker = "Sentence(2..4)")]
    pub title: String,
    #[dummy(faker = "Sentence(5..10)")]
    pub description: String,
    pub qualifications: String,
    pub department: String,
    pub location: String,
    pub salary: Option<String>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl JobDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    fn to_job(dummy: JobDummy) -> Job {
        Job {
            id: dummy.id,
            title: dummy.title,
            description: dummy.description,
            qualifications: dummy.qualifications,
            department: dummy.department,
            location: dummy.location,
            job_type: "both".to_string(),
            salary: dummy.salary,
            status: STATUS_OPEN.to_string(),
            deadline: None,
            created_by: None,
            updated_by: None,
            created_date: dummy.created_date,
            updated_date: dummy.updated_date,
            deleted_date: None,
        }
    }

    pub fn generate_one(&self) -> Job {
        Self::to_job(Faker.fake::<JobDummy>())
    }

    pub fn generate_many(&self, num: u32) -> Vec<Job> {
        let mut result: Vec<Job> = vec![];
        for _ in 0..num {
            result.push(Self::to_job(Faker.fake::<Self>()));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use crate::{factory::job::JobFactory, model::job::Job};

    #[sqlx::test]
    async fn test_generate_one(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = JobFactory::new();
        let job = factory.generate_one(&pool, ()).await?;

        // Expect
        let res: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.job WHERE status = 'open'"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(res.0, 1);
        assert_eq!(job.job_type, "both");
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_many_modified(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = JobFactory::<String>::new();
        factory.modified_many(|data, idx, ext| Job {
            department: ext,
            status: if idx < 2 {
                "closed".to_string()
            } else {
                data.status.clone()
            },
            ..data.clone()
        });
        factory
            .generate_many(&pool, 5, "Finance".to_string())
            .await?;

        // Expect
        let res: Vec<(String, String)> =
            sqlx::query_as(r#"SELECT department, status FROM public.job"#)
                .fetch_all(&pool)
                .await?;
        assert_eq!(res.len(), 5);
        assert!(res.iter().all(|x| x.0 == "Finance"));
        assert_eq!(res.iter().filter(|x| x.1 == "closed").count(), 2);
        Ok(())
    }
}
