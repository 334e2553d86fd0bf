use chrono::{DateTime, FixedOffset, NaiveDate};
use fake::{faker::name::en::Name, Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;

use crate::model::employee::Employee;

pub struct EmployeeFactory<T: Clone> {
    modifier_one: fn(x: &Employee, ext: T) -> Employee,
    modifier_many: fn(x: &Employee, idx: usize, ext: T) -> Employee,
}

impl<T: Clone> Default for EmployeeFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> EmployeeFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Employee, ext: T) -> Employee) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Employee, idx: usize, ext: T) -> Employee) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Employee> {
        let data = EmployeeDummy::new();
        let data = data.generate_one();
        let data = (self.modifier_one)(&data, ext);
        insert_employee(db, &data).await?;
        Ok(data)
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<Employee>> {
        let data = EmployeeDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<Employee> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        for item in result.iter() {
            insert_employee(db, item).await?;
        }
        Ok(result)
    }
}

async fn insert_employee(db: &PgPool, data: &Employee) -> anyhow::Result<()> {
    sqlx::query(
        r#"
    INSERT INTO public.employee (id, file_number, full_name, sex, employment_date, last_dop,
    job_grade, job_category, current_position, branch, department, district, region,
    field_of_study, educational_level, twin_branch, cluster, individual_pms, indpms25, totalexp,
    totalexp20, relatedexp, expafterpromo, tmdrec20, disrec15, total, created_date, updated_date)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19,
    $20, $21, $22, $23, $24, $25, $26, $27, $28)"#,
    )
    .bind(data.id)
    .bind(&data.file_number)
    .bind(&data.full_name)
    .bind(&data.sex)
    .bind(data.employment_date)
    .bind(data.last_dop)
    .bind(&data.job_grade)
    .bind(&data.job_category)
    .bind(&data.current_position)
    .bind(&data.branch)
    .bind(&data.department)
    .bind(&data.district)
    .bind(&data.region)
    .bind(&data.field_of_study)
    .bind(&data.educational_level)
    .bind(&data.twin_branch)
    .bind(&data.cluster)
    .bind(data.individual_pms)
    .bind(data.indpms25)
    .bind(data.totalexp)
    .bind(data.totalexp20)
    .bind(data.relatedexp)
    .bind(data.expafterpromo)
    .bind(data.tmdrec20)
    .bind(data.disrec15)
    .bind(data.total)
    .bind(data.created_date)
    .bind(data.updated_date)
    .execute(db)
    .await?;
    Ok(())
}

#[derive(Debug, Default, Deserialize, Dummy, Clone)]
struct EmployeeDummy {
    #[dummy(faker = "1..1_000_000")]
    pub id: i32,
    pub file_number: String,
    #[dummy(faker = "Name()")]
    pub full_name: String,
    #[dummy(faker = "1990..2020")]
    pub employment_year: i32,
    pub job_grade: String,
    pub current_position: String,
    pub branch: String,
    pub department: String,
    pub district: String,
    pub region: String,
    #[dummy(faker = "0.0..100.0")]
    pub individual_pms: f64,
    pub created_date: Option<DateTime<FixedOffset>>,
}

impl EmployeeDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    fn to_employee(dummy: EmployeeDummy) -> Employee {
        Employee {
            id: dummy.id,
            file_number: dummy.file_number,
            full_name: dummy.full_name,
            sex: "Female".to_string(),
            employment_date: NaiveDate::from_ymd_opt(dummy.employment_year, 7, 1)
                .unwrap_or_default(),
            last_dop: None,
            job_grade: dummy.job_grade,
            job_category: "Clerical".to_string(),
            current_position: dummy.current_position,
            branch: dummy.branch,
            department: dummy.department,
            district: dummy.district,
            region: dummy.region,
            field_of_study: "Accounting".to_string(),
            educational_level: "Degree".to_string(),
            twin_branch: None,
            cluster: None,
            individual_pms: Some(dummy.individual_pms),
            indpms25: None,
            totalexp: None,
            totalexp20: None,
            relatedexp: None,
            expafterpromo: None,
            tmdrec20: None,
            disrec15: None,
            total: None,
            created_date: dummy.created_date,
            updated_date: dummy.created_date,
        }
    }

    pub fn generate_one(&self) -> Employee {
        Self::to_employee(Faker.fake::<EmployeeDummy>())
    }

    /// Ids are consecutive so a batch never collides with itself.
    pub fn generate_many(&self, num: u32) -> Vec<Employee> {
        let mut result: Vec<Employee> = vec![];
        for idx in 0..num {
            let mut employee = Self::to_employee(Faker.fake::<Self>());
            employee.id = self.id + idx as i32;
            result.push(employee);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use crate::{factory::employee::EmployeeFactory, model::employee::Employee};

    #[sqlx::test]
    async fn test_generate_one(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = EmployeeFactory::new();
        let employee = factory.generate_one(&pool, ()).await?;

        // Expect
        let res: (i32, String) =
            sqlx::query_as(r#"SELECT id, full_name FROM public.employee"#)
                .fetch_one(&pool)
                .await?;
        assert_eq!(res.0, employee.id);
        assert_eq!(res.1, employee.full_name);
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_many_modified(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = EmployeeFactory::<&'static str>::new();
        factory.modified_many(|data, idx, ext| Employee {
            district: ext.to_string(),
            file_number: format!("BB-{}", idx),
            ..data.clone()
        });
        factory.generate_many(&pool, 4, "South").await?;

        // Expect
        let res: Vec<(String,)> = sqlx::query_as(
            r#"SELECT file_number FROM public.employee WHERE district = 'South' ORDER BY file_number"#,
        )
        .fetch_all(&pool)
        .await?;
        assert_eq!(res.len(), 4);
        assert_eq!(res[0].0, "BB-0");
        Ok(())
    }
}
