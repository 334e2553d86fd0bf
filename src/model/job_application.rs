use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.job_application";

pub const TYPE_INTERNAL: &str = "internal";
pub const TYPE_EXTERNAL: &str = "external";
pub const STATUS_SUBMITTED: &str = "submitted";
pub const PROMOTION_PENDING: &str = "pending";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct JobApplication {
    pub id: Uuid,
    pub job_id: Uuid,
    pub application_type: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub other_experience: Option<String>,
    pub other_experience_years: Option<i32>,
    pub resume_url: Option<String>,
    pub matched_employee_id: Option<i32>,
    pub promotion_status: Option<String>,
    pub status: String,
    pub created_date: Option<DateTime<FixedOffset>>,
}

impl JobApplication {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}
