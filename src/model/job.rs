use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.job";

pub const STATUS_OPEN: &str = "open";
pub const JOB_STATUSES: [&str; 3] = ["open", "closed", "filled"];
pub const JOB_TYPES: [&str; 3] = ["internal", "external", "both"];

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub qualifications: String,
    pub department: String,
    pub location: String,
    pub job_type: String,
    pub salary: Option<String>,
    pub status: String,
    pub deadline: Option<DateTime<FixedOffset>>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
    pub deleted_date: Option<DateTime<FixedOffset>>,
}

impl Job {
    /// Whether the posting takes applications of `application_type` at `now`.
    pub fn accepts(&self, application_type: &str, now: &DateTime<FixedOffset>) -> bool {
        if self.status != STATUS_OPEN {
            return false;
        }
        if let Some(deadline) = self.deadline {
            if deadline < *now {
                return false;
            }
        }
        self.job_type == "both" || self.job_type == application_type
    }
}
