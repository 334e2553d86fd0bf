use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.application_link";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct ApplicationLink {
    pub id: Uuid,
    pub job_id: Uuid,
    pub token: String,
    pub link_type: String,
    pub expires_at: DateTime<FixedOffset>,
    pub is_used: bool,
    pub created_date: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LinkState {
    Valid,
    Expired,
    Used,
}

impl ApplicationLink {
    pub fn state(&self, now: &DateTime<FixedOffset>) -> LinkState {
        if self.is_used {
            LinkState::Used
        } else if self.expires_at < *now {
            LinkState::Expired
        } else {
            LinkState::Valid
        }
    }
}
