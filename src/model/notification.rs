use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.notification";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_role: String,
    pub recipient_id: Option<Uuid>,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub employee_id: Option<String>,
    pub employee_name: Option<String>,
    pub created_date: Option<DateTime<FixedOffset>>,
}
