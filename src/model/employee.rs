use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use sqlx::FromRow;

pub const TABLE_NAME: &str = "public.employee";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Employee {
    pub id: i32,
    pub file_number: String,
    pub full_name: String,
    pub sex: String,
    pub employment_date: NaiveDate,
    pub last_dop: Option<NaiveDate>,
    pub job_grade: String,
    pub job_category: String,
    pub current_position: String,
    pub branch: String,
    pub department: String,
    pub district: String,
    pub region: String,
    pub field_of_study: String,
    pub educational_level: String,
    pub twin_branch: Option<String>,
    pub cluster: Option<String>,
    pub individual_pms: Option<f64>,
    pub indpms25: Option<f64>,
    pub totalexp: Option<i32>,
    pub totalexp20: Option<f64>,
    pub relatedexp: Option<i32>,
    pub expafterpromo: Option<f64>,
    pub tmdrec20: Option<f64>,
    pub disrec15: Option<f64>,
    pub total: Option<f64>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}
