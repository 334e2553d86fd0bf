use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.user";

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_INACTIVE: &str = "inactive";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub user_name: String,
    pub password: String,
    pub role: String,
    pub status: String,
    pub district: Option<String>,
    pub branch: Option<String>,
    pub avatar_url: Option<String>,
    pub last_login: Option<DateTime<FixedOffset>>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
    pub deleted_date: Option<DateTime<FixedOffset>>,
}

impl User {
    /// Role parsed from the stored string, `None` for unknown roles.
    pub fn user_role(&self) -> Option<UserRole> {
        self.role.parse().ok()
    }

    pub fn has_role(&self, roles: &[UserRole]) -> bool {
        match self.user_role() {
            Some(role) => roles.contains(&role),
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Manager,
    DistrictManager,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::DistrictManager => "district_manager",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "manager" => Ok(UserRole::Manager),
            "district_manager" | "district" => Ok(UserRole::DistrictManager),
            _ => Err(format!("unknown role {}", s)),
        }
    }
}
