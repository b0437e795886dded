//! Technical staff model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::TechnicianStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Technician {
    pub id: i32,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    /// e.g. "CCTV", "networking", "electrical"
    pub specialty: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: TechnicianStatus,
    pub hired_on: Option<NaiveDate>,
    /// Linked login account, if the technician uses the application
    pub user_id: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Technician {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateTechnician {
    #[validate(length(min = 1, max = 30))]
    pub employee_code: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub specialty: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub status: Option<TechnicianStatus>,
    pub hired_on: Option<NaiveDate>,
    pub user_id: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTechnician {
    #[validate(length(min = 1, max = 30))]
    pub employee_code: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    pub specialty: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub status: Option<TechnicianStatus>,
    pub hired_on: Option<NaiveDate>,
    pub user_id: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct TechnicianQuery {
    pub status: Option<TechnicianStatus>,
    pub specialty: Option<String>,
    pub q: Option<String>,
}

/// Open work assigned to a technician
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TechnicianWorkload {
    pub technician_id: i32,
    pub name: String,
    pub open_failures: i64,
    pub in_progress_failures: i64,
    pub scheduled_maintenance: i64,
    pub overdue_maintenance: i64,
}
