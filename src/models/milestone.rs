use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use validator::Validate;

text_enum! {
    pub enum MilestoneStatus {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Milestone {
    pub id: i32,
    pub user_id: i32,
    pub submission_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub position: i32,
    pub status: MilestoneStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MilestoneInput {
    #[validate(length(min = 1, max = 200, message = "is required (at most 200 characters)"))]
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[validate(range(min = 0.0, message = "must be zero or greater"))]
    pub amount: Option<f64>,
    pub position: Option<i32>,
    pub status: Option<MilestoneStatus>,
}
