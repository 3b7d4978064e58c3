use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use validator::Validate;

text_enum! {
    pub enum SubmissionStatus {
        Pending => "pending",
        InReview => "in_review",
        Approved => "approved",
        Rejected => "rejected",
        InProgress => "in_progress",
        Completed => "completed",
    }
}

/// A project request submitted by a prospective client.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct ProjectSubmission {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: String,
    pub client_name: String,
    pub client_email: String,
    pub budget: Option<f64>,
    pub deadline: Option<NaiveDate>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProjectSubmissionInput {
    #[validate(length(min = 1, message = "is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "is required"))]
    pub client_name: String,
    #[validate(email(message = "must be a valid e-mail address"))]
    pub client_email: String,
    #[validate(range(min = 0.0, message = "must be zero or greater"))]
    pub budget: Option<f64>,
    pub deadline: Option<NaiveDate>,
}
