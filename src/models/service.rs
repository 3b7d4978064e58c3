use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use validator::Validate;

/// A bookable service offered to customers.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Service {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServiceInput {
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "must be zero or greater"))]
    pub price: f64,
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub duration_minutes: i32,
}
