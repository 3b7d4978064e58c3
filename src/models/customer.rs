use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use validator::Validate;

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Customer {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerInput {
    #[validate(length(min = 1, max = 120, message = "is required (at most 120 characters)"))]
    pub name: String,
    #[validate(email(message = "must be a valid e-mail address"))]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}
