use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use validator::Validate;

/// A tenant: the business owner whose records everything else belongs to.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserInput {
    #[validate(length(min = 1, max = 120, message = "is required (at most 120 characters)"))]
    pub name: String,
    #[validate(email(message = "must be a valid e-mail address"))]
    pub email: String,
    pub company_name: Option<String>,
    pub phone: Option<String>,
}
