use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use validator::Validate;

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Supplier {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SupplierInput {
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    #[validate(email(message = "must be a valid e-mail address"))]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
}
