use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use validator::Validate;

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Product {
    pub id: i32,
    pub user_id: i32,
    pub supplier_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub price: f64,
    pub cost: f64,
    pub stock_quantity: i32,
    pub reorder_level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.reorder_level
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 64, message = "must be 1-64 characters"))]
    pub sku: String,
    #[validate(range(min = 0.0, message = "must be zero or greater"))]
    pub price: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "must be zero or greater"))]
    pub cost: f64,
    #[serde(default)]
    #[validate(range(min = 0, message = "must be zero or greater"))]
    pub stock_quantity: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "must be zero or greater"))]
    pub reorder_level: i32,
    pub supplier_id: Option<i32>,
}

/// Change in stock on hand, e.g. `+10` for a delivery or `-2` for a sale.
#[derive(Debug, Clone, Deserialize)]
pub struct StockAdjustment {
    pub delta: i32,
    pub reason: Option<String>,
}
