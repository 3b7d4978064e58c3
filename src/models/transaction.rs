use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use validator::Validate;

text_enum! {
    pub enum TransactionKind {
        Income => "income",
        Expense => "expense",
    }
}

/// A bookkeeping entry. Paying an invoice records an income entry linked
/// to it.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: i32,
    pub user_id: i32,
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
    pub category: Option<String>,
    pub occurred_on: NaiveDate,
    pub invoice_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TransactionInput {
    pub kind: TransactionKind,
    #[validate(range(exclusive_min = 0.0, message = "must be greater than zero"))]
    pub amount: f64,
    #[validate(length(min = 1, message = "is required"))]
    pub description: String,
    pub category: Option<String>,
    pub occurred_on: NaiveDate,
}

/// Income and expense totals over a period.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TransactionSummary {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

impl TransactionSummary {
    pub fn new(income: f64, expense: f64) -> Self {
        Self { income, expense, net: income - expense }
    }
}
