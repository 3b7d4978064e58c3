use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::totals::{line_amount, Adjustment, AdjustmentKind, Line};
use crate::validation::rule;

/// A line of an invoice or a quote.
///
/// Both documents store items in tables of the same shape; `document_id`
/// holds the owning invoice or quote id.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct LineItem {
    pub id: i32,
    pub document_id: i32,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub amount: f64,
    pub position: i32,
}

impl LineItem {
    pub fn line(&self) -> Line {
        Line::new(self.quantity, self.unit_price)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct LineItemInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 500, message = "is required (at most 500 characters)"))]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, message = "must be greater than zero"))]
    pub quantity: f64,
    #[validate(range(min = 0.0, message = "must be zero or greater"))]
    pub unit_price: f64,
}

impl LineItemInput {
    pub fn line(&self) -> Line {
        Line::new(self.quantity, self.unit_price)
    }
}

impl From<&LineItem> for LineItemInput {
    fn from(item: &LineItem) -> Self {
        Self {
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

/// A fixed discount larger than the subtotal would make the total negative.
pub fn discount_within_subtotal(
    discount: &Adjustment,
    items: &[LineItemInput],
) -> std::result::Result<(), ValidationError> {
    if discount.kind == AdjustmentKind::Fixed {
        let subtotal: f64 = items
            .iter()
            .map(|item| line_amount(item.quantity, item.unit_price))
            .sum();
        if discount.value > subtotal {
            return Err(rule("discount", "must not exceed the subtotal"));
        }
    }
    Ok(())
}
