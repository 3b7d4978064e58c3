use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use validator::{Validate, ValidationError};

use super::line_item::{discount_within_subtotal, LineItem, LineItemInput};
use crate::totals::{Adjustment, AdjustmentKind};
use crate::validation::{adjustment_in_range, rule};

text_enum! {
    pub enum QuoteStatus {
        Draft => "draft",
        Sent => "sent",
        Accepted => "accepted",
        Rejected => "rejected",
        Expired => "expired",
    }
}

impl QuoteStatus {
    /// A customer's answer is final: accepted and rejected quotes do not move.
    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        *self == next || !matches!(self, QuoteStatus::Accepted | QuoteStatus::Rejected)
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Quote {
    pub id: i32,
    pub user_id: i32,
    pub customer_id: i32,
    pub number: String,
    pub issue_date: NaiveDate,
    pub valid_until: NaiveDate,
    pub status: QuoteStatus,
    pub discount_type: AdjustmentKind,
    pub discount_value: f64,
    pub tax_type: AdjustmentKind,
    pub tax_value: f64,
    pub subtotal: f64,
    pub discount_amount: f64,
    pub tax_amount: f64,
    pub total: f64,
    pub notes: Option<String>,
    pub invoice_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    pub fn discount(&self) -> Adjustment {
        Adjustment { kind: self.discount_type, value: self.discount_value }
    }

    pub fn tax(&self) -> Adjustment {
        Adjustment { kind: self.tax_type, value: self.tax_value }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteWithItems {
    #[serde(flatten)]
    pub quote: Quote,
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "quote_rules", skip_on_field_errors = false))]
pub struct QuoteInput {
    pub customer_id: i32,
    #[validate(length(min = 1, max = 32, message = "must be 1-32 characters"))]
    pub number: Option<String>,
    pub issue_date: NaiveDate,
    pub valid_until: NaiveDate,
    pub status: Option<QuoteStatus>,
    #[serde(default = "Adjustment::none")]
    #[validate(custom(function = "adjustment_in_range"))]
    pub discount: Adjustment,
    #[serde(default = "Adjustment::none")]
    #[validate(custom(function = "adjustment_in_range"))]
    pub tax: Adjustment,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "at least one line item is required"), nested)]
    pub items: Vec<LineItemInput>,
}

fn quote_rules(input: &QuoteInput) -> Result<(), ValidationError> {
    if input.valid_until < input.issue_date {
        return Err(rule("valid_until", "must not be before the issue date"));
    }
    discount_within_subtotal(&input.discount, &input.items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answered_quotes_are_final() {
        assert!(QuoteStatus::Draft.can_transition_to(QuoteStatus::Sent));
        assert!(QuoteStatus::Sent.can_transition_to(QuoteStatus::Accepted));
        assert!(QuoteStatus::Expired.can_transition_to(QuoteStatus::Sent));
        assert!(!QuoteStatus::Accepted.can_transition_to(QuoteStatus::Draft));
        assert!(!QuoteStatus::Rejected.can_transition_to(QuoteStatus::Accepted));
    }

    #[test]
    fn validity_must_not_precede_issue() {
        let input = QuoteInput {
            customer_id: 1,
            number: Some("QT-0001".into()),
            issue_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            status: None,
            discount: Adjustment::none(),
            tax: Adjustment::none(),
            notes: None,
            items: vec![LineItemInput {
                description: "Design".into(),
                quantity: 1.0,
                unit_price: 500.0,
            }],
        };
        let message = crate::error::Error::from(input.validate().unwrap_err()).to_string();
        assert!(message.contains("valid_until"));
    }
}
