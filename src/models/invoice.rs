use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use validator::{Validate, ValidationError};

use super::line_item::{discount_within_subtotal, LineItem, LineItemInput};
use crate::totals::{Adjustment, AdjustmentKind};
use crate::validation::{adjustment_in_range, rule};

text_enum! {
    pub enum InvoiceStatus {
        Draft => "draft",
        Sent => "sent",
        Paid => "paid",
        Overdue => "overdue",
        Cancelled => "cancelled",
    }
}

impl InvoiceStatus {
    /// Paid and cancelled invoices are closed; every other move is allowed.
    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        *self == next || !matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }

    pub fn is_open(&self) -> bool {
        matches!(self, InvoiceStatus::Sent | InvoiceStatus::Overdue)
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct Invoice {
    pub id: i32,
    pub user_id: i32,
    pub customer_id: i32,
    pub number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub discount_type: AdjustmentKind,
    pub discount_value: f64,
    pub tax_type: AdjustmentKind,
    pub tax_value: f64,
    pub subtotal: f64,
    pub discount_amount: f64,
    pub tax_amount: f64,
    pub total: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn discount(&self) -> Adjustment {
        Adjustment { kind: self.discount_type, value: self.discount_value }
    }

    pub fn tax(&self) -> Adjustment {
        Adjustment { kind: self.tax_type, value: self.tax_value }
    }
}

/// An invoice together with its line items.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceWithItems {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "invoice_rules", skip_on_field_errors = false))]
pub struct InvoiceInput {
    pub customer_id: i32,
    /// Assigned from the tenant's sequence when omitted.
    #[validate(length(min = 1, max = 32, message = "must be 1-32 characters"))]
    pub number: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: Option<InvoiceStatus>,
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

fn invoice_rules(input: &InvoiceInput) -> Result<(), ValidationError> {
    if input.due_date < input.issue_date {
        return Err(rule("due_date", "must not be before the issue date"));
    }
    discount_within_subtotal(&input.discount, &input.items)?;
    // Payment records a ledger entry, so it has its own action.
    if input.status == Some(InvoiceStatus::Paid) {
        return Err(rule("status", "invoices are marked paid through the pay action"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn failure(input: &InvoiceInput) -> String {
        Error::from(input.validate().unwrap_err()).to_string()
    }

    fn input() -> InvoiceInput {
        InvoiceInput {
            customer_id: 1,
            number: None,
            issue_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
            status: None,
            discount: Adjustment::percentage(10.0),
            tax: Adjustment::percentage(5.0),
            notes: None,
            items: vec![LineItemInput {
                description: "Consulting".into(),
                quantity: 2.0,
                unit_price: 10.0,
            }],
        }
    }

    #[test]
    fn valid_invoice_passes() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn invoice_requires_items() {
        let mut invoice = input();
        invoice.items.clear();
        assert!(invoice.validate().is_err());
    }

    #[test]
    fn item_fields_are_checked() {
        let mut invoice = input();
        invoice.items[0].quantity = 0.0;
        invoice.items[0].description = String::new();
        let message = failure(&invoice);
        assert!(message.contains("items[0].quantity"));
        assert!(message.contains("items[0].description"));
    }

    #[test]
    fn fixed_discount_cannot_exceed_subtotal() {
        let mut invoice = input();
        invoice.discount = Adjustment::fixed(30.0);
        let message = failure(&invoice);
        assert!(message.contains("discount: must not exceed the subtotal"));

        invoice.discount = Adjustment::fixed(20.0);
        assert!(invoice.validate().is_ok());
    }

    #[test]
    fn paid_status_is_not_set_through_the_form() {
        let mut invoice = input();
        invoice.status = Some(InvoiceStatus::Paid);
        assert!(invoice.validate().is_err());

        invoice.status = Some(InvoiceStatus::Sent);
        assert!(invoice.validate().is_ok());
    }

    #[test]
    fn closed_invoices_stay_closed() {
        assert!(InvoiceStatus::Draft.can_transition_to(InvoiceStatus::Sent));
        assert!(InvoiceStatus::Overdue.can_transition_to(InvoiceStatus::Paid));
        assert!(!InvoiceStatus::Paid.can_transition_to(InvoiceStatus::Draft));
        assert!(!InvoiceStatus::Cancelled.can_transition_to(InvoiceStatus::Sent));
        assert!(InvoiceStatus::Paid.can_transition_to(InvoiceStatus::Paid));
    }

    #[test]
    fn status_text_round_trips() {
        for status in InvoiceStatus::ALL {
            assert_eq!(status.as_str().parse::<InvoiceStatus>().unwrap(), *status);
        }
        assert!("void".parse::<InvoiceStatus>().is_err());
    }

    #[test]
    fn input_deserializes_with_default_adjustments() {
        let json = serde_json::json!({
            "customer_id": 3,
            "issue_date": "2024-05-01",
            "due_date": "2024-05-15",
            "items": [{"description": "Widget", "quantity": 1, "unit_price": 9.5}]
        });
        let input: InvoiceInput = serde_json::from_value(json).unwrap();
        assert_eq!(input.discount, Adjustment::none());
        assert_eq!(input.tax.kind, AdjustmentKind::Fixed);
        assert!(input.status.is_none());
    }
}
