use chrono::NaiveDate;
use tracing::{info, warn};
use validator::Validate;

use super::{ensure_customer, next_number, today};
use crate::db::{Database, NewInvoiceRecord};
use crate::error::{Error, Result};
use crate::models::{
    Invoice, InvoiceInput, InvoiceStatus, InvoiceWithItems, LineItemInput, Transaction,
};
use crate::services::{DocumentView, OutgoingMail};
use crate::state::AppState;
use crate::totals::{self, Totals};
use crate::validation::clean_optional;

pub const NUMBER_PREFIX: &str = "INV-";

pub(crate) fn normalize_items(items: Vec<LineItemInput>) -> Vec<LineItemInput> {
    items
        .into_iter()
        .map(|item| LineItemInput {
            description: item.description.trim().to_string(),
            ..item
        })
        .collect()
}

fn normalize(input: InvoiceInput) -> InvoiceInput {
    InvoiceInput {
        number: clean_optional(input.number),
        notes: clean_optional(input.notes),
        items: normalize_items(input.items),
        ..input
    }
}

/// Totals of an invoice as they will be stored.
pub fn compute_totals(input: &InvoiceInput) -> Totals {
    totals::calculate(input.items.iter().map(LineItemInput::line), input.discount, input.tax)
}

pub async fn next_invoice_number(db: &Database, user_id: i32) -> Result<String> {
    let numbers = db.get_invoice_numbers(user_id, NUMBER_PREFIX).await?;
    Ok(next_number(NUMBER_PREFIX, numbers.iter().map(String::as_str)))
}

pub async fn list(
    db: &Database,
    user_id: i32,
    status: Option<InvoiceStatus>,
) -> Result<Vec<Invoice>> {
    db.get_invoices(user_id, status).await
}

pub async fn get(db: &Database, user_id: i32, id: i32) -> Result<InvoiceWithItems> {
    db.get_invoice_with_items(user_id, id).await
}

pub async fn create(db: &Database, user_id: i32, input: InvoiceInput) -> Result<InvoiceWithItems> {
    let input = normalize(input);
    input.validate()?;
    ensure_customer(db, user_id, input.customer_id).await?;

    let number = match &input.number {
        Some(number) => number.clone(),
        None => next_invoice_number(db, user_id).await?,
    };
    let totals = compute_totals(&input);

    let record = NewInvoiceRecord {
        customer_id: input.customer_id,
        number: &number,
        issue_date: input.issue_date,
        due_date: input.due_date,
        status: input.status.unwrap_or(InvoiceStatus::Draft),
        discount: input.discount,
        tax: input.tax,
        totals,
        notes: input.notes.as_deref(),
        items: &input.items,
    };

    let saved = db.save_invoice_with_items(user_id, None, &record).await?;
    info!(
        user_id,
        invoice_id = saved.invoice.id,
        number = %saved.invoice.number,
        total = saved.invoice.total,
        "invoice created"
    );
    Ok(saved)
}

/// Replace an invoice's fields and items. Totals are recomputed.
pub async fn update(
    db: &Database,
    user_id: i32,
    id: i32,
    input: InvoiceInput,
) -> Result<InvoiceWithItems> {
    let input = normalize(input);
    input.validate()?;

    let current = db.get_invoice(user_id, id).await?;
    if matches!(current.status, InvoiceStatus::Paid | InvoiceStatus::Cancelled) {
        return Err(Error::Conflict(format!(
            "{} invoices cannot be edited",
            current.status
        )));
    }
    let status = input.status.unwrap_or(current.status);
    if !current.status.can_transition_to(status) {
        return Err(transition_error(current.status, status));
    }
    ensure_customer(db, user_id, input.customer_id).await?;

    let number = input.number.clone().unwrap_or_else(|| current.number.clone());
    let totals = compute_totals(&input);

    let record = NewInvoiceRecord {
        customer_id: input.customer_id,
        number: &number,
        issue_date: input.issue_date,
        due_date: input.due_date,
        status,
        discount: input.discount,
        tax: input.tax,
        totals,
        notes: input.notes.as_deref(),
        items: &input.items,
    };

    let saved = db.save_invoice_with_items(user_id, Some(id), &record).await?;
    info!(user_id, invoice_id = id, total = saved.invoice.total, "invoice updated");
    Ok(saved)
}

fn transition_error(from: InvoiceStatus, to: InvoiceStatus) -> Error {
    Error::Conflict(format!("invoice cannot move from {} to {}", from, to))
}

/// Change the status from the list dropdown.
///
/// Moving to `paid` goes through [`mark_paid`] so the income entry is
/// recorded.
pub async fn set_status(
    db: &Database,
    user_id: i32,
    id: i32,
    status: InvoiceStatus,
) -> Result<Invoice> {
    let current = db.get_invoice(user_id, id).await?;
    if current.status == status {
        return Ok(current);
    }
    if !current.status.can_transition_to(status) {
        return Err(transition_error(current.status, status));
    }
    if status == InvoiceStatus::Paid {
        return mark_paid(db, user_id, id, None).await.map(|(invoice, _)| invoice);
    }

    let invoice = db.set_invoice_status(user_id, id, status).await?;
    info!(user_id, invoice_id = id, from = %current.status, to = %status, "invoice status changed");
    Ok(invoice)
}

/// Mark an invoice paid and book its total as income.
pub async fn mark_paid(
    db: &Database,
    user_id: i32,
    id: i32,
    paid_on: Option<NaiveDate>,
) -> Result<(Invoice, Transaction)> {
    let current = db.get_invoice(user_id, id).await?;
    match current.status {
        InvoiceStatus::Paid => {
            return Err(Error::Conflict("invoice is already paid".to_string()));
        }
        InvoiceStatus::Cancelled => {
            return Err(Error::Conflict("cancelled invoices cannot be paid".to_string()));
        }
        _ => {}
    }

    let (invoice, transaction) = db
        .mark_invoice_paid(user_id, id, paid_on.unwrap_or_else(today))
        .await?;
    info!(
        user_id,
        invoice_id = id,
        transaction_id = transaction.id,
        amount = transaction.amount,
        "invoice paid"
    );
    Ok((invoice, transaction))
}

/// Flag every sent invoice past its due date as overdue.
pub async fn sweep_overdue(db: &Database, user_id: i32, today: NaiveDate) -> Result<Vec<Invoice>> {
    let flagged = db.mark_overdue_invoices(user_id, today).await?;
    if !flagged.is_empty() {
        info!(user_id, count = flagged.len(), "invoices marked overdue");
    }
    Ok(flagged)
}

pub async fn delete(db: &Database, user_id: i32, id: i32) -> Result<()> {
    db.delete_invoice(user_id, id).await?;
    info!(user_id, invoice_id = id, "invoice deleted");
    Ok(())
}

/// Render the invoice, mail it to the customer and mark a draft as sent.
pub async fn email(state: &AppState, user_id: i32, id: i32, message: Option<String>) -> Result<Invoice> {
    if !state.mailer.is_configured() {
        return Err(Error::Config("SMTP relay is not configured".to_string()));
    }
    let db = &state.db;
    let document = db.get_invoice_with_items(user_id, id).await?;
    if document.invoice.status == InvoiceStatus::Cancelled {
        return Err(Error::Conflict("cancelled invoices cannot be sent".to_string()));
    }
    let seller = db.get_user(user_id).await?;
    let customer = db.get_customer(user_id, document.invoice.customer_id).await?;

    let rendered = state
        .documents
        .render(&DocumentView::invoice(&document, &seller, &customer))
        .await?;

    let seller_name = seller.company_name.as_deref().unwrap_or(&seller.name);
    let mail = OutgoingMail {
        to: customer.email.clone(),
        subject: format!("Invoice {} from {}", document.invoice.number, seller_name),
        body: clean_optional(message).unwrap_or_else(|| {
            format!(
                "Hello {},\n\nPlease find attached invoice {} for {:.2}, due {}.\n\n{}",
                customer.name,
                document.invoice.number,
                document.invoice.total,
                document.invoice.due_date.format("%Y-%m-%d"),
                seller_name
            )
        }),
        attachment: rendered.clone(),
    };

    let sent = state.mailer.send(mail).await;
    rendered.cleanup().await;
    sent?;

    info!(user_id, invoice_id = id, to = %customer.email, "invoice e-mailed");

    if document.invoice.status == InvoiceStatus::Draft {
        return db.set_invoice_status(user_id, id, InvoiceStatus::Sent).await;
    }
    if document.invoice.status == InvoiceStatus::Paid {
        warn!(user_id, invoice_id = id, "paid invoice was e-mailed again");
    }
    Ok(document.invoice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::totals::Adjustment;

    fn input() -> InvoiceInput {
        InvoiceInput {
            customer_id: 1,
            number: Some("   ".into()),
            issue_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
            status: None,
            discount: Adjustment::percentage(10.0),
            tax: Adjustment::percentage(5.0),
            notes: Some(" net 30 ".into()),
            items: vec![
                LineItemInput { description: " Widget ".into(), quantity: 2.0, unit_price: 10.0 },
                LineItemInput { description: "Gadget".into(), quantity: 1.0, unit_price: 5.0 },
            ],
        }
    }

    #[test]
    fn normalize_trims_and_blanks() {
        let input = normalize(input());
        assert!(input.number.is_none());
        assert_eq!(input.notes.as_deref(), Some("net 30"));
        assert_eq!(input.items[0].description, "Widget");
    }

    #[test]
    fn totals_follow_items_and_adjustments() {
        let totals = compute_totals(&input());
        assert_eq!(totals.subtotal, 25.0);
        assert_eq!(totals.discount_amount, 2.5);
        assert_eq!(totals.tax_amount, 1.125);
        assert_eq!(totals.total, 23.625);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_database() {
        let db = Database::connect_lazy("postgres://localhost:1/unused").unwrap();
        let mut bad = input();
        bad.items.clear();

        let err = create(&db, 1, bad).await.unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("items")));
    }
}
