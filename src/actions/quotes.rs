use tracing::info;
use validator::Validate;

use super::invoices::{self as invoice_actions, normalize_items};
use super::{ensure_customer, next_number, today};
use crate::db::{Database, NewInvoiceRecord, NewQuoteRecord};
use crate::error::{Error, Result};
use crate::models::{
    InvoiceStatus, InvoiceWithItems, LineItemInput, Quote, QuoteInput, QuoteStatus,
    QuoteWithItems,
};
use crate::services::{DocumentView, OutgoingMail};
use crate::state::AppState;
use crate::totals::{self, Totals};
use crate::validation::clean_optional;

pub const NUMBER_PREFIX: &str = "QT-";

/// Days a converted invoice gives the customer to pay.
const PAYMENT_TERM_DAYS: i64 = 30;

fn normalize(input: QuoteInput) -> QuoteInput {
    QuoteInput {
        number: clean_optional(input.number),
        notes: clean_optional(input.notes),
        items: normalize_items(input.items),
        ..input
    }
}

pub fn compute_totals(input: &QuoteInput) -> Totals {
    totals::calculate(input.items.iter().map(LineItemInput::line), input.discount, input.tax)
}

pub async fn next_quote_number(db: &Database, user_id: i32) -> Result<String> {
    let numbers = db.get_quote_numbers(user_id, NUMBER_PREFIX).await?;
    Ok(next_number(NUMBER_PREFIX, numbers.iter().map(String::as_str)))
}

pub async fn list(db: &Database, user_id: i32, status: Option<QuoteStatus>) -> Result<Vec<Quote>> {
    db.get_quotes(user_id, status).await
}

pub async fn get(db: &Database, user_id: i32, id: i32) -> Result<QuoteWithItems> {
    db.get_quote_with_items(user_id, id).await
}

pub async fn create(db: &Database, user_id: i32, input: QuoteInput) -> Result<QuoteWithItems> {
    let input = normalize(input);
    input.validate()?;
    ensure_customer(db, user_id, input.customer_id).await?;

    let number = match &input.number {
        Some(number) => number.clone(),
        None => next_quote_number(db, user_id).await?,
    };

    let record = NewQuoteRecord {
        customer_id: input.customer_id,
        number: &number,
        issue_date: input.issue_date,
        valid_until: input.valid_until,
        status: input.status.unwrap_or(QuoteStatus::Draft),
        discount: input.discount,
        tax: input.tax,
        totals: compute_totals(&input),
        notes: input.notes.as_deref(),
        items: &input.items,
    };

    let saved = db.save_quote_with_items(user_id, None, &record).await?;
    info!(user_id, quote_id = saved.quote.id, number = %saved.quote.number, "quote created");
    Ok(saved)
}

pub async fn update(db: &Database, user_id: i32, id: i32, input: QuoteInput) -> Result<QuoteWithItems> {
    let input = normalize(input);
    input.validate()?;

    let current = db.get_quote(user_id, id).await?;
    if current.invoice_id.is_some() {
        return Err(Error::Conflict("converted quotes cannot be edited".to_string()));
    }
    let status = input.status.unwrap_or(current.status);
    if !current.status.can_transition_to(status) {
        return Err(transition_error(current.status, status));
    }
    ensure_customer(db, user_id, input.customer_id).await?;

    let number = input.number.clone().unwrap_or_else(|| current.number.clone());
    let record = NewQuoteRecord {
        customer_id: input.customer_id,
        number: &number,
        issue_date: input.issue_date,
        valid_until: input.valid_until,
        status,
        discount: input.discount,
        tax: input.tax,
        totals: compute_totals(&input),
        notes: input.notes.as_deref(),
        items: &input.items,
    };

    let saved = db.save_quote_with_items(user_id, Some(id), &record).await?;
    info!(user_id, quote_id = id, total = saved.quote.total, "quote updated");
    Ok(saved)
}

fn transition_error(from: QuoteStatus, to: QuoteStatus) -> Error {
    Error::Conflict(format!("quote cannot move from {} to {}", from, to))
}

pub async fn set_status(db: &Database, user_id: i32, id: i32, status: QuoteStatus) -> Result<Quote> {
    let current = db.get_quote(user_id, id).await?;
    if current.status == status {
        return Ok(current);
    }
    if !current.status.can_transition_to(status) {
        return Err(transition_error(current.status, status));
    }

    let quote = db.set_quote_status(user_id, id, status).await?;
    info!(user_id, quote_id = id, from = %current.status, to = %status, "quote status changed");
    Ok(quote)
}

/// Turn an accepted quote into a draft invoice carrying the same items,
/// discount and tax.
pub async fn convert_to_invoice(db: &Database, user_id: i32, id: i32) -> Result<InvoiceWithItems> {
    let document = db.get_quote_with_items(user_id, id).await?;
    let quote = &document.quote;

    if quote.status != QuoteStatus::Accepted {
        return Err(Error::Conflict(format!(
            "only accepted quotes can be converted, this one is {}",
            quote.status
        )));
    }
    if quote.invoice_id.is_some() {
        return Err(Error::Conflict("quote was already converted".to_string()));
    }

    let items: Vec<LineItemInput> = document.items.iter().map(LineItemInput::from).collect();
    let totals = totals::calculate(
        items.iter().map(LineItemInput::line),
        quote.discount(),
        quote.tax(),
    );
    let number = invoice_actions::next_invoice_number(db, user_id).await?;
    let issue_date = today();
    let notes = match &quote.notes {
        Some(notes) => format!("{}\n\nFrom quote {}", notes, quote.number),
        None => format!("From quote {}", quote.number),
    };

    let record = NewInvoiceRecord {
        customer_id: quote.customer_id,
        number: &number,
        issue_date,
        due_date: issue_date + chrono::Duration::days(PAYMENT_TERM_DAYS),
        status: InvoiceStatus::Draft,
        discount: quote.discount(),
        tax: quote.tax(),
        totals,
        notes: Some(notes.as_str()),
        items: &items,
    };

    let invoice = db.convert_quote_to_invoice(user_id, id, &record).await?;
    info!(
        user_id,
        quote_id = id,
        invoice_id = invoice.invoice.id,
        number = %invoice.invoice.number,
        "quote converted to invoice"
    );
    Ok(invoice)
}

pub async fn delete(db: &Database, user_id: i32, id: i32) -> Result<()> {
    db.delete_quote(user_id, id).await?;
    info!(user_id, quote_id = id, "quote deleted");
    Ok(())
}

/// Render the quote, mail it to the customer and mark a draft as sent.
pub async fn email(state: &AppState, user_id: i32, id: i32, message: Option<String>) -> Result<Quote> {
    if !state.mailer.is_configured() {
        return Err(Error::Config("SMTP relay is not configured".to_string()));
    }
    let db = &state.db;
    let document = db.get_quote_with_items(user_id, id).await?;
    let seller = db.get_user(user_id).await?;
    let customer = db.get_customer(user_id, document.quote.customer_id).await?;

    let rendered = state
        .documents
        .render(&DocumentView::quote(&document, &seller, &customer))
        .await?;

    let seller_name = seller.company_name.as_deref().unwrap_or(&seller.name);
    let mail = OutgoingMail {
        to: customer.email.clone(),
        subject: format!("Quote {} from {}", document.quote.number, seller_name),
        body: clean_optional(message).unwrap_or_else(|| {
            format!(
                "Hello {},\n\nPlease find attached quote {} for {:.2}, valid until {}.\n\n{}",
                customer.name,
                document.quote.number,
                document.quote.total,
                document.quote.valid_until.format("%Y-%m-%d"),
                seller_name
            )
        }),
        attachment: rendered.clone(),
    };

    let sent = state.mailer.send(mail).await;
    rendered.cleanup().await;
    sent?;

    info!(user_id, quote_id = id, to = %customer.email, "quote e-mailed");

    if document.quote.status == QuoteStatus::Draft {
        return db.set_quote_status(user_id, id, QuoteStatus::Sent).await;
    }
    Ok(document.quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::totals::Adjustment;
    use chrono::NaiveDate;

    #[test]
    fn fixed_adjustments_total() {
        let input = QuoteInput {
            customer_id: 1,
            number: None,
            issue_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            status: None,
            discount: Adjustment::fixed(50.0),
            tax: Adjustment::percentage(10.0),
            notes: None,
            items: vec![LineItemInput { description: "Site build".into(), quantity: 1.0, unit_price: 1050.0 }],
        };
        let totals = compute_totals(&input);
        assert_eq!(totals.taxable_amount, 1000.0);
        assert_eq!(totals.tax_amount, 100.0);
        assert_eq!(totals.total, 1100.0);
    }
}
