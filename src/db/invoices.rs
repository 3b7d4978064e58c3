use chrono::NaiveDate;
use sqlx::PgConnection;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{
    Invoice, InvoiceStatus, InvoiceWithItems, LineItem, LineItemInput, Transaction,
    TransactionKind,
};
use crate::totals::{line_amount, Adjustment, Totals};

fn db_err(err: sqlx::Error) -> Error {
    Error::from_db("Invoice", err)
}

const ITEM_COLUMNS: &str =
    "id, invoice_id AS document_id, description, quantity, unit_price, amount, position";

/// Everything persisted for an invoice, with totals already computed.
#[derive(Debug, Clone)]
pub struct NewInvoiceRecord<'a> {
    pub customer_id: i32,
    pub number: &'a str,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub discount: Adjustment,
    pub tax: Adjustment,
    pub totals: Totals,
    pub notes: Option<&'a str>,
    pub items: &'a [LineItemInput],
}

impl Database {
    pub async fn get_invoices(
        &self,
        user_id: i32,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<Invoice>> {
        sqlx::query_as::<_, Invoice>(
            r#"
            SELECT * FROM invoices
            WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY issue_date DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn get_invoice(&self, user_id: i32, id: i32) -> Result<Invoice> {
        sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_one(self.get_pool())
            .await
            .map_err(db_err)
    }

    pub async fn get_invoice_items(&self, invoice_id: i32) -> Result<Vec<LineItem>> {
        sqlx::query_as::<_, LineItem>(&format!(
            "SELECT {} FROM invoice_items WHERE invoice_id = $1 ORDER BY position ASC, id ASC",
            ITEM_COLUMNS
        ))
        .bind(invoice_id)
        .fetch_all(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn get_invoice_with_items(&self, user_id: i32, id: i32) -> Result<InvoiceWithItems> {
        let invoice = self.get_invoice(user_id, id).await?;
        let items = self.get_invoice_items(invoice.id).await?;
        Ok(InvoiceWithItems { invoice, items })
    }

    /// Numbers already issued by the tenant that start with `prefix`.
    pub async fn get_invoice_numbers(&self, user_id: i32, prefix: &str) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT number FROM invoices WHERE user_id = $1 AND starts_with(number, $2)",
        )
        .bind(user_id)
        .bind(prefix)
        .fetch_all(self.get_pool())
        .await
        .map_err(db_err)
    }

    /// Insert (`id == None`) or update an invoice and replace its items in
    /// one transaction.
    pub async fn save_invoice_with_items(
        &self,
        user_id: i32,
        id: Option<i32>,
        record: &NewInvoiceRecord<'_>,
    ) -> Result<InvoiceWithItems> {
        let mut tx = self.get_pool().begin().await.map_err(db_err)?;

        let invoice = match id {
            None => insert_invoice(&mut *tx, user_id, record).await?,
            Some(id) => {
                let updated = sqlx::query_as::<_, Invoice>(
                    r#"
                    UPDATE invoices
                    SET customer_id = $1, number = $2, issue_date = $3, due_date = $4, status = $5,
                        discount_type = $6, discount_value = $7, tax_type = $8, tax_value = $9,
                        subtotal = $10, discount_amount = $11, tax_amount = $12, total = $13,
                        notes = $14, updated_at = now()
                    WHERE id = $15 AND user_id = $16 AND status NOT IN ($17, $18)
                    RETURNING *
                    "#,
                )
                .bind(record.customer_id)
                .bind(record.number)
                .bind(record.issue_date)
                .bind(record.due_date)
                .bind(record.status)
                .bind(record.discount.kind)
                .bind(record.discount.value)
                .bind(record.tax.kind)
                .bind(record.tax.value)
                .bind(record.totals.subtotal)
                .bind(record.totals.discount_amount)
                .bind(record.totals.tax_amount)
                .bind(record.totals.total)
                .bind(record.notes)
                .bind(id)
                .bind(user_id)
                .bind(InvoiceStatus::Paid)
                .bind(InvoiceStatus::Cancelled)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;

                // A pay or cancel that committed after the caller's read wins.
                let Some(updated) = updated else {
                    return Err(closed_or_missing(&mut *tx, user_id, id).await);
                };

                sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err)?;

                updated
            }
        };

        let items = insert_invoice_items(&mut *tx, invoice.id, record.items).await?;

        tx.commit().await.map_err(db_err)?;

        Ok(InvoiceWithItems { invoice, items })
    }

    /// Paid and cancelled invoices are left untouched.
    pub async fn set_invoice_status(
        &self,
        user_id: i32,
        id: i32,
        status: InvoiceStatus,
    ) -> Result<Invoice> {
        let mut conn = self.get_pool().acquire().await.map_err(db_err)?;
        let updated = sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices SET status = $1, updated_at = now()
            WHERE id = $2 AND user_id = $3 AND status NOT IN ($4, $5)
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(id)
        .bind(user_id)
        .bind(InvoiceStatus::Paid)
        .bind(InvoiceStatus::Cancelled)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;

        match updated {
            Some(invoice) => Ok(invoice),
            None => Err(closed_or_missing(&mut *conn, user_id, id).await),
        }
    }

    /// Mark an invoice paid and book the matching income entry together.
    pub async fn mark_invoice_paid(
        &self,
        user_id: i32,
        id: i32,
        paid_on: NaiveDate,
    ) -> Result<(Invoice, Transaction)> {
        let mut tx = self.get_pool().begin().await.map_err(db_err)?;

        // The status guard makes concurrent payments book a single entry:
        // the loser re-reads the row after the winner commits and matches
        // nothing.
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices SET status = $1, updated_at = now()
            WHERE id = $2 AND user_id = $3 AND status NOT IN ($1, $4)
            RETURNING *
            "#,
        )
        .bind(InvoiceStatus::Paid)
        .bind(id)
        .bind(user_id)
        .bind(InvoiceStatus::Cancelled)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;

        let Some(invoice) = invoice else {
            return Err(closed_or_missing(&mut *tx, user_id, id).await);
        };

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (user_id, kind, amount, description, category, occurred_on, invoice_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(TransactionKind::Income)
        .bind(invoice.total)
        .bind(format!("Payment for invoice {}", invoice.number))
        .bind("invoice")
        .bind(paid_on)
        .bind(invoice.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Error::from_db("Transaction", e))?;

        tx.commit().await.map_err(db_err)?;

        Ok((invoice, transaction))
    }

    /// Flip sent invoices whose due date has passed to overdue.
    pub async fn mark_overdue_invoices(&self, user_id: i32, today: NaiveDate) -> Result<Vec<Invoice>> {
        sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices SET status = $1, updated_at = now()
            WHERE user_id = $2 AND status = $3 AND due_date < $4
            RETURNING *
            "#,
        )
        .bind(InvoiceStatus::Overdue)
        .bind(user_id)
        .bind(InvoiceStatus::Sent)
        .bind(today)
        .fetch_all(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn delete_invoice(&self, user_id: i32, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.get_pool())
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Invoice".to_string()));
        }
        Ok(())
    }
}

/// Error for a guarded write that matched no row: the invoice is either
/// closed (paid or cancelled) or gone.
async fn closed_or_missing(conn: &mut PgConnection, user_id: i32, id: i32) -> Error {
    let status = sqlx::query_scalar::<_, InvoiceStatus>(
        "SELECT status FROM invoices WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(conn)
    .await;

    match status {
        Ok(Some(status)) => Error::Conflict(format!("invoice is already {}", status)),
        Ok(None) => Error::NotFound("Invoice".to_string()),
        Err(e) => db_err(e),
    }
}

pub(super) async fn insert_invoice(
    conn: &mut PgConnection,
    user_id: i32,
    record: &NewInvoiceRecord<'_>,
) -> Result<Invoice> {
    sqlx::query_as::<_, Invoice>(
        r#"
        INSERT INTO invoices
            (user_id, customer_id, number, issue_date, due_date, status,
             discount_type, discount_value, tax_type, tax_value,
             subtotal, discount_amount, tax_amount, total, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(record.customer_id)
    .bind(record.number)
    .bind(record.issue_date)
    .bind(record.due_date)
    .bind(record.status)
    .bind(record.discount.kind)
    .bind(record.discount.value)
    .bind(record.tax.kind)
    .bind(record.tax.value)
    .bind(record.totals.subtotal)
    .bind(record.totals.discount_amount)
    .bind(record.totals.tax_amount)
    .bind(record.totals.total)
    .bind(record.notes)
    .fetch_one(conn)
    .await
    .map_err(db_err)
}

pub(super) async fn insert_invoice_items(
    conn: &mut PgConnection,
    invoice_id: i32,
    items: &[LineItemInput],
) -> Result<Vec<LineItem>> {
    let sql = format!(
        r#"
        INSERT INTO invoice_items (invoice_id, description, quantity, unit_price, amount, position)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {}
        "#,
        ITEM_COLUMNS
    );

    let mut saved = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let row = sqlx::query_as::<_, LineItem>(&sql)
            .bind(invoice_id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(line_amount(item.quantity, item.unit_price))
            .bind(position as i32)
            .fetch_one(&mut *conn)
            .await
            .map_err(db_err)?;
        saved.push(row);
    }
    Ok(saved)
}
