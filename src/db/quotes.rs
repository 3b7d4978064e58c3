use chrono::NaiveDate;
use sqlx::PgConnection;

use super::invoices::{insert_invoice, insert_invoice_items, NewInvoiceRecord};
use super::Database;
use crate::error::{Error, Result};
use crate::models::{
    InvoiceWithItems, LineItem, LineItemInput, Quote, QuoteStatus, QuoteWithItems,
};
use crate::totals::{line_amount, Adjustment, Totals};

fn db_err(err: sqlx::Error) -> Error {
    Error::from_db("Quote", err)
}

const ITEM_COLUMNS: &str =
    "id, quote_id AS document_id, description, quantity, unit_price, amount, position";

#[derive(Debug, Clone)]
pub struct NewQuoteRecord<'a> {
    pub customer_id: i32,
    pub number: &'a str,
    pub issue_date: NaiveDate,
    pub valid_until: NaiveDate,
    pub status: QuoteStatus,
    pub discount: Adjustment,
    pub tax: Adjustment,
    pub totals: Totals,
    pub notes: Option<&'a str>,
    pub items: &'a [LineItemInput],
}

impl Database {
    pub async fn get_quotes(&self, user_id: i32, status: Option<QuoteStatus>) -> Result<Vec<Quote>> {
        sqlx::query_as::<_, Quote>(
            r#"
            SELECT * FROM quotes
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

    pub async fn get_quote(&self, user_id: i32, id: i32) -> Result<Quote> {
        sqlx::query_as::<_, Quote>("SELECT * FROM quotes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_one(self.get_pool())
            .await
            .map_err(db_err)
    }

    pub async fn get_quote_items(&self, quote_id: i32) -> Result<Vec<LineItem>> {
        sqlx::query_as::<_, LineItem>(&format!(
            "SELECT {} FROM quote_items WHERE quote_id = $1 ORDER BY position ASC, id ASC",
            ITEM_COLUMNS
        ))
        .bind(quote_id)
        .fetch_all(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn get_quote_with_items(&self, user_id: i32, id: i32) -> Result<QuoteWithItems> {
        let quote = self.get_quote(user_id, id).await?;
        let items = self.get_quote_items(quote.id).await?;
        Ok(QuoteWithItems { quote, items })
    }

    pub async fn get_quote_numbers(&self, user_id: i32, prefix: &str) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT number FROM quotes WHERE user_id = $1 AND starts_with(number, $2)",
        )
        .bind(user_id)
        .bind(prefix)
        .fetch_all(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn save_quote_with_items(
        &self,
        user_id: i32,
        id: Option<i32>,
        record: &NewQuoteRecord<'_>,
    ) -> Result<QuoteWithItems> {
        let mut tx = self.get_pool().begin().await.map_err(db_err)?;

        let quote = match id {
            None => sqlx::query_as::<_, Quote>(
                r#"
                INSERT INTO quotes
                    (user_id, customer_id, number, issue_date, valid_until, status,
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
            .bind(record.valid_until)
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
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?,
            Some(id) => {
                let updated = sqlx::query_as::<_, Quote>(
                    r#"
                    UPDATE quotes
                    SET customer_id = $1, number = $2, issue_date = $3, valid_until = $4, status = $5,
                        discount_type = $6, discount_value = $7, tax_type = $8, tax_value = $9,
                        subtotal = $10, discount_amount = $11, tax_amount = $12, total = $13,
                        notes = $14, updated_at = now()
                    WHERE id = $15 AND user_id = $16 AND invoice_id IS NULL
                    RETURNING *
                    "#,
                )
                .bind(record.customer_id)
                .bind(record.number)
                .bind(record.issue_date)
                .bind(record.valid_until)
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
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;

                let Some(updated) = updated else {
                    let exists = sqlx::query_scalar::<_, i32>(
                        "SELECT id FROM quotes WHERE id = $1 AND user_id = $2",
                    )
                    .bind(id)
                    .bind(user_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(db_err)?;
                    return Err(match exists {
                        Some(_) => Error::Conflict("converted quotes cannot be edited".to_string()),
                        None => Error::NotFound("Quote".to_string()),
                    });
                };

                sqlx::query("DELETE FROM quote_items WHERE quote_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err)?;

                updated
            }
        };

        let items = insert_quote_items(&mut *tx, quote.id, record.items).await?;

        tx.commit().await.map_err(db_err)?;

        Ok(QuoteWithItems { quote, items })
    }

    pub async fn set_quote_status(&self, user_id: i32, id: i32, status: QuoteStatus) -> Result<Quote> {
        sqlx::query_as::<_, Quote>(
            r#"
            UPDATE quotes SET status = $1, updated_at = now()
            WHERE id = $2 AND user_id = $3
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(id)
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    /// Create the invoice for an accepted quote and link the quote to it in
    /// one transaction.
    pub async fn convert_quote_to_invoice(
        &self,
        user_id: i32,
        quote_id: i32,
        record: &NewInvoiceRecord<'_>,
    ) -> Result<InvoiceWithItems> {
        let mut tx = self.get_pool().begin().await.map_err(db_err)?;

        let invoice = insert_invoice(&mut *tx, user_id, record).await?;
        let items = insert_invoice_items(&mut *tx, invoice.id, record.items).await?;

        let linked = sqlx::query(
            r#"
            UPDATE quotes SET invoice_id = $1, updated_at = now()
            WHERE id = $2 AND user_id = $3 AND invoice_id IS NULL
            "#,
        )
        .bind(invoice.id)
        .bind(quote_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        if linked.rows_affected() == 0 {
            // Dropping the transaction rolls back the new invoice.
            return Err(Error::Conflict("quote was already converted".to_string()));
        }

        tx.commit().await.map_err(db_err)?;

        Ok(InvoiceWithItems { invoice, items })
    }

    pub async fn delete_quote(&self, user_id: i32, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM quotes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.get_pool())
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Quote".to_string()));
        }
        Ok(())
    }
}

async fn insert_quote_items(
    conn: &mut PgConnection,
    quote_id: i32,
    items: &[LineItemInput],
) -> Result<Vec<LineItem>> {
    let sql = format!(
        r#"
        INSERT INTO quote_items (quote_id, description, quantity, unit_price, amount, position)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {}
        "#,
        ITEM_COLUMNS
    );

    let mut saved = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let row = sqlx::query_as::<_, LineItem>(&sql)
            .bind(quote_id)
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
