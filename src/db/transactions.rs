use chrono::NaiveDate;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionInput, TransactionSummary};

fn db_err(err: sqlx::Error) -> Error {
    Error::from_db("Transaction", err)
}

/// Headline numbers for the dashboard.
#[derive(sqlx::FromRow, Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct DashboardStats {
    pub customers: i64,
    pub products: i64,
    pub low_stock_products: i64,
    pub open_invoices: i64,
    pub paid_revenue: f64,
    pub outstanding: f64,
    pub pending_quotes: i64,
    pub upcoming_appointments: i64,
    pub pending_submissions: i64,
}

impl Database {
    pub async fn get_transactions(
        &self,
        user_id: i32,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE user_id = $1
              AND ($2::date IS NULL OR occurred_on >= $2)
              AND ($3::date IS NULL OR occurred_on <= $3)
            ORDER BY occurred_on DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn get_transaction(&self, user_id: i32, id: i32) -> Result<Transaction> {
        sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn create_transaction(
        &self,
        user_id: i32,
        transaction: &TransactionInput,
    ) -> Result<Transaction> {
        sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (user_id, kind, amount, description, category, occurred_on)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(transaction.kind)
        .bind(transaction.amount)
        .bind(&transaction.description)
        .bind(&transaction.category)
        .bind(transaction.occurred_on)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn update_transaction(
        &self,
        user_id: i32,
        id: i32,
        transaction: &TransactionInput,
    ) -> Result<Transaction> {
        sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET kind = $1, amount = $2, description = $3, category = $4, occurred_on = $5,
                updated_at = now()
            WHERE id = $6 AND user_id = $7
            RETURNING *
            "#,
        )
        .bind(transaction.kind)
        .bind(transaction.amount)
        .bind(&transaction.description)
        .bind(&transaction.category)
        .bind(transaction.occurred_on)
        .bind(id)
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn delete_transaction(&self, user_id: i32, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.get_pool())
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Transaction".to_string()));
        }
        Ok(())
    }

    pub async fn get_transaction_summary(
        &self,
        user_id: i32,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<TransactionSummary> {
        let (income, expense): (f64, f64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE kind = 'income'), 0)::float8,
                COALESCE(SUM(amount) FILTER (WHERE kind = 'expense'), 0)::float8
            FROM transactions
            WHERE user_id = $1
              AND ($2::date IS NULL OR occurred_on >= $2)
              AND ($3::date IS NULL OR occurred_on <= $3)
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)?;

        Ok(TransactionSummary::new(income, expense))
    }

    pub async fn get_dashboard_stats(&self, user_id: i32) -> Result<DashboardStats> {
        sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM customers WHERE user_id = $1) AS customers,
                (SELECT COUNT(*) FROM products WHERE user_id = $1) AS products,
                (SELECT COUNT(*) FROM products
                    WHERE user_id = $1 AND stock_quantity <= reorder_level) AS low_stock_products,
                (SELECT COUNT(*) FROM invoices
                    WHERE user_id = $1 AND status IN ('sent', 'overdue')) AS open_invoices,
                (SELECT COALESCE(SUM(total), 0)::float8 FROM invoices
                    WHERE user_id = $1 AND status = 'paid') AS paid_revenue,
                (SELECT COALESCE(SUM(total), 0)::float8 FROM invoices
                    WHERE user_id = $1 AND status IN ('sent', 'overdue')) AS outstanding,
                (SELECT COUNT(*) FROM quotes
                    WHERE user_id = $1 AND status IN ('draft', 'sent')) AS pending_quotes,
                (SELECT COUNT(*) FROM appointments
                    WHERE user_id = $1 AND starts_at >= now()::timestamp
                      AND status IN ('scheduled', 'confirmed')) AS upcoming_appointments,
                (SELECT COUNT(*) FROM project_submissions
                    WHERE user_id = $1 AND status IN ('pending', 'in_review')) AS pending_submissions
            "#,
        )
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }
}
