use super::Database;
use crate::error::{Error, Result};
use crate::models::{Customer, CustomerInput};

fn db_err(err: sqlx::Error) -> Error {
    Error::from_db("Customer", err)
}

impl Database {
    pub async fn get_customers(&self, user_id: i32) -> Result<Vec<Customer>> {
        sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE user_id = $1 ORDER BY name ASC",
        )
        .bind(user_id)
        .fetch_all(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn get_customer(&self, user_id: i32, id: i32) -> Result<Customer> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_one(self.get_pool())
            .await
            .map_err(db_err)
    }

    pub async fn create_customer(&self, user_id: i32, customer: &CustomerInput) -> Result<Customer> {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (user_id, name, email, phone, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn update_customer(
        &self,
        user_id: i32,
        id: i32,
        customer: &CustomerInput,
    ) -> Result<Customer> {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = $1, email = $2, phone = $3, address = $4, updated_at = now()
            WHERE id = $5 AND user_id = $6
            RETURNING *
            "#,
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(id)
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn delete_customer(&self, user_id: i32, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.get_pool())
            .await
            .map_err(|e| match Error::from_db("Customer", e) {
                Error::InvalidInput(_) => Error::Conflict(
                    "customer still has invoices or quotes".to_string(),
                ),
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Customer".to_string()));
        }
        Ok(())
    }
}
