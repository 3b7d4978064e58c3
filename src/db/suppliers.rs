use super::Database;
use crate::error::{Error, Result};
use crate::models::{Supplier, SupplierInput};

fn db_err(err: sqlx::Error) -> Error {
    Error::from_db("Supplier", err)
}

impl Database {
    pub async fn get_suppliers(&self, user_id: i32) -> Result<Vec<Supplier>> {
        sqlx::query_as::<_, Supplier>(
            "SELECT * FROM suppliers WHERE user_id = $1 ORDER BY name ASC",
        )
        .bind(user_id)
        .fetch_all(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn get_supplier(&self, user_id: i32, id: i32) -> Result<Supplier> {
        sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_one(self.get_pool())
            .await
            .map_err(db_err)
    }

    pub async fn create_supplier(&self, user_id: i32, supplier: &SupplierInput) -> Result<Supplier> {
        sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (user_id, name, email, phone, address, contact_person)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&supplier.name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(&supplier.contact_person)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn update_supplier(
        &self,
        user_id: i32,
        id: i32,
        supplier: &SupplierInput,
    ) -> Result<Supplier> {
        sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = $1, email = $2, phone = $3, address = $4, contact_person = $5,
                updated_at = now()
            WHERE id = $6 AND user_id = $7
            RETURNING *
            "#,
        )
        .bind(&supplier.name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(&supplier.contact_person)
        .bind(id)
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn delete_supplier(&self, user_id: i32, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.get_pool())
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Supplier".to_string()));
        }
        Ok(())
    }
}
