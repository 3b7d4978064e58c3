use super::Database;
use crate::error::{Error, Result};
use crate::models::{Product, ProductInput};

fn db_err(err: sqlx::Error) -> Error {
    Error::from_db("Product", err)
}

impl Database {
    pub async fn get_products(&self, user_id: i32) -> Result<Vec<Product>> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE user_id = $1 ORDER BY name ASC")
            .bind(user_id)
            .fetch_all(self.get_pool())
            .await
            .map_err(db_err)
    }

    pub async fn get_product(&self, user_id: i32, id: i32) -> Result<Product> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_one(self.get_pool())
            .await
            .map_err(db_err)
    }

    /// Products at or below their reorder level, emptiest first.
    pub async fn get_low_stock_products(&self, user_id: i32) -> Result<Vec<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE user_id = $1 AND stock_quantity <= reorder_level
            ORDER BY stock_quantity ASC, name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn create_product(&self, user_id: i32, product: &ProductInput) -> Result<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (user_id, supplier_id, name, description, sku, price, cost, stock_quantity, reorder_level)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(product.supplier_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.sku)
        .bind(product.price)
        .bind(product.cost)
        .bind(product.stock_quantity)
        .bind(product.reorder_level)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    pub async fn update_product(
        &self,
        user_id: i32,
        id: i32,
        product: &ProductInput,
    ) -> Result<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET supplier_id = $1, name = $2, description = $3, sku = $4, price = $5, cost = $6,
                stock_quantity = $7, reorder_level = $8, updated_at = now()
            WHERE id = $9 AND user_id = $10
            RETURNING *
            "#,
        )
        .bind(product.supplier_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.sku)
        .bind(product.price)
        .bind(product.cost)
        .bind(product.stock_quantity)
        .bind(product.reorder_level)
        .bind(id)
        .bind(user_id)
        .fetch_one(self.get_pool())
        .await
        .map_err(db_err)
    }

    /// Apply a stock delta atomically. Returns `None` when the product
    /// exists but the delta would take stock below zero.
    pub async fn adjust_product_stock(
        &self,
        user_id: i32,
        id: i32,
        delta: i32,
    ) -> Result<Option<Product>> {
        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + $1, updated_at = now()
            WHERE id = $2 AND user_id = $3 AND stock_quantity + $1 >= 0
            RETURNING *
            "#,
        )
        .bind(delta)
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.get_pool())
        .await
        .map_err(db_err)?;

        if updated.is_none() {
            // Distinguish "insufficient stock" from "no such product".
            self.get_product(user_id, id).await?;
        }
        Ok(updated)
    }

    pub async fn delete_product(&self, user_id: i32, id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.get_pool())
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Product".to_string()));
        }
        Ok(())
    }
}
