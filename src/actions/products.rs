use tracing::{info, warn};
use validator::Validate;

use super::missing_reference;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Product, ProductInput, StockAdjustment};
use crate::validation::clean_optional;

fn normalize(input: ProductInput) -> ProductInput {
    ProductInput {
        name: input.name.trim().to_string(),
        description: clean_optional(input.description),
        sku: input.sku.trim().to_uppercase(),
        ..input
    }
}

async fn ensure_supplier(db: &Database, user_id: i32, input: &ProductInput) -> Result<()> {
    if let Some(supplier_id) = input.supplier_id {
        db.get_supplier(user_id, supplier_id)
            .await
            .map_err(|e| missing_reference("supplier_id", e))?;
    }
    Ok(())
}

pub async fn list(db: &Database, user_id: i32) -> Result<Vec<Product>> {
    db.get_products(user_id).await
}

pub async fn get(db: &Database, user_id: i32, id: i32) -> Result<Product> {
    db.get_product(user_id, id).await
}

/// Products at or below their reorder level.
pub async fn low_stock(db: &Database, user_id: i32) -> Result<Vec<Product>> {
    db.get_low_stock_products(user_id).await
}

pub async fn create(db: &Database, user_id: i32, input: ProductInput) -> Result<Product> {
    let input = normalize(input);
    input.validate()?;
    ensure_supplier(db, user_id, &input).await?;

    let product = db.create_product(user_id, &input).await?;
    info!(user_id, product_id = product.id, sku = %product.sku, "product created");
    Ok(product)
}

pub async fn update(db: &Database, user_id: i32, id: i32, input: ProductInput) -> Result<Product> {
    let input = normalize(input);
    input.validate()?;
    ensure_supplier(db, user_id, &input).await?;
    db.update_product(user_id, id, &input).await
}

/// Apply a stock movement. Stock never drops below zero.
pub async fn adjust_stock(
    db: &Database,
    user_id: i32,
    id: i32,
    adjustment: StockAdjustment,
) -> Result<Product> {
    if adjustment.delta == 0 {
        return Err(Error::Validation("delta: must not be zero".to_string()));
    }

    match db.adjust_product_stock(user_id, id, adjustment.delta).await? {
        Some(product) => {
            info!(
                user_id,
                product_id = id,
                delta = adjustment.delta,
                reason = adjustment.reason.as_deref().unwrap_or(""),
                stock = product.stock_quantity,
                "stock adjusted"
            );
            if product.is_low_stock() {
                warn!(user_id, product_id = id, stock = product.stock_quantity, "product is low on stock");
            }
            Ok(product)
        }
        None => {
            // Distinguish a missing product from an oversized withdrawal.
            let product = db.get_product(user_id, id).await?;
            Err(Error::Conflict(format!(
                "insufficient stock: {} on hand, {} requested",
                product.stock_quantity, -adjustment.delta
            )))
        }
    }
}

pub async fn delete(db: &Database, user_id: i32, id: i32) -> Result<()> {
    db.delete_product(user_id, id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sku_is_uppercased() {
        let input = normalize(ProductInput {
            name: " Mug ".into(),
            description: None,
            sku: " mug-01 ".into(),
            price: 8.0,
            cost: 3.0,
            stock_quantity: 4,
            reorder_level: 2,
            supplier_id: None,
        });
        assert_eq!(input.sku, "MUG-01");
        assert_eq!(input.name, "Mug");
    }

    #[tokio::test]
    async fn zero_delta_is_rejected_before_querying() {
        let db = Database::connect_lazy("postgres://localhost:1/unused").unwrap();
        let err = adjust_stock(&db, 1, 1, StockAdjustment { delta: 0, reason: None })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
