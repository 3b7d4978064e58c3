use tracing::info;
use validator::Validate;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Supplier, SupplierInput};
use crate::validation::clean_optional;

fn normalize(input: SupplierInput) -> SupplierInput {
    SupplierInput {
        name: input.name.trim().to_string(),
        email: input.email.trim().to_string(),
        phone: clean_optional(input.phone),
        address: clean_optional(input.address),
        contact_person: clean_optional(input.contact_person),
    }
}

pub async fn list(db: &Database, user_id: i32) -> Result<Vec<Supplier>> {
    db.get_suppliers(user_id).await
}

pub async fn get(db: &Database, user_id: i32, id: i32) -> Result<Supplier> {
    db.get_supplier(user_id, id).await
}

pub async fn create(db: &Database, user_id: i32, input: SupplierInput) -> Result<Supplier> {
    let input = normalize(input);
    input.validate()?;
    let supplier = db.create_supplier(user_id, &input).await?;
    info!(user_id, supplier_id = supplier.id, "supplier created");
    Ok(supplier)
}

pub async fn update(db: &Database, user_id: i32, id: i32, input: SupplierInput) -> Result<Supplier> {
    let input = normalize(input);
    input.validate()?;
    db.update_supplier(user_id, id, &input).await
}

pub async fn delete(db: &Database, user_id: i32, id: i32) -> Result<()> {
    db.delete_supplier(user_id, id).await
}
