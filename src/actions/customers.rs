use tracing::info;
use validator::Validate;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Customer, CustomerInput};
use crate::validation::clean_optional;

fn normalize(input: CustomerInput) -> CustomerInput {
    CustomerInput {
        name: input.name.trim().to_string(),
        email: input.email.trim().to_string(),
        phone: clean_optional(input.phone),
        address: clean_optional(input.address),
    }
}

pub async fn list(db: &Database, user_id: i32) -> Result<Vec<Customer>> {
    db.get_customers(user_id).await
}

pub async fn get(db: &Database, user_id: i32, id: i32) -> Result<Customer> {
    db.get_customer(user_id, id).await
}

pub async fn create(db: &Database, user_id: i32, input: CustomerInput) -> Result<Customer> {
    let input = normalize(input);
    input.validate()?;
    let customer = db.create_customer(user_id, &input).await?;
    info!(user_id, customer_id = customer.id, "customer created");
    Ok(customer)
}

pub async fn update(db: &Database, user_id: i32, id: i32, input: CustomerInput) -> Result<Customer> {
    let input = normalize(input);
    input.validate()?;
    db.update_customer(user_id, id, &input).await
}

/// Customers with invoices, quotes or appointments cannot be removed.
pub async fn delete(db: &Database, user_id: i32, id: i32) -> Result<()> {
    db.delete_customer(user_id, id).await?;
    info!(user_id, customer_id = id, "customer deleted");
    Ok(())
}
