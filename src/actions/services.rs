use tracing::info;
use validator::Validate;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Service, ServiceInput};
use crate::validation::clean_optional;

fn normalize(input: ServiceInput) -> ServiceInput {
    ServiceInput {
        name: input.name.trim().to_string(),
        description: clean_optional(input.description),
        ..input
    }
}

pub async fn list(db: &Database, user_id: i32) -> Result<Vec<Service>> {
    db.get_services(user_id).await
}

pub async fn get(db: &Database, user_id: i32, id: i32) -> Result<Service> {
    db.get_service(user_id, id).await
}

pub async fn create(db: &Database, user_id: i32, input: ServiceInput) -> Result<Service> {
    let input = normalize(input);
    input.validate()?;
    let service = db.create_service(user_id, &input).await?;
    info!(user_id, service_id = service.id, "service created");
    Ok(service)
}

pub async fn update(db: &Database, user_id: i32, id: i32, input: ServiceInput) -> Result<Service> {
    let input = normalize(input);
    input.validate()?;
    db.update_service(user_id, id, &input).await
}

pub async fn delete(db: &Database, user_id: i32, id: i32) -> Result<()> {
    db.delete_service(user_id, id).await
}
