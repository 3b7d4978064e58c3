use tracing::info;
use validator::Validate;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{User, UserInput};
use crate::validation::clean_optional;

fn normalize(input: UserInput) -> UserInput {
    UserInput {
        name: input.name.trim().to_string(),
        email: input.email.trim().to_lowercase(),
        company_name: clean_optional(input.company_name),
        phone: clean_optional(input.phone),
    }
}

pub async fn get(db: &Database, user_id: i32) -> Result<User> {
    db.get_user(user_id).await
}

/// Register a tenant. E-mail addresses are unique case-insensitively.
pub async fn register(db: &Database, input: UserInput) -> Result<User> {
    let input = normalize(input);
    input.validate()?;

    if db.find_user_by_email(&input.email).await?.is_some() {
        return Err(Error::AlreadyExists("User".to_string()));
    }

    let user = db.create_user(&input).await?;
    info!(user_id = user.id, "tenant registered");
    Ok(user)
}

pub async fn update(db: &Database, user_id: i32, input: UserInput) -> Result<User> {
    let input = normalize(input);
    input.validate()?;

    if let Some(existing) = db.find_user_by_email(&input.email).await? {
        if existing.id != user_id {
            return Err(Error::AlreadyExists("User".to_string()));
        }
    }
    db.update_user(user_id, &input).await
}

/// Reuse the tenant registered under `input.email`, or register it.
pub async fn find_or_register(db: &Database, input: UserInput) -> Result<User> {
    let input = normalize(input);
    match db.find_user_by_email(&input.email).await? {
        Some(user) => Ok(user),
        None => register(db, input).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_email() {
        let input = normalize(UserInput {
            name: "  Ada ".into(),
            email: " Ada@Example.COM ".into(),
            company_name: Some("   ".into()),
            phone: None,
        });
        assert_eq!(input.name, "Ada");
        assert_eq!(input.email, "ada@example.com");
        assert!(input.company_name.is_none());
    }
}
