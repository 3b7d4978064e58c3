use chrono::NaiveDate;
use tracing::info;
use validator::Validate;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionInput, TransactionSummary};
use crate::validation::clean_optional;

fn normalize(input: TransactionInput) -> TransactionInput {
    TransactionInput {
        description: input.description.trim().to_string(),
        category: clean_optional(input.category),
        ..input
    }
}

fn check_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<()> {
    match (from, to) {
        (Some(from), Some(to)) if to < from => {
            Err(Error::Validation("to: must not be before from".to_string()))
        }
        _ => Ok(()),
    }
}

pub async fn list(
    db: &Database,
    user_id: i32,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<Transaction>> {
    check_range(from, to)?;
    db.get_transactions(user_id, from, to).await
}

pub async fn get(db: &Database, user_id: i32, id: i32) -> Result<Transaction> {
    db.get_transaction(user_id, id).await
}

pub async fn create(db: &Database, user_id: i32, input: TransactionInput) -> Result<Transaction> {
    let input = normalize(input);
    input.validate()?;
    let transaction = db.create_transaction(user_id, &input).await?;
    info!(
        user_id,
        transaction_id = transaction.id,
        kind = %transaction.kind,
        amount = transaction.amount,
        "transaction recorded"
    );
    Ok(transaction)
}

pub async fn update(
    db: &Database,
    user_id: i32,
    id: i32,
    input: TransactionInput,
) -> Result<Transaction> {
    let input = normalize(input);
    input.validate()?;
    db.update_transaction(user_id, id, &input).await
}

pub async fn delete(db: &Database, user_id: i32, id: i32) -> Result<()> {
    db.delete_transaction(user_id, id).await
}

/// Income, expense and net over an optional inclusive date range.
pub async fn summary(
    db: &Database,
    user_id: i32,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<TransactionSummary> {
    check_range(from, to)?;
    db.get_transaction_summary(user_id, from, to).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_range_is_rejected() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        assert!(check_range(Some(d(10)), Some(d(1))).is_err());
        assert!(check_range(Some(d(1)), Some(d(1))).is_ok());
        assert!(check_range(None, Some(d(1))).is_ok());
    }
}
