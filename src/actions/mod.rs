//! Server actions: the operations behind every form and button.
//!
//! Each action takes the tenant id first and never touches another
//! tenant's rows. Input is trimmed and validated before any query runs.

pub mod appointments;
pub mod blogs;
pub mod customers;
pub mod dashboard;
pub mod invoices;
pub mod milestones;
pub mod products;
pub mod quotes;
pub mod services;
pub mod submissions;
pub mod suppliers;
pub mod transactions;
pub mod users;

use chrono::{NaiveDate, Utc};

use crate::db::Database;
use crate::error::{Error, Result};

const NUMBER_WIDTH: usize = 4;

/// Next sequential document number after the ones already issued.
///
/// Only numbers of the form `{prefix}{digits}` count; anything else the
/// tenant typed by hand is ignored.
pub fn next_number<'a, I>(prefix: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let last = existing
        .into_iter()
        .filter_map(|number| number.strip_prefix(prefix))
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|digits| digits.parse::<u64>().ok())
        .max()
        .unwrap_or(0);

    format!("{}{:0width$}", prefix, last + 1, width = NUMBER_WIDTH)
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Resolve a referenced record of the tenant, reporting a missing one as a
/// bad field instead of a 404 on the request itself.
pub(crate) fn missing_reference(field: &str, err: Error) -> Error {
    match err {
        Error::NotFound(resource) => {
            Error::Validation(format!("{}: {} does not exist", field, resource.to_lowercase()))
        }
        other => other,
    }
}

pub(crate) async fn ensure_customer(db: &Database, user_id: i32, customer_id: i32) -> Result<()> {
    db.get_customer(user_id, customer_id)
        .await
        .map(|_| ())
        .map_err(|e| missing_reference("customer_id", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[], "INV-0001")]
    #[case(&["INV-0001", "INV-0002"], "INV-0003")]
    #[case(&["INV-0009", "INV-0002"], "INV-0010")]
    #[case(&["INV-0003", "INV-custom", "INV-", "QT-0040"], "INV-0004")]
    #[case(&["INV-9999"], "INV-10000")]
    fn numbers_continue_the_sequence(#[case] existing: &[&str], #[case] expected: &str) {
        assert_eq!(next_number("INV-", existing.iter().copied()), expected);
    }

    #[test]
    fn missing_reference_becomes_field_error() {
        let err = missing_reference("customer_id", Error::NotFound("Customer".into()));
        assert_eq!(err.to_string(), "Validation error: customer_id: customer does not exist");

        let err = missing_reference("customer_id", Error::Internal("boom".into()));
        assert!(matches!(err, Error::Internal(_)));
    }
}
