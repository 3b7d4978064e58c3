//! Form validation.
//!
//! Input models derive [`validator::Validate`]. Field rules are declared on
//! the structs; the domain rules below are plugged in through
//! `custom(function = ...)` and `schema(function = ...)`. [`describe`]
//! flattens the collected failures into `field: message` pairs.

use std::borrow::Cow;

use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::totals::{Adjustment, AdjustmentKind};

/// Key `validator` files schema-level failures under.
const SCHEMA_KEY: &str = "__all__";

/// A failed rule. Schema-level rules use the offending field as `code` so it
/// shows up in the rendered message.
pub fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Percentages must lie in `0..=100`; fixed amounts must be non-negative.
pub fn adjustment_in_range(adjustment: &Adjustment) -> Result<(), ValidationError> {
    let value = adjustment.value;
    match adjustment.kind {
        AdjustmentKind::Percentage if !value.is_finite() || !(0.0..=100.0).contains(&value) => Err(
            rule("percentage", "percentage must be between 0 and 100"),
        ),
        AdjustmentKind::Fixed if !value.is_finite() || value < 0.0 => {
            Err(rule("fixed", "must be zero or greater"))
        }
        _ => Ok(()),
    }
}

/// Render validation failures as `field: message` pairs joined by `; `.
///
/// Nested list entries are reported as `items[0].quantity`. Pairs are
/// sorted so messages are stable.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut pairs = Vec::new();
    collect(errors, "", &mut pairs);
    pairs.sort();
    pairs.join("; ")
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let name = if *field == SCHEMA_KEY {
                        format!("{}{}", prefix, err.code)
                    } else {
                        format!("{}{}", prefix, field)
                    };
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("is invalid ({})", err.code));
                    out.push(format!("{}: {}", name, message));
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                collect(inner, &format!("{}{}.", prefix, field), out);
            }
            ValidationErrorsKind::List(entries) => {
                for (index, inner) in entries {
                    collect(inner, &format!("{}{}[{}].", prefix, field, index), out);
                }
            }
        }
    }
}

pub fn is_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Derive a URL slug from a title: lowercase ASCII alphanumerics joined by
/// single hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Trim an optional string, mapping blank values to `None`.
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
