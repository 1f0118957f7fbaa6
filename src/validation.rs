//! Validation
//!
//! Boundary checks for cart input and the per-field error map that checkout steps fill
//! when their data does not pass.

use std::{
    collections::{BTreeMap, btree_map},
    fmt,
    sync::LazyLock,
};

use regex::Regex;
use thiserror::Error;

/// Address shape accepted by the contact step.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL: LazyLock<Regex> = LazyLock::new(email_regex);

#[expect(
    clippy::expect_used,
    reason = "the email pattern is a constant and always compiles"
)]
fn email_regex() -> Regex {
    Regex::new(EMAIL_PATTERN).expect("email pattern compiles")
}

/// Errors raised when cart input is rejected at the boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Unit prices may not be negative (minor units given).
    #[error("unit price must not be negative, got {0} minor units")]
    NegativePrice(i64),

    /// Quantities start at one.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// A line's currency differs from the cart currency (line currency, cart currency).
    #[error("line has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// No line exists for the product.
    #[error("no cart line for product {0}")]
    LineNotFound(String),

    /// Merging two lines would overflow the quantity.
    #[error("quantity for product {0} is too large")]
    QuantityOverflow(String),
}

/// Per-field validation messages for a single checkout step.
///
/// Keys are field names (`email`, `address_line1`, `billing.city`, ...) and values are the
/// message to show next to that field. An empty map means the step is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    /// Create an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field, replacing any earlier message for it.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(field.into(), message.into());
    }

    /// Record `"<label> is required"` when `value` is blank.
    pub fn require(&mut self, field: &str, value: &str, label: &str) {
        if value.trim().is_empty() {
            self.insert(field, format!("{label} is required"));
        }
    }

    /// Message recorded for a field, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Whether a message exists for the field.
    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Whether no field failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    /// Merge another map, prefixing its field names with `prefix.`.
    pub fn merge_prefixed(&mut self, prefix: &str, other: FieldErrors) {
        for (field, message) in other.errors {
            self.errors.insert(format!("{prefix}.{field}"), message);
        }
    }

    /// Merge another map as-is.
    pub fn merge(&mut self, other: FieldErrors) {
        self.errors.extend(other.errors);
    }

    /// `Ok(())` when empty, otherwise the map itself as the error.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (field, message)) in self.errors.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }

            write!(f, "{field}: {message}")?;
        }

        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Whether `email` looks like `local@domain.tld` with no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_accepts_plain_addresses() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("first.last+tag@shop.example.co.uk"));
    }

    #[test]
    fn email_rejects_missing_parts_and_whitespace() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada.example.com"));
        assert!(!is_valid_email("ada @example.com"));
        assert!(!is_valid_email("ada@@example.com"));
    }

    #[test]
    fn require_only_records_blank_values() {
        let mut errors = FieldErrors::new();

        errors.require("city", "  ", "City");
        errors.require("country", "Norway", "Country");

        assert_eq!(errors.get("city"), Some("City is required"));
        assert!(!errors.contains("country"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn merge_prefixed_namespaces_fields() {
        let mut billing = FieldErrors::new();
        billing.insert("city", "City is required");

        let mut errors = FieldErrors::new();
        errors.merge_prefixed("billing", billing);

        assert_eq!(errors.get("billing.city"), Some("City is required"));
    }

    #[test]
    fn into_result_is_ok_only_when_empty() {
        assert!(FieldErrors::new().into_result().is_ok());

        let mut errors = FieldErrors::new();
        errors.insert("phone", "Phone is required");

        assert!(matches!(errors.into_result(), Err(e) if e.contains("phone")));
    }

    #[test]
    fn display_lists_fields_in_order() {
        let mut errors = FieldErrors::new();
        errors.insert("phone", "Phone is required");
        errors.insert("email", "Enter a valid email");

        assert_eq!(
            errors.to_string(),
            "email: Enter a valid email, phone: Phone is required"
        );
    }
}
