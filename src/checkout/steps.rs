//! Checkout steps

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A step name that is not one of the four checkout steps.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown checkout step: {0}")]
pub struct UnknownStep(pub String);

/// Steps of the checkout, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    /// Email and phone.
    Contact,
    /// Delivery address and method.
    Shipping,
    /// Payment method and billing address.
    Payment,
    /// Order review and terms acceptance before submission.
    Review,
}

impl CheckoutStep {
    /// Every step, in order.
    pub const ALL: [CheckoutStep; 4] = [
        CheckoutStep::Contact,
        CheckoutStep::Shipping,
        CheckoutStep::Payment,
        CheckoutStep::Review,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Contact => "contact",
            CheckoutStep::Shipping => "shipping",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Review => "review",
        }
    }

    /// Heading shown to customers.
    pub fn display_name(&self) -> &'static str {
        match self {
            CheckoutStep::Contact => "Contact",
            CheckoutStep::Shipping => "Shipping",
            CheckoutStep::Payment => "Payment",
            CheckoutStep::Review => "Review",
        }
    }

    /// Step number (1-indexed).
    pub fn number(&self) -> u8 {
        match self {
            CheckoutStep::Contact => 1,
            CheckoutStep::Shipping => 2,
            CheckoutStep::Payment => 3,
            CheckoutStep::Review => 4,
        }
    }

    /// The step after this one.
    pub fn next(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Contact => Some(CheckoutStep::Shipping),
            CheckoutStep::Shipping => Some(CheckoutStep::Payment),
            CheckoutStep::Payment => Some(CheckoutStep::Review),
            CheckoutStep::Review => None,
        }
    }

    /// The step before this one.
    pub fn previous(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Contact => None,
            CheckoutStep::Shipping => Some(CheckoutStep::Contact),
            CheckoutStep::Payment => Some(CheckoutStep::Shipping),
            CheckoutStep::Review => Some(CheckoutStep::Payment),
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckoutStep {
    type Err = UnknownStep;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckoutStep::ALL
            .into_iter()
            .find(|step| step.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStep(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_ordered_canonically() {
        assert!(CheckoutStep::Contact < CheckoutStep::Shipping);
        assert!(CheckoutStep::Shipping < CheckoutStep::Payment);
        assert!(CheckoutStep::Payment < CheckoutStep::Review);
    }

    #[test]
    fn next_and_previous_walk_the_sequence() {
        assert_eq!(CheckoutStep::Contact.next(), Some(CheckoutStep::Shipping));
        assert_eq!(CheckoutStep::Review.next(), None);
        assert_eq!(CheckoutStep::Review.previous(), Some(CheckoutStep::Payment));
        assert_eq!(CheckoutStep::Contact.previous(), None);
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("payment".parse(), Ok(CheckoutStep::Payment));
        assert_eq!(" Review ".parse(), Ok(CheckoutStep::Review));
        assert_eq!(
            "cart".parse::<CheckoutStep>(),
            Err(UnknownStep("cart".to_string()))
        );
    }

    #[test]
    fn numbers_match_positions() {
        for (idx, step) in CheckoutStep::ALL.iter().enumerate() {
            assert_eq!(usize::from(step.number()), idx + 1);
        }
    }
}
