//! Promotions
//!
//! Promo codes entered at checkout. A code is either a percentage off the subtotal or a
//! fixed amount off it, optionally gated on a minimum order.

use decimal_percentage::Percentage;
use rusty_money::Money;
use thiserror::Error;

use crate::pricing::{Price, PricingError, ensure_currency, percent_of_minor};

pub mod catalog;

pub use catalog::PromoCatalog;

/// Reasons a promo code cannot be applied.
#[derive(Debug, Error, PartialEq)]
pub enum PromoError {
    /// Nothing was entered.
    #[error("enter a promo code")]
    Empty,

    /// The code is not in the catalog.
    #[error("promo code {0} is not valid")]
    InvalidCode(String),

    /// The subtotal is below the code's minimum order.
    #[error("promo code requires a minimum order of {0}")]
    MinimumOrderNotMet(Price),

    /// Another code is already bound to the checkout.
    #[error("promo code {0} is already applied; remove it first")]
    AlreadyApplied(String),

    /// The discount could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// How a promo code discounts the subtotal.
#[derive(Debug, Clone, Copy)]
pub enum DiscountKind {
    /// A share of the subtotal (e.g., "10% off").
    Percentage(Percentage),

    /// A flat amount, never more than the subtotal (e.g., "$100 off").
    Fixed(Price),
}

impl DiscountKind {
    /// Wire name of the discount type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Percentage(_) => "percentage",
            DiscountKind::Fixed(_) => "fixed",
        }
    }
}

/// A discount rule looked up by code.
#[derive(Debug, Clone)]
pub struct PromoCode {
    code: String,
    kind: DiscountKind,
    minimum_order: Option<Price>,
    description: Option<String>,
}

impl PromoCode {
    /// Create a code with the given discount.
    pub fn new(code: impl Into<String>, kind: DiscountKind) -> Self {
        Self {
            code: code.into(),
            kind,
            minimum_order: None,
            description: None,
        }
    }

    /// Create a percentage discount code.
    pub fn percentage(code: impl Into<String>, percent: Percentage) -> Self {
        Self::new(code, DiscountKind::Percentage(percent))
    }

    /// Create a fixed amount discount code.
    pub fn fixed(code: impl Into<String>, amount: Price) -> Self {
        Self::new(code, DiscountKind::Fixed(amount))
    }

    /// Require the subtotal to reach `minimum` before the code applies.
    #[must_use]
    pub fn with_minimum_order(mut self, minimum: Price) -> Self {
        self.minimum_order = Some(minimum);
        self
    }

    /// Attach a customer-facing description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The code as configured.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The discount rule.
    pub fn kind(&self) -> DiscountKind {
        self.kind
    }

    /// Minimum subtotal, if any.
    pub fn minimum_order(&self) -> Option<Price> {
        self.minimum_order
    }

    /// Customer-facing description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether `input` names this code, ignoring case and surrounding whitespace.
    pub fn matches(&self, input: &str) -> bool {
        normalize_code(input) == normalize_code(&self.code)
    }

    /// Discount this code gives on `subtotal`.
    ///
    /// Percentage discounts are rounded to the minor unit; fixed discounts are capped at
    /// the subtotal.
    ///
    /// # Errors
    ///
    /// - [`PromoError::MinimumOrderNotMet`]: the subtotal is below the minimum order.
    /// - [`PromoError::Pricing`]: the amounts are in different currencies or overflow.
    pub fn discount_for(&self, subtotal: Price) -> Result<Price, PromoError> {
        let currency = subtotal.currency();
        let subtotal_minor = subtotal.to_minor_units();

        if let Some(minimum) = self.minimum_order {
            ensure_currency(&minimum, currency)?;

            if subtotal_minor < minimum.to_minor_units() {
                return Err(PromoError::MinimumOrderNotMet(minimum));
            }
        }

        let discount_minor = match &self.kind {
            DiscountKind::Percentage(percent) => percent_of_minor(percent, subtotal_minor)?,
            DiscountKind::Fixed(amount) => {
                ensure_currency(amount, currency)?;

                amount.to_minor_units()
            }
        };

        Ok(Money::from_minor(
            discount_minor.clamp(0, subtotal_minor.max(0)),
            currency,
        ))
    }
}

/// A code resolved against a subtotal.
#[derive(Debug, Clone)]
pub struct AppliedPromo {
    promo: PromoCode,
    discount: Price,
}

impl AppliedPromo {
    /// The resolved code.
    pub fn promo(&self) -> &PromoCode {
        &self.promo
    }

    /// Discount at the time of resolution.
    pub fn discount(&self) -> Price {
        self.discount
    }

    /// Take the code, dropping the discount.
    pub fn into_promo(self) -> PromoCode {
        self.promo
    }
}

/// Canonical lookup form of a code.
pub(crate) fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn usd(minor: i64) -> Price {
        Money::from_minor(minor, USD)
    }

    #[test]
    fn percentage_code_takes_share_of_subtotal() -> TestResult {
        let promo = PromoCode::percentage("WELCOME10", Percentage::from(0.10));

        assert_eq!(promo.discount_for(usd(890_000))?, usd(89_000));

        Ok(())
    }

    #[test]
    fn fixed_code_is_capped_at_subtotal() -> TestResult {
        let promo = PromoCode::fixed("SAVE100", usd(10_000));

        assert_eq!(promo.discount_for(usd(25_000))?, usd(10_000));
        assert_eq!(promo.discount_for(usd(4_000))?, usd(4_000));

        Ok(())
    }

    #[test]
    fn minimum_order_gate_is_inclusive() -> TestResult {
        let promo = PromoCode::fixed("SAVE100", usd(10_000)).with_minimum_order(usd(50_000));

        assert_eq!(
            promo.discount_for(usd(49_900)),
            Err(PromoError::MinimumOrderNotMet(usd(50_000)))
        );
        assert_eq!(promo.discount_for(usd(50_000))?, usd(10_000));

        Ok(())
    }

    #[test]
    fn fixed_code_in_another_currency_is_rejected() {
        let promo = PromoCode::fixed("SAVE10", Money::from_minor(1_000, GBP));

        assert_eq!(
            promo.discount_for(usd(5_000)),
            Err(PromoError::Pricing(PricingError::CurrencyMismatch(
                "GBP", "USD"
            )))
        );
    }

    #[test]
    fn matches_ignores_case_and_whitespace() {
        let promo = PromoCode::percentage("Welcome10", Percentage::from(0.10));

        assert!(promo.matches(" welcome10 "));
        assert!(promo.matches("WELCOME10"));
        assert!(!promo.matches("WELCOME1"));
    }

    #[test]
    fn accessors_return_configured_values() {
        let promo = PromoCode::fixed("SAVE100", usd(10_000))
            .with_minimum_order(usd(50_000))
            .with_description("$100 off orders over $500");

        assert_eq!(promo.code(), "SAVE100");
        assert_eq!(promo.kind().as_str(), "fixed");
        assert_eq!(promo.minimum_order(), Some(usd(50_000)));
        assert_eq!(promo.description(), Some("$100 off orders over $500"));
    }
}
