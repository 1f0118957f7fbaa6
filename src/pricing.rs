//! Pricing
//!
//! Order totals for a checkout: subtotal, promo discount, shipping, tax and total. Every
//! call recomputes from its inputs; nothing is cached between calls.
//!
//! Tax is charged on the discounted merchandise plus shipping:
//!
//! ```text
//! tax   = rate × (subtotal − discount + shipping)
//! total = subtotal − discount + shipping + tax
//! ```

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::cart::CartLine;

/// A monetary amount in one of the ISO currencies.
pub type Price = Money<'static, Currency>;

/// Default sales tax rate (11%).
pub const DEFAULT_TAX_RATE: f64 = 0.11;

/// Errors that can occur while computing totals.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// An amount is in a different currency from the order (amount currency, order currency).
    #[error("amount has currency {0}, but order has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Minor unit arithmetic overflowed.
    #[error("amount overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Store-wide rules applied to every totals computation.
#[derive(Debug, Clone, Copy)]
pub struct PricingRules {
    tax_rate: Percentage,
    free_shipping_threshold: Option<Price>,
}

impl PricingRules {
    /// Rules with the given tax rate and no free shipping threshold.
    #[must_use]
    pub fn new(tax_rate: Percentage) -> Self {
        Self {
            tax_rate,
            free_shipping_threshold: None,
        }
    }

    /// Waive shipping when the subtotal is strictly above `threshold`.
    #[must_use]
    pub fn with_free_shipping_threshold(mut self, threshold: Price) -> Self {
        self.free_shipping_threshold = Some(threshold);
        self
    }

    /// Sales tax rate.
    pub fn tax_rate(&self) -> Percentage {
        self.tax_rate
    }

    /// Subtotal above which shipping is free, if any.
    pub fn free_shipping_threshold(&self) -> Option<Price> {
        self.free_shipping_threshold
    }
}

impl Default for PricingRules {
    fn default() -> Self {
        Self::new(Percentage::from(DEFAULT_TAX_RATE))
    }
}

/// Computed breakdown of an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals {
    subtotal: Price,
    discount: Price,
    shipping_cost: Price,
    tax: Price,
    total: Price,
}

impl OrderTotals {
    /// Sum of all line totals.
    pub fn subtotal(&self) -> Price {
        self.subtotal
    }

    /// Promo discount, never more than the subtotal.
    pub fn discount(&self) -> Price {
        self.discount
    }

    /// Shipping charged, zero when waived.
    pub fn shipping_cost(&self) -> Price {
        self.shipping_cost
    }

    /// Sales tax.
    pub fn tax(&self) -> Price {
        self.tax
    }

    /// Amount due.
    pub fn total(&self) -> Price {
        self.total
    }

    /// Currency of every amount in the breakdown.
    pub fn currency(&self) -> &'static Currency {
        self.total.currency()
    }
}

/// Calculates the subtotal of a list of cart lines.
///
/// An empty list yields zero in `currency`.
///
/// # Errors
///
/// - [`PricingError::CurrencyMismatch`]: a line is priced in another currency.
/// - [`PricingError::Overflow`]: the sum does not fit in minor units.
pub fn subtotal(lines: &[CartLine], currency: &'static Currency) -> Result<Price, PricingError> {
    let minor = lines.iter().try_fold(0_i64, |acc, line| {
        let line_total = line.line_total()?;

        ensure_currency(&line_total, currency)?;

        acc.checked_add(line_total.to_minor_units())
            .ok_or(PricingError::Overflow)
    })?;

    Ok(Money::from_minor(minor, currency))
}

/// Calculates the totals for an order.
///
/// The discount is clamped to `[0, subtotal]` and shipping is waived when the rules carry
/// a free shipping threshold the subtotal exceeds.
///
/// # Errors
///
/// - [`PricingError::CurrencyMismatch`]: an input is in another currency.
/// - [`PricingError::PercentConversion`]: the tax could not be represented in minor units.
/// - [`PricingError::Overflow`]: an intermediate amount does not fit in minor units.
pub fn calculate_totals(
    lines: &[CartLine],
    currency: &'static Currency,
    discount: Price,
    shipping: Price,
    rules: &PricingRules,
) -> Result<OrderTotals, PricingError> {
    ensure_currency(&discount, currency)?;
    ensure_currency(&shipping, currency)?;

    let subtotal = subtotal(lines, currency)?;
    let subtotal_minor = subtotal.to_minor_units();

    let discount_minor = discount.to_minor_units().clamp(0, subtotal_minor);

    let shipping_minor = match rules.free_shipping_threshold {
        Some(threshold) if subtotal_minor > threshold.to_minor_units() => 0,
        _ => shipping.to_minor_units().max(0),
    };

    let taxable_minor = (subtotal_minor - discount_minor)
        .checked_add(shipping_minor)
        .ok_or(PricingError::Overflow)?;

    let tax_minor = percent_of_minor(&rules.tax_rate, taxable_minor)?;

    let total_minor = taxable_minor
        .checked_add(tax_minor)
        .ok_or(PricingError::Overflow)?;

    Ok(OrderTotals {
        subtotal,
        discount: Money::from_minor(discount_minor, currency),
        shipping_cost: Money::from_minor(shipping_minor, currency),
        tax: Money::from_minor(tax_minor, currency),
        total: Money::from_minor(total_minor, currency),
    })
}

/// Calculate a percentage of a minor unit amount, rounded half away from zero.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the calculation overflows or cannot be
/// represented in minor units.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PricingError> {
    let minor = Decimal::from_i64(minor).ok_or(PricingError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage does not expose the inner Decimal
        .checked_mul(minor)
        .ok_or(PricingError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::PercentConversion)
}

/// Return `CurrencyMismatch` unless `amount` is in `currency`.
///
/// # Errors
///
/// Returns [`PricingError::CurrencyMismatch`] when the currencies differ.
pub fn ensure_currency(amount: &Price, currency: &'static Currency) -> Result<(), PricingError> {
    let actual = amount.currency();

    if actual == currency {
        Ok(())
    } else {
        Err(PricingError::CurrencyMismatch(
            actual.iso_alpha_code,
            currency.iso_alpha_code,
        ))
    }
}
