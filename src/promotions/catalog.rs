//! Promo Catalog

use decimal_percentage::Percentage;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use tracing::debug;

use crate::{
    pricing::Price,
    promotions::{AppliedPromo, PromoCode, PromoError, normalize_code},
};

/// The set of codes a store accepts, keyed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct PromoCatalog {
    codes: FxHashMap<String, PromoCode>,
}

impl PromoCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The codes the storefront ships with, priced in `currency`.
    ///
    /// - `WELCOME10`: 10% off
    /// - `SAVE100`: 100 off orders of 500 or more
    /// - `STUDIO15`: 15% off orders of 2000 or more
    #[must_use]
    pub fn storefront_defaults(currency: &'static Currency) -> Self {
        [
            PromoCode::percentage("WELCOME10", Percentage::from(0.10))
                .with_description("10% off your first order"),
            PromoCode::fixed("SAVE100", Money::from_minor(10_000, currency))
                .with_minimum_order(Money::from_minor(50_000, currency))
                .with_description("100 off orders of 500 or more"),
            PromoCode::percentage("STUDIO15", Percentage::from(0.15))
                .with_minimum_order(Money::from_minor(200_000, currency))
                .with_description("15% off orders of 2000 or more"),
        ]
        .into_iter()
        .collect()
    }

    /// Add a code, returning the code it replaced.
    pub fn insert(&mut self, promo: PromoCode) -> Option<PromoCode> {
        self.codes.insert(normalize_code(promo.code()), promo)
    }

    /// Look up a code, ignoring case and surrounding whitespace.
    pub fn get(&self, code: &str) -> Option<&PromoCode> {
        self.codes.get(&normalize_code(code))
    }

    /// Resolve a code against the current subtotal.
    ///
    /// # Errors
    ///
    /// - [`PromoError::Empty`]: the code is blank.
    /// - [`PromoError::InvalidCode`]: no such code.
    /// - [`PromoError::MinimumOrderNotMet`]: the subtotal is below the code's minimum.
    /// - [`PromoError::Pricing`]: the discount could not be computed.
    pub fn resolve(&self, code: &str, subtotal: Price) -> Result<AppliedPromo, PromoError> {
        let key = normalize_code(code);

        if key.is_empty() {
            return Err(PromoError::Empty);
        }

        let promo = self
            .codes
            .get(&key)
            .ok_or_else(|| PromoError::InvalidCode(code.trim().to_string()))?;

        let discount = promo.discount_for(subtotal)?;

        debug!(code = %key, discount = %discount, "resolved promo code");

        Ok(AppliedPromo {
            promo: promo.clone(),
            discount,
        })
    }

    /// Iterate over the codes in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &PromoCode> {
        self.codes.values()
    }

    /// Number of codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the catalog has no codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl FromIterator<PromoCode> for PromoCatalog {
    fn from_iter<I: IntoIterator<Item = PromoCode>>(iter: I) -> Self {
        let mut catalog = Self::new();

        for promo in iter {
            catalog.insert(promo);
        }

        catalog
    }
}
