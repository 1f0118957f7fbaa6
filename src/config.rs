//! Store Config
//!
//! Store-wide settings read from YAML: currency, tax rate, free shipping threshold, the
//! promo catalog and the shipping registry. Prices are written as `"AMOUNT CURRENCY"`
//! strings and percentages as `"15%"` or `"0.15"`.
//!
//! ```yaml
//! currency: USD
//! tax_rate: 11%
//! promotions:
//!   SAVE100:
//!     type: fixed
//!     value: 100.00 USD
//!     minimum_order: 500.00 USD
//! shipping_methods:
//!   - id: standard
//!     name: Standard Delivery
//!     price: 0.00 USD
//!     estimated_days: 5-7 business days
//! ```
//!
//! Omitting `promotions` or `shipping_methods` keeps the storefront defaults; an empty
//! map or list means the store offers none.

use std::{fs, path::Path};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    pricing::{DEFAULT_TAX_RATE, Price, PricingRules},
    promotions::{PromoCatalog, PromoCode},
    shipping::{ShippingError, ShippingMethod, ShippingRegistry},
};

/// Store config errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("Failed to read store config: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid or out of range percentage
    #[error("Invalid percentage: {0}")]
    InvalidPercentage(String),

    /// Unsupported currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A price is not in the store currency
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Two promo codes differ only in case
    #[error("Duplicate promo code: {0}")]
    DuplicatePromoCode(String),

    /// Invalid shipping methods
    #[error(transparent)]
    Shipping(#[from] ShippingError),
}

/// Store config as written in YAML.
#[derive(Debug, Deserialize)]
pub struct StoreFile {
    /// ISO 4217 code of the store currency.
    pub currency: String,

    /// Sales tax rate; defaults to 11%.
    #[serde(default)]
    pub tax_rate: Option<String>,

    /// Subtotal above which shipping is free.
    #[serde(default)]
    pub free_shipping_threshold: Option<String>,

    /// Promo codes keyed by code.
    #[serde(default)]
    pub promotions: Option<FxHashMap<String, PromoFile>>,

    /// Shipping methods in display order.
    #[serde(default)]
    pub shipping_methods: Option<Vec<ShippingMethodFile>>,
}

/// A promo code as written in YAML.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromoFile {
    /// Percentage off the subtotal.
    Percentage {
        /// Percentage, e.g. `"10%"`.
        value: String,

        /// Minimum subtotal, e.g. `"500.00 USD"`.
        #[serde(default)]
        minimum_order: Option<String>,

        /// Customer-facing description.
        #[serde(default)]
        description: Option<String>,
    },

    /// Fixed amount off the subtotal.
    Fixed {
        /// Amount, e.g. `"100.00 USD"`.
        value: String,

        /// Minimum subtotal, e.g. `"500.00 USD"`.
        #[serde(default)]
        minimum_order: Option<String>,

        /// Customer-facing description.
        #[serde(default)]
        description: Option<String>,
    },
}

/// A shipping method as written in YAML.
#[derive(Debug, Deserialize)]
pub struct ShippingMethodFile {
    /// Method id.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Description.
    #[serde(default)]
    pub description: String,

    /// Price, e.g. `"150.00 USD"`.
    pub price: String,

    /// Delivery window.
    pub estimated_days: String,
}

/// Settings shared by every checkout session of a store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    currency: &'static Currency,
    rules: PricingRules,
    promotions: PromoCatalog,
    shipping: ShippingRegistry,
}

impl StoreConfig {
    /// Create a store config from its parts.
    #[must_use]
    pub fn new(
        currency: &'static Currency,
        rules: PricingRules,
        promotions: PromoCatalog,
        shipping: ShippingRegistry,
    ) -> Self {
        Self {
            currency,
            rules,
            promotions,
            shipping,
        }
    }

    /// Default rules, promo codes and shipping methods priced in `currency`.
    #[must_use]
    pub fn storefront_defaults(currency: &'static Currency) -> Self {
        Self::new(
            currency,
            PricingRules::default(),
            PromoCatalog::storefront_defaults(currency),
            ShippingRegistry::storefront_defaults(currency),
        )
    }

    /// Load a store config from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not describe a valid store.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        debug!(path = %path.display(), "loading store config");

        Self::from_yaml(&contents)
    }

    /// Parse a store config from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or does not describe a valid store.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let file: StoreFile = serde_norway::from_str(contents)?;

        file.try_into()
    }

    /// Store currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Tax and free shipping rules.
    pub fn rules(&self) -> &PricingRules {
        &self.rules
    }

    /// Accepted promo codes.
    pub fn promotions(&self) -> &PromoCatalog {
        &self.promotions
    }

    /// Available shipping methods.
    pub fn shipping(&self) -> &ShippingRegistry {
        &self.shipping
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::storefront_defaults(iso::USD)
    }
}

impl TryFrom<StoreFile> for StoreConfig {
    type Error = ConfigError;

    fn try_from(file: StoreFile) -> Result<Self, Self::Error> {
        let currency = parse_currency(&file.currency)?;

        let tax_rate = match file.tax_rate.as_deref() {
            Some(rate) => parse_percentage(rate)?,
            None => Percentage::from(DEFAULT_TAX_RATE),
        };

        let mut rules = PricingRules::new(tax_rate);

        if let Some(threshold) = file.free_shipping_threshold.as_deref() {
            rules = rules.with_free_shipping_threshold(parse_store_price(threshold, currency)?);
        }

        let promotions = match file.promotions {
            Some(promotions) => {
                let mut catalog = PromoCatalog::new();

                for (code, promo) in promotions {
                    let promo = promo_from_file(code, promo, currency)?;

                    if let Some(replaced) = catalog.insert(promo) {
                        return Err(ConfigError::DuplicatePromoCode(replaced.code().to_string()));
                    }
                }

                catalog
            }
            None => PromoCatalog::storefront_defaults(currency),
        };

        let shipping = match file.shipping_methods {
            Some(methods) => ShippingRegistry::new(
                methods
                    .into_iter()
                    .map(|method| {
                        Ok(ShippingMethod::new(
                            method.id,
                            method.name,
                            method.description,
                            parse_store_price(&method.price, currency)?,
                            method.estimated_days,
                        ))
                    })
                    .collect::<Result<Vec<_>, ConfigError>>()?,
            )?,
            None => ShippingRegistry::storefront_defaults(currency),
        };

        Ok(Self::new(currency, rules, promotions, shipping))
    }
}

fn promo_from_file(
    code: String,
    promo: PromoFile,
    currency: &'static Currency,
) -> Result<PromoCode, ConfigError> {
    let (mut promo_code, minimum_order, description) = match promo {
        PromoFile::Percentage {
            value,
            minimum_order,
            description,
        } => (
            PromoCode::percentage(code, parse_percentage(&value)?),
            minimum_order,
            description,
        ),
        PromoFile::Fixed {
            value,
            minimum_order,
            description,
        } => (
            PromoCode::fixed(code, parse_store_price(&value, currency)?),
            minimum_order,
            description,
        ),
    };

    if let Some(minimum) = minimum_order.as_deref() {
        promo_code = promo_code.with_minimum_order(parse_store_price(minimum, currency)?);
    }

    if let Some(description) = description {
        promo_code = promo_code.with_description(description);
    }

    Ok(promo_code)
}

/// Parse a currency code (GBP, USD or EUR).
///
/// # Errors
///
/// Returns [`ConfigError::UnknownCurrency`] for any other code.
pub fn parse_currency(code: &str) -> Result<&'static Currency, ConfigError> {
    match code.trim() {
        "GBP" => Ok(iso::GBP),
        "USD" => Ok(iso::USD),
        "EUR" => Ok(iso::EUR),
        other => Err(ConfigError::UnknownCurrency(other.to_string())),
    }
}

/// Parse a price string (e.g. `"2.99 GBP"`).
///
/// # Errors
///
/// Returns an error if the string is not `AMOUNT CURRENCY`, the amount is not a decimal
/// number, or the currency is unsupported.
pub fn parse_price(s: &str) -> Result<Price, ConfigError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(currency_code), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ConfigError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = parse_currency(currency_code)?;

    let minor_units = amount
        .parse::<Decimal>()
        .map_err(|_err| ConfigError::InvalidPrice(s.to_string()))?
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| ConfigError::InvalidPrice(s.to_string()))?;

    if minor_units < 0 {
        return Err(ConfigError::InvalidPrice(s.to_string()));
    }

    Ok(Money::from_minor(minor_units, currency))
}

/// Parse a price that must be in the store currency.
fn parse_store_price(s: &str, currency: &'static Currency) -> Result<Price, ConfigError> {
    let price = parse_price(s)?;

    if price.currency() != currency {
        return Err(ConfigError::CurrencyMismatch(
            currency.iso_alpha_code.to_string(),
            price.currency().iso_alpha_code.to_string(),
        ));
    }

    Ok(price)
}

/// Parse a percentage string (e.g. `"15%"` or `"0.15"`) between 0% and 100%.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPercentage`] if the string is not a number or is out of
/// range.
pub fn parse_percentage(s: &str) -> Result<Percentage, ConfigError> {
    let trimmed = s.trim();

    let value = match trimmed.strip_suffix('%') {
        Some(percent_str) => {
            percent_str
                .trim()
                .parse::<f64>()
                .map_err(|_err| ConfigError::InvalidPercentage(s.to_string()))?
                / 100.0
        }
        None => trimmed
            .parse::<f64>()
            .map_err(|_err| ConfigError::InvalidPercentage(s.to_string()))?,
    };

    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidPercentage(s.to_string()));
    }

    Ok(Percentage::from(value))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rusty_money::iso::{GBP, USD};
    use tempfile::NamedTempFile;
    use testresult::TestResult;

    use super::*;

    const STORE_YAML: &str = r"
currency: GBP
tax_rate: 20%
free_shipping_threshold: 1000.00 GBP
promotions:
  spring10:
    type: percentage
    value: 10%
    description: Spring sale
  TAKE50:
    type: fixed
    value: 50.00 GBP
    minimum_order: 250.00 GBP
shipping_methods:
  - id: courier
    name: Courier
    price: 25.00 GBP
    estimated_days: 1-2 business days
  - id: collect
    name: Click & Collect
    description: Collect from the showroom
    price: 0.00 GBP
    estimated_days: Next day
";

    #[test]
    fn parse_price_rejects_invalid_format() {
        assert!(matches!(
            parse_price("2.99GBP"),
            Err(ConfigError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("2.99 GBP extra"),
            Err(ConfigError::InvalidPrice(_))
        ));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(ConfigError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_reads_minor_units() -> TestResult {
        assert_eq!(parse_price("8900.00 USD")?, Money::from_minor(890_000, USD));
        assert_eq!(parse_price("2.5 GBP")?, Money::from_minor(250, GBP));

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_both_forms() -> TestResult {
        assert_eq!(parse_percentage("15%")?, Percentage::from(0.15));
        assert_eq!(parse_percentage("0.15")?, Percentage::from(0.15));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_out_of_range() {
        assert!(matches!(
            parse_percentage("150%"),
            Err(ConfigError::InvalidPercentage(_))
        ));
        assert!(matches!(
            parse_percentage("-0.1"),
            Err(ConfigError::InvalidPercentage(_))
        ));
        assert!(matches!(
            parse_percentage("lots"),
            Err(ConfigError::InvalidPercentage(_))
        ));
    }

    #[test]
    fn from_yaml_builds_the_store() -> TestResult {
        let store = StoreConfig::from_yaml(STORE_YAML)?;

        assert_eq!(store.currency(), GBP);
        assert_eq!(store.rules().tax_rate(), Percentage::from(0.20));
        assert_eq!(
            store.rules().free_shipping_threshold(),
            Some(Money::from_minor(100_000, GBP))
        );

        assert_eq!(store.promotions().len(), 2);
        assert!(store.promotions().get("SPRING10").is_some());
        assert_eq!(
            store.promotions().get("take50").and_then(PromoCode::minimum_order),
            Some(Money::from_minor(25_000, GBP))
        );

        let ids: Vec<&str> = store.shipping().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["courier", "collect"]);

        Ok(())
    }

    #[test]
    fn omitted_sections_use_storefront_defaults() -> TestResult {
        let store = StoreConfig::from_yaml("currency: USD\n")?;

        assert_eq!(store.rules().tax_rate(), Percentage::from(DEFAULT_TAX_RATE));
        assert!(store.promotions().get("WELCOME10").is_some());
        assert!(store.shipping().contains("white_glove"));

        Ok(())
    }

    #[test]
    fn from_yaml_rejects_prices_in_other_currencies() {
        let yaml = "currency: USD\nshipping_methods:\n  - id: a\n    name: A\n    price: 1.00 GBP\n    estimated_days: soon\n";

        assert!(matches!(
            StoreConfig::from_yaml(yaml),
            Err(ConfigError::CurrencyMismatch(expected, found)) if expected == "USD" && found == "GBP"
        ));
    }

    #[test]
    fn from_yaml_rejects_duplicate_shipping_ids() {
        let yaml = "currency: USD\nshipping_methods:\n  - id: a\n    name: A\n    price: 1.00 USD\n    estimated_days: soon\n  - id: a\n    name: B\n    price: 2.00 USD\n    estimated_days: later\n";

        assert!(matches!(
            StoreConfig::from_yaml(yaml),
            Err(ConfigError::Shipping(ShippingError::DuplicateMethod(id))) if id == "a"
        ));
    }

    #[test]
    fn from_yaml_rejects_codes_differing_only_in_case() {
        let yaml = "currency: USD\npromotions:\n  save:\n    type: percentage\n    value: 5%\n  SAVE:\n    type: percentage\n    value: 10%\n";

        assert!(matches!(
            StoreConfig::from_yaml(yaml),
            Err(ConfigError::DuplicatePromoCode(_))
        ));
    }

    #[test]
    fn from_path_reads_a_file() -> TestResult {
        let mut file = NamedTempFile::new()?;
        file.write_all(STORE_YAML.as_bytes())?;

        let store = StoreConfig::from_path(file.path())?;

        assert_eq!(store.shipping().len(), 2);

        Ok(())
    }

    #[test]
    fn from_path_missing_file_is_io_error() {
        assert!(matches!(
            StoreConfig::from_path("/nonexistent/store.yml"),
            Err(ConfigError::Io(_))
        ));
    }
}
