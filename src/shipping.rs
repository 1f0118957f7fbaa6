//! Shipping
//!
//! The delivery options a customer can pick at checkout. The registry is fixed for the
//! lifetime of a store; checkout state only holds the selected id.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::pricing::Price;

/// Errors from the shipping registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShippingError {
    /// No method has this id.
    #[error("unknown shipping method: {0}")]
    UnknownMethod(String),

    /// Two methods share an id.
    #[error("duplicate shipping method: {0}")]
    DuplicateMethod(String),
}

/// A named, priced delivery option.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingMethod {
    /// Stable identifier referenced from checkout state.
    pub id: String,

    /// Display name.
    pub name: String,

    /// What the customer gets.
    pub description: String,

    /// Flat price.
    pub price: Price,

    /// Descriptive delivery window, e.g. "5-7 business days".
    pub estimated_days: String,
}

impl ShippingMethod {
    /// Create a shipping method.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        price: Price,
        estimated_days: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            price,
            estimated_days: estimated_days.into(),
        }
    }
}

/// Immutable, ordered catalog of shipping methods.
#[derive(Debug, Clone, Default)]
pub struct ShippingRegistry {
    methods: Vec<ShippingMethod>,
}

impl ShippingRegistry {
    /// Create a registry, keeping the given display order.
    ///
    /// # Errors
    ///
    /// Returns [`ShippingError::DuplicateMethod`] if two methods share an id.
    pub fn new(methods: impl IntoIterator<Item = ShippingMethod>) -> Result<Self, ShippingError> {
        let mut registry = Self::default();

        for method in methods {
            if registry.contains(&method.id) {
                return Err(ShippingError::DuplicateMethod(method.id));
            }

            registry.methods.push(method);
        }

        Ok(registry)
    }

    /// The delivery options the storefront ships with, priced in `currency`.
    #[must_use]
    pub fn storefront_defaults(currency: &'static Currency) -> Self {
        Self {
            methods: vec![
                ShippingMethod::new(
                    "standard",
                    "Standard Delivery",
                    "Kerbside delivery by our carrier partners",
                    Money::from_minor(0, currency),
                    "5-7 business days",
                ),
                ShippingMethod::new(
                    "express",
                    "Express Delivery",
                    "Priority dispatch and kerbside delivery",
                    Money::from_minor(15_000, currency),
                    "2-3 business days",
                ),
                ShippingMethod::new(
                    "white_glove",
                    "White Glove Delivery",
                    "Scheduled delivery with in-room placement, assembly and packaging removal",
                    Money::from_minor(50_000, currency),
                    "7-14 business days",
                ),
            ],
        }
    }

    /// Look up a method by id.
    pub fn get(&self, id: &str) -> Option<&ShippingMethod> {
        self.methods.iter().find(|method| method.id == id)
    }

    /// Look up a method by id, failing when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ShippingError::UnknownMethod`] for an unknown id.
    pub fn require(&self, id: &str) -> Result<&ShippingMethod, ShippingError> {
        self.get(id)
            .ok_or_else(|| ShippingError::UnknownMethod(id.to_string()))
    }

    /// Whether a method has this id.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// The first method in display order, used as the preselected option.
    pub fn first(&self) -> Option<&ShippingMethod> {
        self.methods.first()
    }

    /// Iterate in display order.
    pub fn iter(&self) -> impl Iterator<Item = &ShippingMethod> {
        self.methods.iter()
    }

    /// Number of methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
