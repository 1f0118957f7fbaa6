//! Furnish
//!
//! Furnish is the checkout core of a furniture storefront: cart pricing and tax, promo
//! codes, shipping methods, a four-step checkout state machine and order submission.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod promotions;
pub mod shipping;
pub mod summary;
pub mod utils;
pub mod validation;
