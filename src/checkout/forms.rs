//! Checkout forms
//!
//! The data each step collects and the rules it must pass before the step can be
//! completed. Validation never fails hard: it returns a [`FieldErrors`] map that is empty
//! when the data is acceptable.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    auth::SavedAddress,
    shipping::ShippingRegistry,
    validation::{FieldErrors, is_valid_email},
};

/// Minimum digits in a card number once spaces are removed.
const CARD_NUMBER_MIN_DIGITS: usize = 16;

/// Minimum length of an `MM/YY` expiry.
const CARD_EXPIRY_MIN_LEN: usize = 5;

/// Minimum length of a card security code.
const CARD_CVC_MIN_LEN: usize = 3;

/// Contact step data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    /// Order confirmation email.
    pub email: String,

    /// Phone number for delivery coordination.
    pub phone: String,

    /// Whether the customer opted in to marketing email.
    pub marketing_opt_in: bool,
}

impl ContactInfo {
    /// Check the contact fields.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.email.trim().is_empty() {
            errors.insert("email", "Email is required");
        } else if !is_valid_email(self.email.trim()) {
            errors.insert("email", "Enter a valid email address");
        }

        errors.require("phone", &self.phone, "Phone");

        errors
    }
}

/// A postal address as entered in the shipping or billing form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Recipient first name.
    pub first_name: String,

    /// Recipient last name.
    pub last_name: String,

    /// Recipient phone number.
    pub phone: String,

    /// Street address.
    pub address_line1: String,

    /// Apartment, suite or floor.
    pub address_line2: String,

    /// City or town.
    pub city: String,

    /// State, province or region.
    pub region: String,

    /// Postal or ZIP code.
    pub postal_code: String,

    /// Country.
    pub country: String,
}

impl Address {
    /// Check the required address fields.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        errors.require("first_name", &self.first_name, "First name");
        errors.require("last_name", &self.last_name, "Last name");
        errors.require("address_line1", &self.address_line1, "Address");
        errors.require("city", &self.city, "City");
        errors.require("region", &self.region, "Region");
        errors.require("country", &self.country, "Country");

        errors
    }

    /// Whether nothing has been entered yet.
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

impl From<&SavedAddress> for Address {
    fn from(saved: &SavedAddress) -> Self {
        Self {
            first_name: saved.first_name.clone(),
            last_name: saved.last_name.clone(),
            phone: saved.phone.clone(),
            address_line1: saved.address_line1.clone(),
            address_line2: saved.address_line2.clone(),
            city: saved.city.clone(),
            region: saved.region.clone(),
            postal_code: saved.postal_code.clone(),
            country: saved.country.clone(),
        }
    }
}

/// Shipping step data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingInfo {
    /// Delivery address.
    pub address: Address,

    /// Selected shipping method id.
    pub method_id: Option<String>,

    /// Saved address the fields were filled from, if any.
    pub saved_address_id: Option<String>,
}

impl ShippingInfo {
    /// Fill the address from a saved address.
    ///
    /// The result is validated exactly like a manually entered address.
    pub fn use_saved_address(&mut self, saved: &SavedAddress) {
        self.address = Address::from(saved);
        self.saved_address_id = Some(saved.id.clone());
    }

    /// Check the address and that the method exists in `registry`.
    pub fn validate(&self, registry: &ShippingRegistry) -> FieldErrors {
        let mut errors = self.address.validate();

        match self.method_id.as_deref() {
            None => errors.insert("shipping_method", "Choose a shipping method"),
            Some(id) if !registry.contains(id) => {
                errors.insert("shipping_method", "Choose an available shipping method");
            }
            Some(_) => {}
        }

        errors
    }
}

/// Billing address data, collected on the payment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingInfo {
    /// Bill to the shipping address.
    pub same_as_shipping: bool,

    /// Billing address, used only when `same_as_shipping` is false.
    pub address: Address,
}

impl Default for BillingInfo {
    fn default() -> Self {
        Self {
            same_as_shipping: true,
            address: Address::default(),
        }
    }
}

impl BillingInfo {
    /// Check the billing address when it differs from shipping; field names are prefixed
    /// with `billing.`.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if !self.same_as_shipping {
            errors.merge_prefixed("billing", self.address.validate());
        }

        errors
    }

    /// The address to bill.
    pub fn effective<'a>(&'a self, shipping: &'a Address) -> &'a Address {
        if self.same_as_shipping {
            shipping
        } else {
            &self.address
        }
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit or debit card.
    #[default]
    Card,

    /// Pay the driver on delivery.
    CashOnDelivery,

    /// Pay by bank transfer after ordering.
    BankTransfer,
}

impl PaymentMethod {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }
}

/// Card fields. Never serialised; only [`CardDetails::last_four`] leaves the session.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CardDetails {
    /// Card number as typed; separators are ignored.
    pub number: String,

    /// Expiry as `MM/YY`.
    pub expiry: String,

    /// Security code.
    pub cvc: String,

    /// Name on the card.
    pub holder_name: String,
}

impl CardDetails {
    /// The digits of the card number, ignoring spaces, dashes and other separators.
    pub fn digits(&self) -> String {
        self.number.chars().filter(char::is_ascii_digit).collect()
    }

    /// The last four digits of the card number.
    pub fn last_four(&self) -> String {
        let digits: Vec<char> = self.digits().chars().collect();
        let start = digits.len().saturating_sub(4);

        digits.iter().skip(start).collect()
    }

    /// Check the card fields.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        let digits = self.digits();

        if digits.len() < CARD_NUMBER_MIN_DIGITS {
            errors.insert(
                "card_number",
                format!("Card number must have at least {CARD_NUMBER_MIN_DIGITS} digits"),
            );
        }

        if self.expiry.trim().chars().count() < CARD_EXPIRY_MIN_LEN {
            errors.insert("expiry", "Enter the expiry date as MM/YY");
        }

        if self.cvc.trim().chars().count() < CARD_CVC_MIN_LEN {
            errors.insert(
                "cvc",
                format!("Security code must have at least {CARD_CVC_MIN_LEN} digits"),
            );
        }

        errors.require("cardholder_name", &self.holder_name, "Cardholder name");

        errors
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("last_four", &self.last_four())
            .field("expiry", &self.expiry)
            .field("holder_name", &self.holder_name)
            .finish_non_exhaustive()
    }
}

/// Payment step data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentInfo {
    /// Chosen payment method.
    pub method: PaymentMethod,

    /// Card fields, checked only when paying by card.
    pub card: CardDetails,
}

impl PaymentInfo {
    /// Check the payment fields. Cash on delivery and bank transfer need nothing.
    pub fn validate(&self) -> FieldErrors {
        match self.method {
            PaymentMethod::Card => self.card.validate(),
            PaymentMethod::CashOnDelivery | PaymentMethod::BankTransfer => FieldErrors::new(),
        }
    }
}
