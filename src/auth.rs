//! Auth
//!
//! The checkout never talks to the auth service. It receives an [`AuthSnapshot`] when a
//! session starts (and again whenever the login state changes) and uses it to prefill
//! contact and shipping details.

use serde::Deserialize;

/// An address saved to the customer's account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAddress {
    /// Address id from the account API.
    pub id: String,

    /// Customer label, e.g. "Home".
    #[serde(default)]
    pub label: String,

    /// Recipient first name.
    pub first_name: String,

    /// Recipient last name.
    pub last_name: String,

    /// Recipient phone number.
    #[serde(default)]
    pub phone: String,

    /// Street address.
    pub address_line1: String,

    /// Apartment, suite or floor.
    #[serde(default)]
    pub address_line2: String,

    /// City or town.
    pub city: String,

    /// State, province or region.
    pub region: String,

    /// Postal or ZIP code.
    #[serde(default)]
    pub postal_code: String,

    /// Country.
    pub country: String,

    /// Whether this is the account's default shipping address.
    #[serde(default)]
    pub is_default: bool,
}

/// What the checkout knows about the current login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    /// Whether a customer is logged in.
    pub is_authenticated: bool,

    /// Account email.
    pub email: Option<String>,

    /// Account phone number.
    pub phone: Option<String>,

    /// Account first name.
    pub first_name: Option<String>,

    /// Account last name.
    pub last_name: Option<String>,

    /// Addresses saved to the account.
    pub saved_addresses: Vec<SavedAddress>,
}

impl AuthSnapshot {
    /// A guest checkout: nothing to prefill.
    #[must_use]
    pub fn guest() -> Self {
        Self::default()
    }

    /// A logged-in customer with the given email.
    pub fn authenticated(email: impl Into<String>) -> Self {
        Self {
            is_authenticated: true,
            email: Some(email.into()),
            ..Self::default()
        }
    }

    /// Set the account phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Set the account holder's name.
    #[must_use]
    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    /// Add a saved address.
    #[must_use]
    pub fn with_saved_address(mut self, address: SavedAddress) -> Self {
        self.saved_addresses.push(address);
        self
    }

    /// Saved addresses, empty for guests.
    pub fn addresses(&self) -> &[SavedAddress] {
        if self.is_authenticated {
            &self.saved_addresses
        } else {
            &[]
        }
    }

    /// Find a saved address by id.
    pub fn address(&self, id: &str) -> Option<&SavedAddress> {
        self.addresses().iter().find(|address| address.id == id)
    }

    /// The default saved address, or the first one when none is marked default.
    pub fn default_address(&self) -> Option<&SavedAddress> {
        let addresses = self.addresses();

        addresses
            .iter()
            .find(|address| address.is_default)
            .or_else(|| addresses.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(id: &str, is_default: bool) -> SavedAddress {
        SavedAddress {
            id: id.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            address_line1: "12 Marylebone Rd".to_string(),
            city: "London".to_string(),
            region: "Greater London".to_string(),
            country: "United Kingdom".to_string(),
            is_default,
            ..SavedAddress::default()
        }
    }

    #[test]
    fn default_address_prefers_marked_default() {
        let auth = AuthSnapshot::authenticated("ada@example.com")
            .with_saved_address(address("work", false))
            .with_saved_address(address("home", true));

        assert_eq!(auth.default_address().map(|a| a.id.as_str()), Some("home"));
    }

    #[test]
    fn default_address_falls_back_to_first() {
        let auth = AuthSnapshot::authenticated("ada@example.com")
            .with_saved_address(address("work", false));

        assert_eq!(auth.default_address().map(|a| a.id.as_str()), Some("work"));
    }

    #[test]
    fn guests_have_no_addresses() {
        let mut auth = AuthSnapshot::guest().with_saved_address(address("home", true));
        auth.is_authenticated = false;

        assert!(auth.addresses().is_empty());
        assert!(auth.address("home").is_none());
        assert!(auth.default_address().is_none());
    }

    #[test]
    fn saved_address_deserializes_from_account_api() -> Result<(), serde_json::Error> {
        let json = r#"{
            "id": "addr_1",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "addressLine1": "12 Marylebone Rd",
            "city": "London",
            "region": "Greater London",
            "country": "United Kingdom",
            "isDefault": true
        }"#;

        let address: SavedAddress = serde_json::from_str(json)?;

        assert_eq!(address.first_name, "Ada");
        assert!(address.is_default);
        assert!(address.address_line2.is_empty());

        Ok(())
    }
}
