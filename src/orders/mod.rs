//! Orders
//!
//! The payload a completed checkout hands to the order API, and the gateway trait that
//! delivers it. Amounts on the wire are integer minor units alongside an ISO currency code.

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::form_urlencoded;
use uuid::Uuid;

use crate::{
    cart::CartLine,
    checkout::forms::{Address, ContactInfo, PaymentInfo, PaymentMethod},
    pricing::{OrderTotals, PricingError},
};

pub mod http;

pub use http::{HttpOrderGateway, OrderApiConfig};

/// Path of the order confirmation page.
pub const CONFIRMATION_PATH: &str = "/checkout/confirmation";

/// An order ready to be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    /// Checkout session id, also sent as the idempotency key.
    pub checkout_id: Uuid,

    /// Contact details.
    pub contact: ContactInfo,

    /// Delivery address.
    pub shipping_address: Address,

    /// Billing address, resolved from the "same as shipping" toggle.
    pub billing_address: Address,

    /// Payment method and non-sensitive card details.
    pub payment: PaymentSummary,

    /// Selected shipping method id.
    pub shipping_method_id: String,

    /// Promo code that produced the discount, if any.
    pub promo_code: Option<String>,

    /// Ordered items.
    pub items: Vec<OrderItem>,

    /// Order totals.
    pub totals: TotalsSummary,
}

/// What the order API learns about payment. The CVC and full card number stay behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    /// Payment method.
    pub method: PaymentMethod,

    /// Last four digits of the card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_last_four: Option<String>,

    /// Card expiry, `MM/YY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_expiry: Option<String>,

    /// Name on the card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardholder_name: Option<String>,
}

impl From<&PaymentInfo> for PaymentSummary {
    fn from(payment: &PaymentInfo) -> Self {
        match payment.method {
            PaymentMethod::Card => Self {
                method: payment.method,
                card_last_four: Some(payment.card.last_four()),
                card_expiry: Some(payment.card.expiry.trim().to_string()),
                cardholder_name: Some(payment.card.holder_name.trim().to_string()),
            },
            PaymentMethod::CashOnDelivery | PaymentMethod::BankTransfer => Self {
                method: payment.method,
                card_last_four: None,
                card_expiry: None,
                cardholder_name: None,
            },
        }
    }
}

/// An ordered cart line, priced in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product id.
    pub product_id: String,

    /// Product name at the time of ordering.
    pub name: String,

    /// Units ordered.
    pub quantity: u32,

    /// Unit price in minor units.
    pub unit_price: i64,

    /// Unit price × quantity in minor units.
    pub line_total: i64,
}

impl TryFrom<&CartLine> for OrderItem {
    type Error = PricingError;

    fn try_from(line: &CartLine) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: line.product_id().to_string(),
            name: line.name().to_string(),
            quantity: line.quantity(),
            unit_price: line.unit_price().to_minor_units(),
            line_total: line.line_total()?.to_minor_units(),
        })
    }
}

/// Order totals in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsSummary {
    /// ISO 4217 currency code.
    pub currency: String,

    /// Merchandise subtotal.
    pub subtotal: i64,

    /// Promo discount.
    pub discount: i64,

    /// Shipping cost.
    pub shipping_cost: i64,

    /// Tax.
    pub tax: i64,

    /// Amount charged.
    pub total: i64,
}

impl From<&OrderTotals> for TotalsSummary {
    fn from(totals: &OrderTotals) -> Self {
        Self {
            currency: totals.currency().iso_alpha_code.to_string(),
            subtotal: totals.subtotal().to_minor_units(),
            discount: totals.discount().to_minor_units(),
            shipping_cost: totals.shipping_cost().to_minor_units(),
            tax: totals.tax().to_minor_units(),
            total: totals.total().to_minor_units(),
        }
    }
}

/// The order API's acknowledgement of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    /// Order number to show the customer.
    pub order_number: String,
}

impl OrderConfirmation {
    /// Create a confirmation.
    pub fn new(order_number: impl Into<String>) -> Self {
        Self {
            order_number: order_number.into(),
        }
    }

    /// Where to send the customer after a successful order.
    pub fn confirmation_url(&self) -> String {
        let order: String = form_urlencoded::byte_serialize(self.order_number.as_bytes()).collect();

        format!("{CONFIRMATION_PATH}?order={order}")
    }
}

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The request could not be sent or the response could not be read.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The order API returned a non-2xx status.
    #[error("order API rejected the order with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,

        /// Response body.
        body: String,
    },

    /// The order API answered 2xx with a body we could not use.
    #[error("unexpected response from order API: {0}")]
    InvalidResponse(String),
}

/// Delivers an order to the order API.
#[automock]
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Place the order.
    async fn submit(&self, payload: &OrderPayload) -> Result<OrderConfirmation, SubmissionError>;
}
