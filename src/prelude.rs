//! Furnish prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    auth::{AuthSnapshot, SavedAddress},
    cart::{Cart, CartLine},
    checkout::{
        CheckoutError, CheckoutFlow, CheckoutSession, CheckoutStep, StepError, SubmissionState,
        forms::{
            Address, BillingInfo, CardDetails, ContactInfo, PaymentInfo, PaymentMethod,
            ShippingInfo,
        },
    },
    config::{ConfigError, StoreConfig},
    orders::{
        HttpOrderGateway, OrderApiConfig, OrderConfirmation, OrderGateway, OrderPayload,
        SubmissionError,
    },
    pricing::{OrderTotals, Price, PricingError, PricingRules, calculate_totals},
    promotions::{AppliedPromo, DiscountKind, PromoCatalog, PromoCode, PromoError},
    shipping::{ShippingError, ShippingMethod, ShippingRegistry},
    summary::{OrderSummary, SummaryError},
    validation::{FieldErrors, ValidationError},
};
