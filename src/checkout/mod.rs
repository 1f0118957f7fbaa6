//! Checkout
//!
//! A multi-step checkout: contact, shipping, payment and review. [`CheckoutSession`] owns
//! the form data, the applied promo code and the submission state for one customer and
//! recomputes totals from the cart, the selected shipping method and the store rules on
//! every call.

use thiserror::Error;

use crate::{
    orders::SubmissionError, pricing::PricingError, promotions::PromoError,
    shipping::ShippingError, validation::FieldErrors,
};

pub mod flow;
pub mod forms;
pub mod session;
pub mod steps;

pub use flow::CheckoutFlow;
pub use session::{CheckoutSession, SubmissionState};
pub use steps::{CheckoutStep, UnknownStep};

/// Errors from moving between steps.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepError {
    /// The target step is ahead of the current one and has not been completed.
    #[error("cannot move from {from} to {to}; complete the current step first")]
    NotReachable {
        /// Current step.
        from: CheckoutStep,

        /// Requested step.
        to: CheckoutStep,
    },

    /// Already on the first step.
    #[error("already on the first step")]
    AtFirstStep,

    /// The review step is completed by placing the order.
    #[error("the review step is completed by placing the order")]
    ReviewIsSubmissionGate,

    /// The step's fields did not validate.
    #[error("{step} step is invalid: {errors}")]
    Invalid {
        /// Step that failed.
        step: CheckoutStep,

        /// Per-field messages.
        errors: FieldErrors,
    },
}

/// Errors from a checkout session.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Step navigation failed.
    #[error(transparent)]
    Step(#[from] StepError),

    /// A promo code could not be applied.
    #[error(transparent)]
    Promo(#[from] PromoError),

    /// Totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// A shipping method could not be selected.
    #[error(transparent)]
    Shipping(#[from] ShippingError),

    /// The account has no saved address with this id.
    #[error("no saved address with id {0}")]
    UnknownSavedAddress(String),

    /// There is nothing to order.
    #[error("the cart is empty")]
    EmptyCart,

    /// A step no longer validates; its messages are in the session's field errors.
    #[error("complete the {0} step before placing the order")]
    Incomplete(CheckoutStep),

    /// Orders can only be placed from the review step.
    #[error("orders can only be placed from the review step, not {0}")]
    NotOnReview(CheckoutStep),

    /// The terms and conditions were not accepted.
    #[error("accept the terms and conditions to place the order")]
    TermsNotAccepted,

    /// A submission is already waiting for the order API.
    #[error("an order submission is already in progress")]
    SubmissionInProgress,

    /// No submission is waiting for a result.
    #[error("no order submission is in progress")]
    NoSubmissionPending,

    /// The order has already been placed.
    #[error("the order has already been placed")]
    AlreadySubmitted,

    /// The order API did not accept the order.
    #[error("order submission failed: {0}")]
    Submission(#[from] SubmissionError),
}
