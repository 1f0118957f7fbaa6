//! Checkout session

use rusty_money::Money;
use tracing::{Span, debug, info, warn};
use uuid::Uuid;

use crate::{
    auth::AuthSnapshot,
    cart::Cart,
    checkout::{
        CheckoutError, StepError,
        flow::CheckoutFlow,
        forms::{BillingInfo, ContactInfo, PaymentInfo, ShippingInfo},
        steps::CheckoutStep,
    },
    config::StoreConfig,
    orders::{
        OrderConfirmation, OrderGateway, OrderItem, OrderPayload, PaymentSummary,
        SubmissionError, TotalsSummary,
    },
    pricing::{OrderTotals, Price, PricingError, calculate_totals},
    promotions::{PromoCode, PromoError},
    shipping::ShippingMethod,
    validation::FieldErrors,
};

/// Where the order submission stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    /// Nothing submitted yet.
    #[default]
    Idle,

    /// Waiting for the order API.
    InFlight,

    /// The last attempt failed; the message is shown on the review step.
    Failed(String),

    /// The order was placed.
    Submitted(OrderConfirmation),
}

/// One customer's checkout.
#[derive(Debug)]
pub struct CheckoutSession<'s> {
    id: Uuid,
    store: &'s StoreConfig,
    cart: Cart,
    auth: AuthSnapshot,
    flow: CheckoutFlow,
    contact: ContactInfo,
    shipping: ShippingInfo,
    billing: BillingInfo,
    payment: PaymentInfo,
    terms_accepted: bool,
    promo: Option<PromoCode>,
    field_errors: FieldErrors,
    submission: SubmissionState,
}

impl<'s> CheckoutSession<'s> {
    /// Start a checkout for `cart`.
    ///
    /// The first shipping method is preselected. When `auth` is a logged-in customer, the
    /// contact fields are prefilled from the account and the shipping address from the
    /// default saved address.
    pub fn new(store: &'s StoreConfig, cart: Cart, auth: AuthSnapshot) -> Self {
        let shipping = ShippingInfo {
            method_id: store.shipping().first().map(|method| method.id.clone()),
            ..ShippingInfo::default()
        };

        let mut session = Self {
            id: Uuid::now_v7(),
            store,
            cart,
            auth,
            flow: CheckoutFlow::new(),
            contact: ContactInfo::default(),
            shipping,
            billing: BillingInfo::default(),
            payment: PaymentInfo::default(),
            terms_accepted: false,
            promo: None,
            field_errors: FieldErrors::new(),
            submission: SubmissionState::Idle,
        };

        session.prefill_from_auth();

        info!(
            checkout_id = %session.id,
            authenticated = session.auth.is_authenticated,
            lines = session.cart.len(),
            "started checkout session"
        );

        session
    }

    /// Checkout id, also used as the order idempotency key.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Store settings.
    pub fn store(&self) -> &'s StoreConfig {
        self.store
    }

    /// The cart being checked out.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Mutable access to the cart. Totals follow on the next read.
    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// Current login state.
    pub fn auth(&self) -> &AuthSnapshot {
        &self.auth
    }

    /// Replace the login state.
    ///
    /// Signing out keeps everything entered so far and continues as a guest; only the
    /// link to a saved address is dropped. Signing in fills blank fields from the account.
    pub fn set_auth(&mut self, auth: AuthSnapshot) {
        self.auth = auth;

        if self.auth.is_authenticated {
            self.prefill_from_auth();
        } else {
            if self.shipping.saved_address_id.take().is_some() {
                debug!(checkout_id = %self.id, "cleared saved address selection");
            }

            info!(checkout_id = %self.id, "continuing checkout as guest");
        }
    }

    fn prefill_from_auth(&mut self) {
        if !self.auth.is_authenticated {
            return;
        }

        fill_if_blank(&mut self.contact.email, self.auth.email.as_deref());
        fill_if_blank(&mut self.contact.phone, self.auth.phone.as_deref());

        if !self.shipping.address.is_blank() {
            return;
        }

        if let Some(saved) = self.auth.default_address() {
            self.shipping.use_saved_address(saved);
        } else {
            let address = &mut self.shipping.address;

            fill_if_blank(&mut address.first_name, self.auth.first_name.as_deref());
            fill_if_blank(&mut address.last_name, self.auth.last_name.as_deref());
            fill_if_blank(&mut address.phone, self.auth.phone.as_deref());
        }
    }

    /// The step being shown.
    pub fn current_step(&self) -> CheckoutStep {
        self.flow.current_step()
    }

    /// Step navigation state.
    pub fn flow(&self) -> &CheckoutFlow {
        &self.flow
    }

    /// Contact step data.
    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    /// Edit the contact step.
    pub fn contact_mut(&mut self) -> &mut ContactInfo {
        &mut self.contact
    }

    /// Shipping step data.
    pub fn shipping(&self) -> &ShippingInfo {
        &self.shipping
    }

    /// Edit the shipping step.
    pub fn shipping_mut(&mut self) -> &mut ShippingInfo {
        &mut self.shipping
    }

    /// Billing data.
    pub fn billing(&self) -> &BillingInfo {
        &self.billing
    }

    /// Edit the billing data.
    pub fn billing_mut(&mut self) -> &mut BillingInfo {
        &mut self.billing
    }

    /// Payment step data.
    pub fn payment(&self) -> &PaymentInfo {
        &self.payment
    }

    /// Edit the payment step.
    pub fn payment_mut(&mut self) -> &mut PaymentInfo {
        &mut self.payment
    }

    /// Whether the terms and conditions were accepted.
    pub fn terms_accepted(&self) -> bool {
        self.terms_accepted
    }

    /// Accept or withdraw acceptance of the terms and conditions.
    pub fn set_terms_accepted(&mut self, accepted: bool) {
        self.terms_accepted = accepted;
    }

    /// Field errors from the last failed step completion or submission.
    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// Fill the shipping address from one of the account's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::UnknownSavedAddress`] if the account has no such address.
    pub fn select_saved_address(&mut self, id: &str) -> Result<(), CheckoutError> {
        let saved = self
            .auth
            .address(id)
            .ok_or_else(|| CheckoutError::UnknownSavedAddress(id.to_string()))?;

        self.shipping.use_saved_address(saved);

        Ok(())
    }

    /// Select a shipping method by id.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Shipping`] for an id the store does not offer.
    pub fn select_shipping_method(&mut self, id: &str) -> Result<&'s ShippingMethod, CheckoutError> {
        let store = self.store;
        let method = store.shipping().require(id)?;

        self.shipping.method_id = Some(method.id.clone());

        debug!(checkout_id = %self.id, method = %method.id, "selected shipping method");

        Ok(method)
    }

    /// The selected shipping method, if it exists in the store.
    pub fn shipping_method(&self) -> Option<&'s ShippingMethod> {
        let store = self.store;

        self.shipping
            .method_id
            .as_deref()
            .and_then(|id| store.shipping().get(id))
    }

    /// The bound promo code.
    pub fn promo(&self) -> Option<&PromoCode> {
        self.promo.as_ref()
    }

    /// Resolve `code` against the current subtotal and bind it to the checkout.
    ///
    /// # Errors
    ///
    /// - [`PromoError::AlreadyApplied`]: a code is already bound; remove it first.
    /// - Any error from [`crate::promotions::PromoCatalog::resolve`].
    pub fn apply_promo(&mut self, code: &str) -> Result<Price, PromoError> {
        if let Some(active) = &self.promo {
            return Err(PromoError::AlreadyApplied(active.code().to_string()));
        }

        let subtotal = self.cart.subtotal()?;

        let applied = self
            .store
            .promotions()
            .resolve(code, subtotal)
            .inspect_err(|error| {
                debug!(checkout_id = %self.id, error = %error, "rejected promo code");
            })?;

        let discount = applied.discount();

        info!(
            checkout_id = %self.id,
            code = applied.promo().code(),
            discount = %discount,
            "applied promo code"
        );

        self.promo = Some(applied.into_promo());

        Ok(discount)
    }

    /// Unbind the promo code, returning it.
    pub fn remove_promo(&mut self) -> Option<PromoCode> {
        let removed = self.promo.take();

        if let Some(promo) = &removed {
            info!(checkout_id = %self.id, code = promo.code(), "removed promo code");
        }

        removed
    }

    /// How the bound promo code resolves against the cart as it is now.
    ///
    /// `None` when no code is bound; `Some(Err(MinimumOrderNotMet))` when the cart has
    /// shrunk below the code's minimum, in which case the discount is zero.
    pub fn promo_status(&self) -> Option<Result<Price, PromoError>> {
        let promo = self.promo.as_ref()?;

        Some(
            self.cart
                .subtotal()
                .map_err(PromoError::from)
                .and_then(|subtotal| promo.discount_for(subtotal)),
        )
    }

    fn promo_discount(&self) -> Result<Price, PricingError> {
        match self.promo_status() {
            Some(Ok(discount)) => Ok(discount),
            Some(Err(PromoError::Pricing(error))) => Err(error),
            None | Some(Err(_)) => Ok(Money::from_minor(0, self.cart.currency())),
        }
    }

    /// Totals from the cart, the bound promo code, the selected shipping method and the
    /// store rules, computed fresh on every call.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the amounts cannot be combined.
    pub fn totals(&self) -> Result<OrderTotals, PricingError> {
        let currency = self.cart.currency();
        let discount = self.promo_discount()?;

        let shipping = self
            .shipping_method()
            .map_or_else(|| Money::from_minor(0, currency), |method| method.price);

        calculate_totals(
            self.cart.lines(),
            currency,
            discount,
            shipping,
            self.store.rules(),
        )
    }

    /// Check a step's data without changing anything.
    pub fn validate_step(&self, step: CheckoutStep) -> FieldErrors {
        match step {
            CheckoutStep::Contact => self.contact.validate(),
            CheckoutStep::Shipping => self.shipping.validate(self.store.shipping()),
            CheckoutStep::Payment => {
                let mut errors = self.payment.validate();
                errors.merge(self.billing.validate());
                errors
            }
            CheckoutStep::Review => {
                let mut errors = FieldErrors::new();

                if !self.terms_accepted {
                    errors.insert("terms", "Accept the terms and conditions to continue");
                }

                errors
            }
        }
    }

    /// Validate `step` and, when it passes, mark it completed and advance to the next
    /// step, which is returned.
    ///
    /// The next step is always the one after `step`, even when the customer had already
    /// got further: completing contact again from the review step moves to shipping.
    /// Later steps stay completed, so the customer can jump straight back to review.
    ///
    /// # Errors
    ///
    /// - [`StepError::ReviewIsSubmissionGate`]: the review step is completed by
    ///   [`CheckoutSession::submit`].
    /// - [`StepError::NotReachable`]: `step` is ahead of the current step.
    /// - [`StepError::Invalid`]: the step's data did not validate. The errors are also
    ///   kept on the session and the current step does not change.
    pub fn complete_step(&mut self, step: CheckoutStep) -> Result<CheckoutStep, StepError> {
        if step == CheckoutStep::Review {
            return Err(StepError::ReviewIsSubmissionGate);
        }

        if !self.flow.can_go_to(step) {
            return Err(StepError::NotReachable {
                from: self.flow.current_step(),
                to: step,
            });
        }

        let errors = self.validate_step(step);

        if !errors.is_empty() {
            debug!(checkout_id = %self.id, step = %step, errors = %errors, "step failed validation");

            self.field_errors = errors.clone();

            return Err(StepError::Invalid { step, errors });
        }

        self.field_errors = FieldErrors::new();

        let next = self.flow.complete(step);

        info!(checkout_id = %self.id, step = %step, next = %next, "completed checkout step");

        Ok(next)
    }

    /// Move to `step`.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::NotReachable`] when `step` is ahead of the current step and
    /// has not been completed.
    pub fn go_to(&mut self, step: CheckoutStep) -> Result<(), StepError> {
        self.flow.go_to(step)?;
        self.field_errors = FieldErrors::new();

        Ok(())
    }

    /// Move to the previous step.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::AtFirstStep`] on the contact step.
    pub fn go_back(&mut self) -> Result<CheckoutStep, StepError> {
        let step = self.flow.go_back()?;
        self.field_errors = FieldErrors::new();

        Ok(step)
    }

    /// Submission progress.
    pub fn submission_state(&self) -> &SubmissionState {
        &self.submission
    }

    /// Whether a submission is waiting for the order API.
    pub fn is_submitting(&self) -> bool {
        matches!(self.submission, SubmissionState::InFlight)
    }

    /// Message from the last failed submission.
    pub fn submission_error(&self) -> Option<&str> {
        match &self.submission {
            SubmissionState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Confirmation of the placed order.
    pub fn confirmation(&self) -> Option<&OrderConfirmation> {
        match &self.submission {
            SubmissionState::Submitted(confirmation) => Some(confirmation),
            _ => None,
        }
    }

    /// Re-validate every step and assemble the order.
    fn build_payload(&mut self) -> Result<OrderPayload, CheckoutError> {
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let current = self.flow.current_step();

        if current != CheckoutStep::Review {
            return Err(CheckoutError::NotOnReview(current));
        }

        for step in [
            CheckoutStep::Contact,
            CheckoutStep::Shipping,
            CheckoutStep::Payment,
        ] {
            let errors = self.validate_step(step);

            if !errors.is_empty() {
                warn!(checkout_id = %self.id, step = %step, errors = %errors, "completed step no longer validates");

                self.field_errors = errors;

                return Err(CheckoutError::Incomplete(step));
            }
        }

        if !self.terms_accepted {
            self.field_errors = self.validate_step(CheckoutStep::Review);

            return Err(CheckoutError::TermsNotAccepted);
        }

        let totals = self.totals()?;

        let shipping_method_id = self
            .shipping
            .method_id
            .clone()
            .ok_or(CheckoutError::Incomplete(CheckoutStep::Shipping))?;

        let items = self
            .cart
            .iter()
            .map(OrderItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let promo_code = self
            .promo
            .as_ref()
            .filter(|_| totals.discount().to_minor_units() > 0)
            .map(|promo| promo.code().to_string());

        self.field_errors = FieldErrors::new();

        Ok(OrderPayload {
            checkout_id: self.id,
            contact: self.contact.clone(),
            shipping_address: self.shipping.address.clone(),
            billing_address: self.billing.effective(&self.shipping.address).clone(),
            payment: PaymentSummary::from(&self.payment),
            shipping_method_id,
            promo_code,
            items,
            totals: TotalsSummary::from(&totals),
        })
    }

    /// Check the checkout is ready, mark the submission in flight and return the payload
    /// to send.
    ///
    /// Pair with [`CheckoutSession::finish_submission`]; [`CheckoutSession::submit`] does
    /// both around a gateway call.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::SubmissionInProgress`] or [`CheckoutError::AlreadySubmitted`].
    /// - [`CheckoutError::EmptyCart`] or [`CheckoutError::NotOnReview`].
    /// - [`CheckoutError::Incomplete`]: a step no longer validates; its field errors are
    ///   kept on the session.
    /// - [`CheckoutError::TermsNotAccepted`].
    pub fn begin_submission(&mut self) -> Result<OrderPayload, CheckoutError> {
        match &self.submission {
            SubmissionState::InFlight => return Err(CheckoutError::SubmissionInProgress),
            SubmissionState::Submitted(_) => return Err(CheckoutError::AlreadySubmitted),
            SubmissionState::Idle | SubmissionState::Failed(_) => {}
        }

        let payload = self.build_payload()?;

        self.submission = SubmissionState::InFlight;

        debug!(checkout_id = %self.id, total = payload.totals.total, "submitting order");

        Ok(payload)
    }

    /// Record the order API's answer to the in-flight submission.
    ///
    /// On failure the session stays on the review step with everything intact, so the
    /// customer can submit again.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NoSubmissionPending`]: nothing is in flight.
    /// - [`CheckoutError::Submission`]: the order API failed.
    pub fn finish_submission(
        &mut self,
        outcome: Result<OrderConfirmation, SubmissionError>,
    ) -> Result<OrderConfirmation, CheckoutError> {
        if !self.is_submitting() {
            return Err(CheckoutError::NoSubmissionPending);
        }

        match outcome {
            Ok(confirmation) => {
                info!(
                    checkout_id = %self.id,
                    order_number = %confirmation.order_number,
                    "placed order"
                );

                self.submission = SubmissionState::Submitted(confirmation.clone());

                Ok(confirmation)
            }
            Err(error) => {
                warn!(checkout_id = %self.id, error = %error, "order submission failed");

                self.submission = SubmissionState::Failed(error.to_string());

                Err(CheckoutError::Submission(error))
            }
        }
    }

    /// Place the order through `gateway`.
    ///
    /// Dropping the returned future before the gateway answers marks the submission as
    /// failed, so the customer can submit again.
    ///
    /// # Errors
    ///
    /// Any error from [`CheckoutSession::begin_submission`] or
    /// [`CheckoutSession::finish_submission`].
    #[tracing::instrument(
        name = "checkout.session.submit",
        skip(self, gateway),
        fields(checkout_id = %self.id, order_number = tracing::field::Empty),
        err
    )]
    pub async fn submit<G>(&mut self, gateway: &G) -> Result<OrderConfirmation, CheckoutError>
    where
        G: OrderGateway + ?Sized,
    {
        let payload = self.begin_submission()?;
        let mut pending = PendingSubmission { session: self };
        let outcome = gateway.submit(&payload).await;
        let confirmation = pending.session.finish_submission(outcome)?;

        Span::current().record(
            "order_number",
            tracing::field::display(&confirmation.order_number),
        );

        Ok(confirmation)
    }
}

/// Marks an in-flight submission as failed if it is dropped before the gateway answers.
struct PendingSubmission<'a, 's> {
    session: &'a mut CheckoutSession<'s>,
}

impl Drop for PendingSubmission<'_, '_> {
    fn drop(&mut self) {
        if self.session.is_submitting() {
            warn!(checkout_id = %self.session.id, "order submission was cancelled");

            self.session.submission =
                SubmissionState::Failed("order submission was cancelled".to_string());
        }
    }
}

fn fill_if_blank(target: &mut String, value: Option<&str>) {
    if let Some(value) = value
        && target.trim().is_empty()
    {
        value.clone_into(target);
    }
}
