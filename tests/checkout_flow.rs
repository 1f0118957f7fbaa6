//! Integration test for a complete checkout with a promo code and white glove delivery.
//!
//! The customer buys a single sofa and walks through every step:
//!
//! 1. Subtotal: $8,900.00
//! 2. `WELCOME10` (10% off): -$890.00
//! 3. White glove delivery: $500.00
//! 4. Tax at 11% on $8,900.00 - $890.00 + $500.00 = $8,510.00: $936.10
//!
//! Expected total: $8,900.00 - $890.00 + $500.00 + $936.10 = $9,446.10

use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use furnish::prelude::*;

fn usd(minor: i64) -> Price {
    Money::from_minor(minor, USD)
}

fn sofa_cart(minor: i64) -> TestResult<Cart> {
    Ok(Cart::with_lines(
        [CartLine::new("oslo-sofa", "Oslo 3-Seat Sofa", usd(minor), 1)?],
        USD,
    )?)
}

fn fill_contact(session: &mut CheckoutSession<'_>) {
    let contact = session.contact_mut();

    contact.email = "maya@example.com".to_string();
    contact.phone = "+1 415 555 0142".to_string();
}

fn fill_shipping(session: &mut CheckoutSession<'_>) {
    let address = &mut session.shipping_mut().address;

    address.first_name = "Maya".to_string();
    address.last_name = "Okafor".to_string();
    address.address_line1 = "2150 Fillmore St".to_string();
    address.city = "San Francisco".to_string();
    address.region = "CA".to_string();
    address.country = "United States".to_string();
}

fn fill_card(session: &mut CheckoutSession<'_>, number: &str) {
    session.payment_mut().card = CardDetails {
        number: number.to_string(),
        expiry: "12/29".to_string(),
        cvc: "123".to_string(),
        holder_name: "Maya Okafor".to_string(),
    };
}

#[test]
fn end_to_end_totals_follow_the_checkout_tax_base() -> TestResult {
    let store = StoreConfig::default();
    let mut session = CheckoutSession::new(&store, sofa_cart(890_000)?, AuthSnapshot::guest());

    assert_eq!(session.apply_promo("WELCOME10")?, usd(89_000));

    session.select_shipping_method("white_glove")?;

    let totals = session.totals()?;

    assert_eq!(totals.subtotal(), usd(890_000));
    assert_eq!(totals.discount(), usd(89_000));
    assert_eq!(totals.shipping_cost(), usd(50_000));
    assert_eq!(totals.tax(), usd(93_610));
    assert_eq!(totals.total(), usd(944_610));

    Ok(())
}

#[test]
fn guest_walks_every_step_to_review() -> TestResult {
    let store = StoreConfig::default();
    let mut session = CheckoutSession::new(&store, sofa_cart(890_000)?, AuthSnapshot::guest());

    fill_contact(&mut session);
    assert_eq!(session.complete_step(CheckoutStep::Contact)?, CheckoutStep::Shipping);

    fill_shipping(&mut session);
    session.select_shipping_method("white_glove")?;
    assert_eq!(session.complete_step(CheckoutStep::Shipping)?, CheckoutStep::Payment);

    fill_card(&mut session, "4242 4242 4242 4242");
    assert_eq!(session.complete_step(CheckoutStep::Payment)?, CheckoutStep::Review);

    session.set_terms_accepted(true);

    let payload = session.begin_submission()?;

    assert_eq!(payload.contact.email, "maya@example.com");
    assert_eq!(payload.shipping_method_id, "white_glove");
    assert_eq!(payload.payment.card_last_four.as_deref(), Some("4242"));
    assert_eq!(payload.items.len(), 1);
    assert_eq!(payload.totals.currency, "USD");

    Ok(())
}

#[test]
fn forward_skip_to_payment_is_refused() -> TestResult {
    let store = StoreConfig::default();
    let mut session = CheckoutSession::new(&store, sofa_cart(10_000)?, AuthSnapshot::guest());

    assert_eq!(
        session.go_to(CheckoutStep::Payment),
        Err(StepError::NotReachable {
            from: CheckoutStep::Contact,
            to: CheckoutStep::Payment,
        })
    );

    fill_contact(&mut session);
    session.complete_step(CheckoutStep::Contact)?;

    assert!(session.go_to(CheckoutStep::Payment).is_err());
    assert!(matches!(
        session.complete_step(CheckoutStep::Payment),
        Err(StepError::NotReachable { .. })
    ));
    assert_eq!(session.current_step(), CheckoutStep::Shipping);

    Ok(())
}

#[test]
fn card_number_needs_sixteen_digits() -> TestResult {
    let store = StoreConfig::default();
    let mut session = CheckoutSession::new(&store, sofa_cart(10_000)?, AuthSnapshot::guest());

    fill_contact(&mut session);
    session.complete_step(CheckoutStep::Contact)?;
    fill_shipping(&mut session);
    session.complete_step(CheckoutStep::Shipping)?;

    fill_card(&mut session, "4242 4242 4242");

    let Err(StepError::Invalid { errors, .. }) = session.complete_step(CheckoutStep::Payment)
    else {
        return Err("twelve digit card number should fail".into());
    };

    assert!(errors.contains("card_number"));
    assert_eq!(session.current_step(), CheckoutStep::Payment);

    fill_card(&mut session, "4242 4242 4242 4242");

    assert_eq!(session.complete_step(CheckoutStep::Payment)?, CheckoutStep::Review);
    assert!(session.field_errors().is_empty());

    Ok(())
}

#[test]
fn dashed_card_number_completes_payment() -> TestResult {
    let store = StoreConfig::default();
    let mut session = CheckoutSession::new(&store, sofa_cart(10_000)?, AuthSnapshot::guest());

    fill_contact(&mut session);
    session.complete_step(CheckoutStep::Contact)?;
    fill_shipping(&mut session);
    session.complete_step(CheckoutStep::Shipping)?;

    fill_card(&mut session, "4242-4242-4242-4242");

    assert_eq!(session.complete_step(CheckoutStep::Payment)?, CheckoutStep::Review);

    session.set_terms_accepted(true);

    let payload = session.begin_submission()?;

    assert_eq!(payload.payment.card_last_four.as_deref(), Some("4242"));

    Ok(())
}

#[test]
fn different_billing_address_is_validated() -> TestResult {
    let store = StoreConfig::default();
    let mut session = CheckoutSession::new(&store, sofa_cart(10_000)?, AuthSnapshot::guest());

    fill_contact(&mut session);
    session.complete_step(CheckoutStep::Contact)?;
    fill_shipping(&mut session);
    session.complete_step(CheckoutStep::Shipping)?;

    session.payment_mut().method = PaymentMethod::CashOnDelivery;
    session.billing_mut().same_as_shipping = false;

    assert!(matches!(
        session.complete_step(CheckoutStep::Payment),
        Err(StepError::Invalid { ref errors, .. }) if errors.contains("billing.address_line1")
    ));

    session.billing_mut().same_as_shipping = true;

    assert_eq!(session.complete_step(CheckoutStep::Payment)?, CheckoutStep::Review);

    Ok(())
}

#[test]
fn promo_minimum_order_is_inclusive() -> TestResult {
    let store = StoreConfig::default();

    let mut below = CheckoutSession::new(&store, sofa_cart(49_900)?, AuthSnapshot::guest());

    assert_eq!(
        below.apply_promo("SAVE100"),
        Err(PromoError::MinimumOrderNotMet(usd(50_000)))
    );
    assert!(below.promo().is_none());

    let mut at = CheckoutSession::new(&store, sofa_cart(50_000)?, AuthSnapshot::guest());

    assert_eq!(at.apply_promo("save100")?, usd(10_000));

    Ok(())
}

#[test]
fn removing_promo_resets_discount_and_keeps_everything_else() -> TestResult {
    let store = StoreConfig::default();
    let mut session = CheckoutSession::new(&store, sofa_cart(890_000)?, AuthSnapshot::guest());

    fill_contact(&mut session);
    session.complete_step(CheckoutStep::Contact)?;
    session.select_shipping_method("white_glove")?;
    session.apply_promo("WELCOME10")?;

    assert_eq!(session.totals()?.total(), usd(944_610));

    let removed = session.remove_promo();

    assert_eq!(removed.map(|promo| promo.code().to_string()), Some("WELCOME10".to_string()));

    let totals = session.totals()?;

    assert_eq!(totals.discount(), usd(0));
    assert_eq!(totals.tax(), usd(103_400));
    assert_eq!(totals.total(), usd(1_043_400));
    assert_eq!(session.contact().email, "maya@example.com");
    assert_eq!(session.current_step(), CheckoutStep::Shipping);
    assert!(session.promo_status().is_none());

    Ok(())
}

#[test]
fn totals_never_go_negative() -> TestResult {
    let lines = [CartLine::new("stool", "Stool", usd(4_000), 1)?];

    let totals = calculate_totals(
        &lines,
        USD,
        usd(10_000),
        usd(0),
        &PricingRules::default(),
    )?;

    assert_eq!(totals.discount(), usd(4_000));
    assert_eq!(totals.total(), usd(0));

    Ok(())
}

#[test]
fn totals_are_idempotent() -> TestResult {
    let store = StoreConfig::default();
    let mut session = CheckoutSession::new(&store, sofa_cart(890_000)?, AuthSnapshot::guest());

    session.apply_promo("WELCOME10")?;
    session.select_shipping_method("express")?;

    assert_eq!(session.totals()?, session.totals()?);

    Ok(())
}
