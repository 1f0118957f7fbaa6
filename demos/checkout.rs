//! Checkout Example
//!
//! Walks a signed-in customer through contact, shipping, payment and review, then places
//! the order with the order API. Without an order API the payload is printed instead.
//!
//! Use `--order-api-url` (or `FURNISH_ORDER_API_URL`) to submit to a real order API
//! Use `-p` to apply a promo code and `--shipping` to pick a shipping method
//! Use `--log-format json` for structured logs

use std::io;

use anyhow::Result;
use clap::Parser;
use furnish::{
    auth::{AuthSnapshot, SavedAddress},
    cart::{Cart, CartLine},
    checkout::{CheckoutSession, CheckoutStep, forms::CardDetails},
    summary::OrderSummary,
    utils::{ExampleCheckoutArgs, LogFormat, LoggingArgs},
};
use rusty_money::Money;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.log_level));

    match logging.log_format {
        LogFormat::Compact => tracing_subscriber::fmt()
            .compact()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init(),
    }
}

fn customer() -> AuthSnapshot {
    AuthSnapshot::authenticated("maya@example.com")
        .with_phone("+1 415 555 0142")
        .with_name("Maya", "Okafor")
        .with_saved_address(SavedAddress {
            id: "addr_home".to_string(),
            label: "Home".to_string(),
            first_name: "Maya".to_string(),
            last_name: "Okafor".to_string(),
            phone: "+1 415 555 0142".to_string(),
            address_line1: "2150 Fillmore St".to_string(),
            address_line2: "Apt 4".to_string(),
            city: "San Francisco".to_string(),
            region: "CA".to_string(),
            postal_code: "94115".to_string(),
            country: "United States".to_string(),
            is_default: true,
        })
}

/// Checkout Example
#[tokio::main]
#[expect(clippy::print_stdout, reason = "Example code")]
pub async fn main() -> Result<()> {
    _ = dotenvy::dotenv();

    let args = ExampleCheckoutArgs::parse();

    init_tracing(&args.logging);

    let store = args.load_store()?;
    let currency = store.currency();

    let cart = Cart::with_lines(
        [CartLine::new("oslo-sofa", "Oslo 3-Seat Sofa", Money::from_minor(890_000, currency), 1)?],
        currency,
    )?;

    let mut session = CheckoutSession::new(&store, cart, customer());

    if let Some(code) = args.promo.as_deref()
        && let Err(error) = session.apply_promo(code)
    {
        warn!(%error, "promo code not applied");
    }

    session.complete_step(CheckoutStep::Contact)?;

    session.select_shipping_method(&args.shipping)?;
    session.complete_step(CheckoutStep::Shipping)?;

    session.payment_mut().card = CardDetails {
        number: "4242 4242 4242 4242".to_string(),
        expiry: "12/29".to_string(),
        cvc: "123".to_string(),
        holder_name: "Maya Okafor".to_string(),
    };
    session.complete_step(CheckoutStep::Payment)?;

    session.set_terms_accepted(true);

    OrderSummary::from_session(&session)?.write_to(io::stdout().lock())?;

    match args.order_gateway() {
        Some(gateway) => {
            let confirmation = session.submit(&gateway).await?;

            info!(order_number = %confirmation.order_number, "order placed");
            println!("Order placed: {}", confirmation.confirmation_url());
        }
        None => {
            let payload = session.begin_submission()?;

            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(())
}
