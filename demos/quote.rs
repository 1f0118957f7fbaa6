//! Quote Example
//!
//! Prices a sample furniture cart against the store config and prints the order summary.
//!
//! Use `-s` to load a store config YAML (or set `FURNISH_STORE_CONFIG`)
//! Use `-p` to apply a promo code
//! Use `--shipping` to pick a shipping method

use std::io;

use anyhow::Result;
use clap::Parser;
use furnish::{
    cart::{Cart, CartLine},
    pricing::calculate_totals,
    promotions::AppliedPromo,
    summary::OrderSummary,
    utils::ExampleCheckoutArgs,
};
use rusty_money::Money;

/// Quote Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    _ = dotenvy::dotenv();

    let args = ExampleCheckoutArgs::parse();
    let store = args.load_store()?;
    let currency = store.currency();

    let cart = Cart::with_lines(
        [
            CartLine::new("oslo-sofa", "Oslo 3-Seat Sofa", Money::from_minor(520_000, currency), 1)?,
            CartLine::new("arc-lamp", "Arc Floor Lamp", Money::from_minor(45_000, currency), 2)?,
            CartLine::new("wool-rug", "Hand-Tufted Wool Rug", Money::from_minor(280_000, currency), 1)?,
        ],
        currency,
    )?;

    let subtotal = cart.subtotal()?;
    let method = store.shipping().require(&args.shipping)?;

    let applied = args
        .promo
        .as_deref()
        .map(|code| store.promotions().resolve(code, subtotal))
        .transpose()?;

    let discount = applied
        .as_ref()
        .map_or_else(|| Money::from_minor(0, currency), AppliedPromo::discount);

    let totals = calculate_totals(cart.lines(), currency, discount, method.price, store.rules())?;

    let mut summary = OrderSummary::new(cart.lines(), totals).with_shipping_method(method);

    if let Some(applied) = &applied {
        summary = summary.with_promo_code(applied.promo().code());
    }

    summary.write_to(io::stdout().lock())?;

    println!(" Delivery: {} ({})", method.name, method.estimated_days);

    Ok(())
}
