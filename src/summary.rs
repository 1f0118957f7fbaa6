//! Order Summary

use std::io;

use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::CartLine,
    checkout::CheckoutSession,
    pricing::{OrderTotals, PricingError},
    promotions::PromoCode,
    shipping::ShippingMethod,
};

/// Errors that can occur when writing an order summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// The review step's breakdown of an order: one row per cart line, then the totals.
#[derive(Debug, Clone)]
pub struct OrderSummary<'a> {
    lines: &'a [CartLine],
    totals: OrderTotals,
    shipping_method: Option<&'a ShippingMethod>,
    promo_code: Option<&'a str>,
}

impl<'a> OrderSummary<'a> {
    /// Summary of `lines` with precomputed `totals`.
    pub fn new(lines: &'a [CartLine], totals: OrderTotals) -> Self {
        Self {
            lines,
            totals,
            shipping_method: None,
            promo_code: None,
        }
    }

    /// Summary of a checkout session as it stands.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Pricing`] if the session's totals cannot be computed.
    pub fn from_session(session: &'a CheckoutSession<'_>) -> Result<Self, SummaryError> {
        let mut summary = Self::new(session.cart().lines(), session.totals()?);

        summary.shipping_method = session.shipping_method();
        summary.promo_code = session.promo().map(PromoCode::code);

        Ok(summary)
    }

    /// Name the shipping method on the shipping line.
    #[must_use]
    pub fn with_shipping_method(mut self, method: &'a ShippingMethod) -> Self {
        self.shipping_method = Some(method);
        self
    }

    /// Name the promo code on the discount line.
    #[must_use]
    pub fn with_promo_code(mut self, code: &'a str) -> Self {
        self.promo_code = Some(code);
        self
    }

    /// Totals shown under the table.
    pub fn totals(&self) -> &OrderTotals {
        &self.totals
    }

    /// Writes the summary.
    ///
    /// # Errors
    ///
    /// Returns an error if a line total cannot be computed or the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Unit Price", "Line Total"]);

        for line in self.lines {
            builder.push_record([
                line.name().to_string(),
                line.quantity().to_string(),
                line.unit_price().to_string(),
                line.line_total()?.to_string(),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..4), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| SummaryError::IO)?;

        self.write_totals(&mut out)
    }

    fn write_totals(&self, out: &mut impl io::Write) -> Result<(), SummaryError> {
        let discount_label = match self.promo_code {
            Some(code) => format!("Discount ({code}):"),
            None => "Discount:".to_string(),
        };

        let shipping_label = match self.shipping_method {
            Some(method) => format!("Shipping ({}):", method.name),
            None => "Shipping:".to_string(),
        };

        let shipping_value = if self.totals.shipping_cost().to_minor_units() == 0 {
            "Free".to_string()
        } else {
            self.totals.shipping_cost().to_string()
        };

        let rows = [
            ("Subtotal:".to_string(), self.totals.subtotal().to_string()),
            (discount_label, format!("-{}", self.totals.discount())),
            (shipping_label, shipping_value),
            ("Tax:".to_string(), self.totals.tax().to_string()),
            ("Total:".to_string(), self.totals.total().to_string()),
        ];

        let label_width = rows
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);

        let value_width = rows
            .iter()
            .map(|(_, value)| value.chars().count())
            .max()
            .unwrap_or(0);

        for (label, value) in &rows {
            writeln!(out, " {label:>label_width$}  {value:>value_width$}")
                .map_err(|_err| SummaryError::IO)?;
        }

        writeln!(out).map_err(|_err| SummaryError::IO)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::{
        auth::AuthSnapshot,
        cart::Cart,
        config::StoreConfig,
        pricing::{PricingRules, calculate_totals},
    };

    use super::*;

    #[test]
    fn write_to_renders_lines_and_totals() -> TestResult {
        let lines = [
            CartLine::new("sofa", "Linen Sofa", Money::from_minor(790_000, USD), 1)?,
            CartLine::new("lamp", "Arc Lamp", Money::from_minor(50_000, USD), 2)?,
        ];

        let totals = calculate_totals(
            &lines,
            USD,
            Money::from_minor(89_000, USD),
            Money::from_minor(50_000, USD),
            &PricingRules::default(),
        )?;

        let method = ShippingMethod::new(
            "white_glove",
            "White Glove Delivery",
            "",
            Money::from_minor(50_000, USD),
            "7-14 business days",
        );

        let summary = OrderSummary::new(&lines, totals)
            .with_shipping_method(&method)
            .with_promo_code("WELCOME10");

        let mut out = Vec::new();
        summary.write_to(&mut out)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Linen Sofa"));
        assert!(output.contains("Arc Lamp"));
        assert!(output.contains("Discount (WELCOME10):"));
        assert!(output.contains("Shipping (White Glove Delivery):"));
        assert!(output.contains("9,446.10"));

        Ok(())
    }

    #[test]
    fn free_shipping_is_labelled() -> TestResult {
        let store = StoreConfig::default();
        let cart = Cart::with_lines(
            [CartLine::new("rug", "Wool Rug", Money::from_minor(30_000, USD), 1)?],
            USD,
        )?;
        let session = CheckoutSession::new(&store, cart, AuthSnapshot::guest());

        let mut out = Vec::new();
        OrderSummary::from_session(&session)?.write_to(&mut out)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Shipping (Standard Delivery):"));
        assert!(output.contains("Free"));
        assert!(output.contains("Discount:"));

        Ok(())
    }
}
