//! Cart

use rusty_money::{Money, iso::Currency};

use crate::{
    pricing::{Price, PricingError, subtotal},
    validation::ValidationError,
};

/// One priced, quantified product in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    product_id: String,
    name: String,
    unit_price: Price,
    quantity: u32,
}

impl CartLine {
    /// Create a new cart line.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::NegativePrice`]: the unit price is below zero.
    /// - [`ValidationError::ZeroQuantity`]: the quantity is zero.
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Price,
        quantity: u32,
    ) -> Result<Self, ValidationError> {
        let minor = unit_price.to_minor_units();

        if minor < 0 {
            return Err(ValidationError::NegativePrice(minor));
        }

        if quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }

        Ok(Self {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            quantity,
        })
    }

    /// Product identifier.
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price of a single unit.
    pub fn unit_price(&self) -> Price {
        self.unit_price
    }

    /// Number of units.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Change the quantity.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroQuantity`] for zero; remove the line instead.
    pub fn set_quantity(&mut self, quantity: u32) -> Result<(), ValidationError> {
        if quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }

        self.quantity = quantity;

        Ok(())
    }

    /// Unit price × quantity, derived on every call.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the product does not fit in minor units.
    pub fn line_total(&self) -> Result<Price, PricingError> {
        let minor = self
            .unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
            .ok_or(PricingError::Overflow)?;

        Ok(Money::from_minor(minor, self.unit_price.currency()))
    }
}

/// Lines of a single-currency shopping cart, in the order they were added.
#[derive(Debug, Clone)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: &'static Currency,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a cart holding the given lines.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::CurrencyMismatch`] if a line is priced in another currency.
    pub fn with_lines(
        lines: impl IntoIterator<Item = CartLine>,
        currency: &'static Currency,
    ) -> Result<Self, ValidationError> {
        let mut cart = Self::new(currency);

        for line in lines {
            cart.add(line)?;
        }

        Ok(cart)
    }

    /// Add a line, merging quantities with an existing line for the same product.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::CurrencyMismatch`]: the line is priced in another currency.
    /// - [`ValidationError::QuantityOverflow`]: the merged quantity does not fit.
    pub fn add(&mut self, line: CartLine) -> Result<(), ValidationError> {
        let line_currency = line.unit_price.currency();

        if line_currency != self.currency {
            return Err(ValidationError::CurrencyMismatch(
                line_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|existing| existing.product_id == line.product_id)
        {
            existing.quantity = existing
                .quantity
                .checked_add(line.quantity)
                .ok_or_else(|| ValidationError::QuantityOverflow(line.product_id.clone()))?;
        } else {
            self.lines.push(line);
        }

        Ok(())
    }

    /// Change the quantity of a product's line.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::LineNotFound`]: the product is not in the cart.
    /// - [`ValidationError::ZeroQuantity`]: the quantity is zero.
    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) -> Result<(), ValidationError> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
            .ok_or_else(|| ValidationError::LineNotFound(product_id.to_string()))?
            .set_quantity(quantity)
    }

    /// Remove a product's line, returning it.
    pub fn remove(&mut self, product_id: &str) -> Option<CartLine> {
        let idx = self
            .lines
            .iter()
            .position(|line| line.product_id == product_id)?;

        Some(self.lines.remove(idx))
    }

    /// Sum of line totals.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the sum overflows.
    pub fn subtotal(&self) -> Result<Price, PricingError> {
        subtotal(&self.lines, self.currency)
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Iterate over the lines.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn usd(minor: i64) -> Price {
        Money::from_minor(minor, USD)
    }

    #[test]
    fn new_line_rejects_negative_price() {
        let result = CartLine::new("sofa", "Sofa", usd(-1), 1);

        assert_eq!(result, Err(ValidationError::NegativePrice(-1)));
    }

    #[test]
    fn new_line_rejects_zero_quantity() {
        let result = CartLine::new("sofa", "Sofa", usd(100), 0);

        assert_eq!(result, Err(ValidationError::ZeroQuantity));
    }

    #[test]
    fn line_total_follows_quantity_changes() -> TestResult {
        let mut line = CartLine::new("chair", "Dining Chair", usd(12_500), 2)?;

        assert_eq!(line.line_total()?, usd(25_000));

        line.set_quantity(4)?;

        assert_eq!(line.line_total()?, usd(50_000));

        Ok(())
    }

    #[test]
    fn line_total_overflow_returns_error() -> TestResult {
        let line = CartLine::new("vase", "Vase", usd(i64::MAX), 2)?;

        assert_eq!(line.line_total(), Err(PricingError::Overflow));

        Ok(())
    }

    #[test]
    fn add_merges_lines_for_the_same_product() -> TestResult {
        let mut cart = Cart::new(USD);

        cart.add(CartLine::new("lamp", "Floor Lamp", usd(8_900), 1)?)?;
        cart.add(CartLine::new("lamp", "Floor Lamp", usd(8_900), 2)?)?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal()?, usd(26_700));

        Ok(())
    }

    #[test]
    fn add_rejects_other_currencies() -> TestResult {
        let mut cart = Cart::new(USD);
        let line = CartLine::new("rug", "Rug", Money::from_minor(10_000, GBP), 1)?;

        assert_eq!(
            cart.add(line),
            Err(ValidationError::CurrencyMismatch("GBP", "USD"))
        );
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn set_quantity_and_remove_update_subtotal() -> TestResult {
        let mut cart = Cart::with_lines(
            [
                CartLine::new("bed", "Oak Bed", usd(150_000), 1)?,
                CartLine::new("pillow", "Pillow", usd(2_500), 2)?,
            ],
            USD,
        )?;

        cart.set_quantity("pillow", 4)?;
        assert_eq!(cart.subtotal()?, usd(160_000));

        let removed = cart.remove("bed");
        assert_eq!(removed.map(|line| line.quantity()), Some(1));
        assert_eq!(cart.subtotal()?, usd(10_000));

        Ok(())
    }

    #[test]
    fn set_quantity_missing_product_returns_error() {
        let mut cart = Cart::new(USD);

        assert_eq!(
            cart.set_quantity("ghost", 1),
            Err(ValidationError::LineNotFound("ghost".to_string()))
        );
    }

    #[test]
    fn empty_cart_has_zero_subtotal() -> TestResult {
        let cart = Cart::new(USD);

        assert_eq!(cart.subtotal()?, usd(0));
        assert_eq!(cart.currency(), USD);

        Ok(())
    }
}
