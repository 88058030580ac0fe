use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::ServiceError;
use crate::messages;

/// What the cart needs to know about a coffee to sell it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartProduct {
    pub coffee_id: i32,
    pub name: String,
    pub type_name: Option<String>,
    pub price_per_kg: Decimal,
    pub quantity_in_stock: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub coffee_id: i32,
    pub name: String,
    pub type_name: Option<String>,
    /// Kilograms, three decimals.
    pub quantity: Decimal,
    /// Price per kilogram, two decimals.
    pub unit_price: Decimal,
    pub available: Decimal,
    pub subtotal: Decimal,
}

impl CartLine {
    fn new(product: &CartProduct, quantity: Decimal) -> Self {
        let unit_price = product.price_per_kg.round_dp(2);
        let quantity = quantity.round_dp(3);
        Self {
            coffee_id: product.coffee_id,
            name: product.name.clone(),
            type_name: product.type_name.clone(),
            quantity,
            unit_price,
            available: product.quantity_in_stock,
            subtotal: line_subtotal(quantity, unit_price),
        }
    }
}

/// `round(quantity * unit_price, 2)`, banker's rounding.
pub fn line_subtotal(quantity: Decimal, unit_price: Decimal) -> Decimal {
    (quantity * unit_price).round_dp(2)
}

/// A till cart. Every mutation recomputes `total` and `change` before
/// returning, so readers never see stale figures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    amount_paid: Decimal,
    total: Decimal,
    change: Decimal,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn amount_paid(&self) -> Decimal {
        self.amount_paid
    }

    /// Negative while the tendered amount is short of the total.
    pub fn change(&self) -> Decimal {
        self.change
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_fully_paid(&self) -> bool {
        self.amount_paid >= self.total
    }

    pub fn line(&self, coffee_id: i32) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.coffee_id == coffee_id)
    }

    /// Sets the quantity of `product` in the cart, adding or replacing its
    /// line. Zero removes the line.
    pub fn set_quantity(
        &mut self,
        product: &CartProduct,
        quantity: Decimal,
    ) -> Result<(), ServiceError> {
        if quantity < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                messages::QUANTITY_NEGATIVE.to_string(),
            ));
        }
        let quantity = quantity.round_dp(3);
        if quantity > product.quantity_in_stock {
            return Err(ServiceError::InsufficientStock(messages::stock_exceeded(
                product.quantity_in_stock,
            )));
        }

        let position = self.lines.iter().position(|l| l.coffee_id == product.coffee_id);
        match (position, quantity.is_zero()) {
            (Some(index), true) => {
                self.lines.remove(index);
            }
            (Some(index), false) => self.lines[index] = CartLine::new(product, quantity),
            (None, true) => {}
            (None, false) => self.lines.push(CartLine::new(product, quantity)),
        }

        self.recompute();
        Ok(())
    }

    /// Adds one kilogram. Fails without changing anything if that would
    /// exceed the stock.
    pub fn increase(&mut self, coffee_id: i32) -> Result<(), ServiceError> {
        let index = self.index_of(coffee_id)?;
        let line = &self.lines[index];
        let next = (line.quantity + Decimal::ONE).round_dp(3);
        if next > line.available {
            return Err(ServiceError::InsufficientStock(messages::stock_exceeded(
                line.available,
            )));
        }
        self.update_line_quantity(index, next);
        Ok(())
    }

    /// Removes one kilogram, stopping at zero (which drops the line).
    pub fn decrease(&mut self, coffee_id: i32) -> Result<(), ServiceError> {
        let index = self.index_of(coffee_id)?;
        let next = (self.lines[index].quantity - Decimal::ONE)
            .round_dp(3)
            .max(Decimal::ZERO);
        self.update_line_quantity(index, next);
        Ok(())
    }

    pub fn remove(&mut self, coffee_id: i32) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.coffee_id != coffee_id);
        let removed = self.lines.len() != before;
        self.recompute();
        removed
    }

    pub fn set_amount_paid(&mut self, amount_paid: Decimal) {
        self.amount_paid = amount_paid;
        self.recompute();
    }

    fn index_of(&self, coffee_id: i32) -> Result<usize, ServiceError> {
        self.lines
            .iter()
            .position(|l| l.coffee_id == coffee_id)
            .ok_or_else(|| ServiceError::NotFound(messages::coffee_id_not_found(coffee_id)))
    }

    fn update_line_quantity(&mut self, index: usize, quantity: Decimal) {
        if quantity.is_zero() {
            self.lines.remove(index);
        } else {
            let line = &mut self.lines[index];
            line.quantity = quantity;
            line.subtotal = line_subtotal(quantity, line.unit_price);
        }
        self.recompute();
    }

    /// Total is the sum of line subtotals; change is what the customer gets back.
    fn recompute(&mut self) {
        self.total = self.lines.iter().map(|l| l.subtotal).sum();
        self.change = self.amount_paid - self.total;
    }
}
