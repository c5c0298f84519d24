use rust_decimal::Decimal;
use serde::Serialize;

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// One product line of an order.
///
/// Only the quantity can change after construction, and only through
/// [`OrderItem::change_quantity`], which re-checks the same rules as `new`.
/// `price * quantity` always fits in a [`Decimal`].
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct OrderItem {
    id: String,
    name: String,
    price: Decimal,
    product_id: String,
    quantity: i32,
}

impl OrderItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
        product_id: impl Into<String>,
        quantity: i32,
    ) -> Result<Self, OrderError> {
        validate_quantity(quantity)?;
        if price < Decimal::ZERO {
            return Err(OrderError::InvalidPrice(price));
        }
        checked_subtotal(price, quantity)?;

        Ok(Self {
            id: id.into(),
            name: name.into(),
            price,
            product_id: product_id.into(),
            quantity,
        })
    }

    pub fn change_quantity(&mut self, quantity: i32) -> Result<(), OrderError> {
        validate_quantity(quantity)?;
        checked_subtotal(self.price, quantity)?;
        self.quantity = quantity;
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price
    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn subtotal(&self) -> Decimal {
        // Construction already proved the product fits.
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

fn checked_subtotal(price: Decimal, quantity: i32) -> Result<Decimal, OrderError> {
    price
        .checked_mul(Decimal::from(quantity))
        .ok_or(OrderError::TotalOverflow)
}

fn validate_quantity(quantity: i32) -> Result<(), OrderError> {
    if quantity <= 0 {
        return Err(OrderError::InvalidQuantity(quantity));
    }
    Ok(())
}

// ============================================================================
// Unit Tests
// ============================================================================
