use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;

use super::errors::OrderError;
use super::value_objects::OrderItem;

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================

/// Order aggregate root: an owner reference plus a non-empty, ordered
/// sequence of line items with unique identities.
///
/// The total is never stored on the aggregate; [`Order::total`] derives it
/// from the items on every call. Construction and item mutation reject any
/// item set whose total does not fit in a [`Decimal`].
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Order {
    // Identity
    id: String,

    // Current State
    customer_id: String,
    items: Vec<OrderItem>,
}

impl Order {
    pub fn new(
        id: impl Into<String>,
        customer_id: impl Into<String>,
        items: Vec<OrderItem>,
    ) -> Result<Self, OrderError> {
        Self::validate_items(&items)?;
        Self::checked_total(&items)?;

        Ok(Self {
            id: id.into(),
            customer_id: customer_id.into(),
            items,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn item(&self, item_id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.id() == item_id)
    }

    /// Sum of `price * quantity` over all items
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |total, item| total.saturating_add(item.subtotal()))
    }

    /// Change the quantity of a contained item in place.
    ///
    /// The order is left untouched when the new quantity is invalid or would
    /// push the total out of range.
    pub fn change_item_quantity(&mut self, item_id: &str, quantity: i32) -> Result<(), OrderError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id() == item_id)
            .ok_or_else(|| OrderError::ItemNotFound(item_id.to_string()))?;

        let mut changed = self.items[index].clone();
        changed.change_quantity(quantity)?;

        let others = self
            .items
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, item)| item);
        Self::checked_sum(others.chain(std::iter::once(&changed)))?;

        self.items[index] = changed;
        Ok(())
    }

    fn checked_total(items: &[OrderItem]) -> Result<Decimal, OrderError> {
        Self::checked_sum(items.iter())
    }

    fn checked_sum<'a>(mut items: impl Iterator<Item = &'a OrderItem>) -> Result<Decimal, OrderError> {
        items.try_fold(Decimal::ZERO, |total, item| {
            total
                .checked_add(item.subtotal())
                .ok_or(OrderError::TotalOverflow)
        })
    }

    /// Validate business rules on the item sequence
    fn validate_items(items: &[OrderItem]) -> Result<(), OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        let mut seen = HashSet::with_capacity(items.len());
        for item in items {
            if !seen.insert(item.id()) {
                return Err(OrderError::DuplicateItem(item.id().to_string()));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: Decimal, quantity: i32) -> OrderItem {
        OrderItem::new(id, format!("Product {}", id), price, format!("p{}", id), quantity).unwrap()
    }

    #[test]
    fn test_order_creation() {
        let order = Order::new("123", "c1", vec![item("1", Decimal::from(10), 2)]).unwrap();

        assert_eq!(order.id(), "123");
        assert_eq!(order.customer_id(), "c1");
        assert_eq!(order.items().len(), 1);
    }

    #[test]
    fn test_empty_order_rejected() {
        assert_eq!(Order::new("123", "c1", vec![]), Err(OrderError::EmptyOrder));
    }

    #[test]
    fn test_duplicate_item_identity_rejected() {
        let result = Order::new(
            "123",
            "c1",
            vec![item("1", Decimal::from(10), 1), item("1", Decimal::from(20), 2)],
        );

        assert_eq!(result, Err(OrderError::DuplicateItem("1".to_string())));
    }

    #[test]
    fn test_total_is_sum_of_subtotals() {
        let order = Order::new(
            "123",
            "c1",
            vec![
                item("1", Decimal::new(1999, 2), 3),
                item("2", Decimal::new(5, 1), 1),
                item("3", Decimal::from(100), 2),
            ],
        )
        .unwrap();

        // 59.97 + 0.5 + 200
        assert_eq!(order.total(), Decimal::new(26047, 2));
    }

    #[test]
    fn test_total_independent_of_item_order() {
        let items = vec![
            item("1", Decimal::new(1, 1), 7),
            item("2", Decimal::new(2, 1), 3),
            item("3", Decimal::new(333, 2), 9),
        ];
        let mut reversed = items.clone();
        reversed.reverse();

        let forward = Order::new("a", "c1", items).unwrap();
        let backward = Order::new("a", "c1", reversed).unwrap();

        assert_eq!(forward.total(), backward.total());
    }

    #[test]
    fn test_change_item_quantity_recomputes_total() {
        let mut order = Order::new("123", "c1", vec![item("1", Decimal::from(10), 2)]).unwrap();
        assert_eq!(order.total(), Decimal::from(20));

        order.change_item_quantity("1", 5).unwrap();

        assert_eq!(order.item("1").unwrap().quantity(), 5);
        assert_eq!(order.total(), Decimal::from(50));
    }

    #[test]
    fn test_change_item_quantity_errors() {
        let mut order = Order::new("123", "c1", vec![item("1", Decimal::from(10), 2)]).unwrap();

        assert_eq!(
            order.change_item_quantity("9", 1),
            Err(OrderError::ItemNotFound("9".to_string()))
        );
        assert_eq!(
            order.change_item_quantity("1", -3),
            Err(OrderError::InvalidQuantity(-3))
        );
        assert_eq!(order.total(), Decimal::from(20));
    }

    #[test]
    fn test_unrepresentable_total_rejected() {
        let result = Order::new(
            "123",
            "c1",
            vec![item("1", Decimal::MAX, 1), item("2", Decimal::ONE, 1)],
        );

        assert_eq!(result, Err(OrderError::TotalOverflow));
    }

    #[test]
    fn test_total_at_upper_bound() {
        let order = Order::new("123", "c1", vec![item("1", Decimal::MAX, 1)]).unwrap();
        assert_eq!(order.total(), Decimal::MAX);
    }

    #[test]
    fn test_change_item_quantity_overflow_leaves_order_untouched() {
        let half = Decimal::MAX / Decimal::TWO;
        let mut order = Order::new(
            "123",
            "c1",
            vec![item("1", half, 1), item("2", Decimal::ONE, 1)],
        )
        .unwrap();
        let before = order.total();

        assert_eq!(
            order.change_item_quantity("1", 3),
            Err(OrderError::TotalOverflow)
        );
        assert_eq!(order.item("1").unwrap().quantity(), 1);
        assert_eq!(order.total(), before);
    }
}
