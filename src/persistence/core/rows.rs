use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::order::{Order, OrderItem};

use super::error::StorageError;

// ============================================================================
// Persisted Row Shapes
// ============================================================================
//
// Plain data as the record stores read and write it, plus the explicit
// mappings between rows and the domain types. Rows carry no invariants;
// going from a row back to a domain value re-runs the domain constructors.
//
// ============================================================================

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct OrderItemRow {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub product_id: String,
    pub quantity: i32,
    pub order_id: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct OrderRow {
    pub id: String,
    pub customer_id: String,
    /// Snapshot written at persistence time, never read back as authoritative
    pub total: Decimal,
    pub items: Vec<OrderItemRow>,
}

impl OrderItemRow {
    pub fn from_item(item: &OrderItem, order_id: &str) -> Self {
        Self {
            id: item.id().to_string(),
            name: item.name().to_string(),
            price: item.price(),
            product_id: item.product_id().to_string(),
            quantity: item.quantity(),
            order_id: order_id.to_string(),
        }
    }

    pub fn to_item(&self) -> Result<OrderItem, StorageError> {
        OrderItem::new(
            self.id.clone(),
            self.name.clone(),
            self.price,
            self.product_id.clone(),
            self.quantity,
        )
        .map_err(|e| {
            StorageError::CorruptRow(format!("order_items ({}, {}): {}", self.order_id, self.id, e))
        })
    }
}

impl OrderRow {
    /// Snapshot an aggregate, computing `total` now.
    pub fn from_order(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            customer_id: order.customer_id().to_string(),
            total: order.total(),
            items: order
                .items()
                .iter()
                .map(|item| OrderItemRow::from_item(item, order.id()))
                .collect(),
        }
    }

    /// Build a fresh aggregate from the row and its expanded items, in row order.
    pub fn to_order(&self) -> Result<Order, StorageError> {
        let items = self
            .items
            .iter()
            .map(OrderItemRow::to_item)
            .collect::<Result<Vec<_>, _>>()?;

        Order::new(self.id.clone(), self.customer_id.clone(), items)
            .map_err(|e| StorageError::CorruptRow(format!("orders ({}): {}", self.id, e)))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        Order::new(
            "123",
            "c1",
            vec![
                OrderItem::new("1", "Product 1", Decimal::from(10), "p1", 2).unwrap(),
                OrderItem::new("2", "Product 2", Decimal::new(2550, 2), "p2", 1).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_order_row_snapshot() {
        let row = OrderRow::from_order(&order());

        assert_eq!(row.id, "123");
        assert_eq!(row.customer_id, "c1");
        assert_eq!(row.total, Decimal::new(4550, 2));
        assert_eq!(row.items.len(), 2);
        assert!(row.items.iter().all(|item| item.order_id == "123"));
        assert_eq!(row.items[1].product_id, "p2");
    }

    #[test]
    fn test_order_row_reconstruction() {
        let original = order();
        let rebuilt = OrderRow::from_order(&original).to_order().unwrap();

        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_reconstruction_ignores_stored_total() {
        let mut row = OrderRow::from_order(&order());
        row.total = Decimal::from(999);

        let rebuilt = row.to_order().unwrap();

        assert_eq!(rebuilt.total(), Decimal::new(4550, 2));
    }

    #[test]
    fn test_corrupt_item_row() {
        let mut row = OrderRow::from_order(&order());
        row.items[0].quantity = 0;

        let err = row.to_order().unwrap_err();
        assert!(matches!(err, StorageError::CorruptRow(_)));
    }

    #[test]
    fn test_order_row_without_items_is_corrupt() {
        let mut row = OrderRow::from_order(&order());
        row.items.clear();

        let err = row.to_order().unwrap_err();
        assert!(matches!(err, StorageError::CorruptRow(_)));
    }
}
