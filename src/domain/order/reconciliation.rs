use std::collections::{HashMap, HashSet};

use super::value_objects::OrderItem;

// ============================================================================
// Item Reconciliation
// ============================================================================
//
// Diffs the items persisted for an order against the items the caller wants
// persisted, matching on item identity only:
//
//   desired id not saved        -> create (desired value)
//   saved id still desired      -> update (desired value, overwrites row)
//   saved id no longer desired  -> delete (saved value)
//
// The three sets never share an identity, so they can be applied in any
// order or concurrently.
//
// ============================================================================

/// Operations that turn the saved item set into the desired one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemChangeSet {
    /// In desired order
    pub to_create: Vec<OrderItem>,
    /// In saved order
    pub to_update: Vec<OrderItem>,
    /// In saved order
    pub to_delete: Vec<OrderItem>,
}

impl ItemChangeSet {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// Number of item statements this change set issues
    pub fn len(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }
}

pub fn reconcile(saved: &[OrderItem], desired: &[OrderItem]) -> ItemChangeSet {
    let saved_ids: HashSet<&str> = saved.iter().map(OrderItem::id).collect();
    let desired_by_id: HashMap<&str, &OrderItem> =
        desired.iter().map(|item| (item.id(), item)).collect();

    let to_create = desired
        .iter()
        .filter(|item| !saved_ids.contains(item.id()))
        .cloned()
        .collect();

    let mut to_update = Vec::new();
    let mut to_delete = Vec::new();
    for saved_item in saved {
        match desired_by_id.get(saved_item.id()) {
            Some(desired_item) => to_update.push((*desired_item).clone()),
            None => to_delete.push(saved_item.clone()),
        }
    }

    ItemChangeSet {
        to_create,
        to_update,
        to_delete,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn item(id: &str, quantity: i32) -> OrderItem {
        OrderItem::new(id, format!("Product {}", id), Decimal::from(10), format!("p{}", id), quantity)
            .unwrap()
    }

    fn ids(items: &[OrderItem]) -> Vec<&str> {
        items.iter().map(OrderItem::id).collect()
    }

    #[test]
    fn test_create_update_delete_classification() {
        let saved = vec![item("1", 2), item("2", 1)];
        let desired = vec![item("2", 3), item("3", 3)];

        let changes = reconcile(&saved, &desired);

        assert_eq!(ids(&changes.to_create), vec!["3"]);
        assert_eq!(ids(&changes.to_update), vec!["2"]);
        assert_eq!(changes.to_update[0].quantity(), 3);
        assert_eq!(ids(&changes.to_delete), vec!["1"]);
        assert_eq!(changes.to_delete[0].quantity(), 2);
        assert_eq!(changes.len(), 3);
    }

    #[test]
    fn test_update_carries_desired_fields() {
        let saved = vec![item("1", 2)];
        let desired =
            vec![OrderItem::new("1", "Renamed", Decimal::new(1250, 2), "p9", 4).unwrap()];

        let changes = reconcile(&saved, &desired);

        assert!(changes.to_create.is_empty());
        assert!(changes.to_delete.is_empty());
        assert_eq!(changes.to_update, desired);
    }

    #[test]
    fn test_unchanged_item_is_still_an_update() {
        let saved = vec![item("1", 2)];
        let changes = reconcile(&saved, &saved);

        assert_eq!(changes.to_update, saved);
        assert!(changes.to_create.is_empty());
        assert!(changes.to_delete.is_empty());
    }

    #[test]
    fn test_disjoint_sets_replace_everything() {
        let saved = vec![item("1", 2)];
        let desired = vec![item("2", 1), item("3", 3)];

        let changes = reconcile(&saved, &desired);

        assert_eq!(ids(&changes.to_create), vec!["2", "3"]);
        assert!(changes.to_update.is_empty());
        assert_eq!(ids(&changes.to_delete), vec!["1"]);
    }

    #[test]
    fn test_empty_saved_creates_everything() {
        let desired = vec![item("1", 1), item("2", 2)];

        let changes = reconcile(&[], &desired);

        assert_eq!(changes.to_create, desired);
        assert!(changes.to_update.is_empty());
        assert!(changes.to_delete.is_empty());
    }

    #[test]
    fn test_reconciliation_is_idempotent() {
        let saved = vec![item("1", 2), item("2", 1), item("4", 7)];
        let desired = vec![item("2", 5), item("3", 3), item("4", 7)];

        let first = reconcile(&saved, &desired);
        assert!(!first.is_empty());

        // After applying the first pass the store holds exactly `desired`
        let second = reconcile(&desired, &desired);

        assert!(second.to_create.is_empty());
        assert!(second.to_delete.is_empty());
        assert_eq!(second.to_update, desired);
    }

    #[test]
    fn test_sets_are_disjoint() {
        let saved = vec![item("1", 1), item("2", 1), item("3", 1)];
        let desired = vec![item("3", 2), item("4", 1), item("5", 1), item("1", 9)];

        let changes = reconcile(&saved, &desired);

        let mut all: Vec<&str> = Vec::new();
        all.extend(ids(&changes.to_create));
        all.extend(ids(&changes.to_update));
        all.extend(ids(&changes.to_delete));
        let unique: HashSet<&str> = all.iter().copied().collect();

        assert_eq!(all.len(), unique.len());
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn test_empty_change_set() {
        let changes = ItemChangeSet::default();
        assert!(changes.is_empty());
        assert_eq!(changes.len(), 0);
    }
}
