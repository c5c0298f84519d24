use async_trait::async_trait;
use rust_decimal::Decimal;

use super::error::StorageError;
use super::rows::{OrderItemRow, OrderRow};

// ============================================================================
// Record Store Seams
// ============================================================================
//
// The repository only talks to storage through these traits. A backend
// implements all three with one shared `Scope` type, so every mutating
// statement of a repository call can run inside the same atomic scope.
//
// ============================================================================

/// Transactional scope primitive.
///
/// `commit` and `rollback` consume the scope, so exactly one of them ends it.
/// Statements borrow the scope shared (`&Scope`); a backend must allow several
/// of them to be in flight at once.
#[async_trait]
pub trait AtomicScope: Send + Sync {
    type Scope: Send + Sync;

    async fn begin(&self) -> Result<Self::Scope, StorageError>;

    async fn commit(&self, scope: Self::Scope) -> Result<(), StorageError>;

    async fn rollback(&self, scope: Self::Scope) -> Result<(), StorageError>;
}

/// Item rows, keyed by `(order_id, id)`.
#[async_trait]
pub trait OrderItemRecordStore: AtomicScope {
    /// Items of one order, in stored row order
    async fn find_items_by_order(
        &self,
        scope: &Self::Scope,
        order_id: &str,
    ) -> Result<Vec<OrderItemRow>, StorageError>;

    /// Fails with `DuplicateKey` if the item already exists for its order
    async fn insert_item(&self, scope: &Self::Scope, row: &OrderItemRow) -> Result<(), StorageError>;

    /// Overwrites every field of the row; no-op if absent
    async fn update_item(&self, scope: &Self::Scope, row: &OrderItemRow) -> Result<(), StorageError>;

    /// No-op if absent
    async fn delete_item(
        &self,
        scope: &Self::Scope,
        order_id: &str,
        item_id: &str,
    ) -> Result<(), StorageError>;
}

/// Order rows with their nested item rows.
#[async_trait]
pub trait OrderRecordStore: AtomicScope {
    /// Inserts the order row and all of `row.items`.
    /// Fails with `DuplicateKey` if the order id already exists.
    async fn insert_order(&self, scope: &Self::Scope, row: &OrderRow) -> Result<(), StorageError>;

    async fn order_exists(&self, scope: &Self::Scope, order_id: &str) -> Result<bool, StorageError>;

    /// Rewrites the scalar fields only; items are untouched
    async fn update_order_fields(
        &self,
        scope: &Self::Scope,
        order_id: &str,
        customer_id: &str,
        total: Decimal,
    ) -> Result<(), StorageError>;

    async fn find_order(&self, order_id: &str) -> Result<Option<OrderRow>, StorageError>;

    /// Every order with items expanded, in insertion order
    async fn scan_orders(&self) -> Result<Vec<OrderRow>, StorageError>;
}
