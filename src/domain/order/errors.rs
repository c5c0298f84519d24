use rust_decimal::Decimal;

use crate::persistence::StorageError;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum OrderError {
    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Invalid item price: {0}")]
    InvalidPrice(Decimal),

    #[error("Order items cannot be empty")]
    EmptyOrder,

    #[error("Item appears more than once in order: {0}")]
    DuplicateItem(String),

    #[error("Item not found in order: {0}")]
    ItemNotFound(String),

    #[error("Order amount exceeds the representable range")]
    TotalOverflow,
}

// ============================================================================
// Order Repository Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Order already exists: {0}")]
    DuplicateOrder(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}
