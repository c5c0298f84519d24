// ============================================================================
// Order Domain - Sales Order Aggregate and its Persistence
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (OrderItem)
// - Aggregate (Order)
// - Errors (OrderError, RepositoryError)
// - Reconciliation (saved items vs desired items)
// - Repository (OrderRepository)
//
// Storage backends live in src/persistence/.
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod aggregate;
pub mod reconciliation;
pub mod repository;

// Re-export for convenience
pub use value_objects::*;
pub use errors::*;
pub use aggregate::*;
pub use reconciliation::*;
pub use repository::*;
