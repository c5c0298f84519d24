// ============================================================================
// Persistence Infrastructure
// ============================================================================
//
// Record stores for orders and their items. Domain-specific orchestration
// lives in src/domain/order/repository.rs.
//
// ============================================================================

mod core;
mod store;

pub use self::core::*;
pub use self::store::*;
