// ============================================================================
// Persistence Core - Storage Abstractions
// ============================================================================
//
// Backend-neutral pieces: the record store and atomic scope traits, the
// persisted row shapes and their mapping to domain types, and the storage
// error type. Nothing here knows which database sits underneath.
//
// ============================================================================

pub mod error;
pub mod rows;
pub mod record_store;

pub use error::StorageError;
pub use rows::{OrderItemRow, OrderRow};
pub use record_store::{AtomicScope, OrderItemRecordStore, OrderRecordStore};
