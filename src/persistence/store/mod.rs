// ============================================================================
// Record Store Backends
// ============================================================================

pub mod sqlite;

pub use sqlite::{SqliteOrderStore, SqliteScope};
