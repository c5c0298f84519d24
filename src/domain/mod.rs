// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each aggregate has its own subdirectory with its value objects, errors,
// aggregate root and repository. Storage mechanics stay in src/persistence/.
//
// ============================================================================

pub mod order;
