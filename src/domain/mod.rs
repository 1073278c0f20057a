// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each domain has its own subdirectory:
// - cart/  - in-memory shopping cart bound to a single restaurant
// - order/ - event-sourced order lifecycle plus the order request built at checkout
//
// This layer knows nothing about HTTP, metrics or client state.
//
// ============================================================================

pub mod cart;
pub mod order;
