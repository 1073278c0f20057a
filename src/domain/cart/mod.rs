// ============================================================================
// Cart Domain - Single-Restaurant Shopping Cart
// ============================================================================
//
// This module contains ALL Cart-specific code:
// - Value objects (MenuItem, CartLineItem, RestaurantRef, AddOutcome)
// - Errors (CartError enum)
// - Aggregate (Cart with the single-restaurant invariant)
//
// The cart is held in memory by the session that presents it. It is not
// event-sourced and never persisted.
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod aggregate;

// Re-export for convenience
pub use value_objects::*;
pub use errors::*;
pub use aggregate::*;
