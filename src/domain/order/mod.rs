// ============================================================================
// Order Domain - Business Logic for Order Aggregate
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (OrderLine, OrderStatus, DeliveryAddress, Rating)
// - Order request (snapshot of a cart submitted at checkout)
// - Events (OrderPlaced, OrderCancelled, etc.)
// - Commands (PlaceOrder, CancelOrder, etc.)
// - Errors (OrderError enum)
// - Aggregate (Order with business logic)
// - Command Handler (OrderCommandHandler)
//
// ============================================================================

pub mod value_objects;
pub mod request;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use request::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
