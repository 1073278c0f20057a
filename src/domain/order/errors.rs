use super::value_objects::OrderStatus;
use crate::event_sourcing::ConcurrencyConflict;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Order already exists: {0}")]
    AlreadyExists(String),

    #[error("Order is already cancelled")]
    AlreadyCancelled,

    #[error("Cannot {action} an order in status {from:?}")]
    InvalidStatusTransition { from: OrderStatus, action: &'static str },

    #[error("Cancelled orders cannot be rated")]
    CannotRateCancelled,

    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Invalid quantity {quantity} for item {item_id}")]
    InvalidQuantity { item_id: String, quantity: u32 },

    #[error("Item {0} has a negative price")]
    NegativePrice(String),

    #[error("Item {0} appears more than once")]
    DuplicateItem(String),

    #[error("Order must name a restaurant")]
    MissingRestaurant,

    #[error("Delivery address cannot be empty")]
    MissingAddress,

    #[error("Order amount is too large")]
    AmountOverflow,

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Order {0} was changed by another request, please retry")]
    ConcurrentModification(String),

    #[error("Aggregate not initialized")]
    NotInitialized,

    #[error(transparent)]
    Store(anyhow::Error),
}

/// Lost optimistic-concurrency races become typed errors: a stream that
/// appeared under a brand-new order means the id is taken.
impl From<anyhow::Error> for OrderError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ConcurrencyConflict>() {
            Ok(conflict) if conflict.expected == 0 => OrderError::AlreadyExists(conflict.aggregate_id),
            Ok(conflict) => OrderError::ConcurrentModification(conflict.aggregate_id),
            Err(err) => OrderError::Store(err),
        }
    }
}
