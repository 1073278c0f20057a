use rust_decimal::Decimal;

// ============================================================================
// Cart Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CartError {
    #[error("Item id cannot be empty")]
    EmptyItemId,

    #[error("Restaurant id cannot be empty")]
    EmptyRestaurantId,

    #[error("Item {item_id} has a negative price: {price}")]
    NegativePrice { item_id: String, price: Decimal },

    #[error("Item {item_id} costs {price}, above the {max} limit")]
    PriceTooHigh {
        item_id: String,
        price: Decimal,
        max: Decimal,
    },
}
