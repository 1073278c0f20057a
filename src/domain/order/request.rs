use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::OrderError;
use super::value_objects::{DeliveryAddress, OrderLine};
use crate::domain::cart::Cart;

// ============================================================================
// Order Request - what the client submits at checkout
// ============================================================================

/// Immutable snapshot of a cart handed to the ordering service.
///
/// Building one never touches the cart; clearing the cart after a successful
/// submission is the caller's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub restaurant_id: String,
    pub items: Vec<OrderLine>,
    pub delivery_address: DeliveryAddress,
}

impl OrderRequest {
    pub fn new(
        restaurant_id: impl Into<String>,
        items: Vec<OrderLine>,
        delivery_address: DeliveryAddress,
    ) -> Result<Self, OrderError> {
        let request = Self {
            restaurant_id: restaurant_id.into(),
            items,
            delivery_address,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn from_cart(cart: &Cart, delivery_address: DeliveryAddress) -> Result<Self, OrderError> {
        let restaurant = cart.restaurant().ok_or(OrderError::EmptyItems)?;
        let items = cart.lines().iter().map(OrderLine::from).collect();
        Self::new(restaurant.id.clone(), items, delivery_address)
    }

    /// Checks the rules a request must satisfy before an order is placed.
    /// Requests arriving over the wire are validated again by the backend.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.restaurant_id.trim().is_empty() {
            return Err(OrderError::MissingRestaurant);
        }
        if self.items.is_empty() {
            return Err(OrderError::EmptyItems);
        }
        if self.delivery_address.is_blank() {
            return Err(OrderError::MissingAddress);
        }

        let mut seen = HashSet::with_capacity(self.items.len());
        for line in &self.items {
            if line.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    item_id: line.id.clone(),
                    quantity: line.quantity,
                });
            }
            if line.price < Decimal::ZERO {
                return Err(OrderError::NegativePrice(line.id.clone()));
            }
            if !seen.insert(line.id.as_str()) {
                return Err(OrderError::DuplicateItem(line.id.clone()));
            }
        }

        self.subtotal().map(|_| ())
    }

    /// Sum of line subtotals, excluding delivery. Prices come from the
    /// client, so the arithmetic is checked.
    pub fn subtotal(&self) -> Result<Decimal, OrderError> {
        self.items.iter().try_fold(Decimal::ZERO, |sum, line| {
            line.subtotal()
                .and_then(|subtotal| sum.checked_add(subtotal))
                .ok_or(OrderError::AmountOverflow)
        })
    }
}
