use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::event_sourcing::Aggregate;
use super::commands::OrderCommand;
use super::errors::OrderError;
use super::events::*;
use super::value_objects::{DeliveryAddress, OrderLine, OrderStatus, Rating};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================
//
// Lifecycle:
//   PENDING -> IN_PROGRESS -> DELIVERED
//   PENDING | IN_PROGRESS -> CANCELLED
//
// Ratings may be left on any order that was not cancelled.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    // Identity
    pub id: String,
    #[serde(skip)]
    pub version: i64,

    // Current State (derived from events)
    pub customer_id: String,
    pub restaurant_id: String,
    pub items: Vec<OrderLine>,
    pub status: OrderStatus,
    /// Sum of line subtotals, excluding delivery
    pub total: Decimal,
    pub delivery_fee: Decimal,
    /// Absent on orders imported from history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<DeliveryAddress>,

    // Audit Trail
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,

    // Feedback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Order {
    /// What the customer pays: items plus delivery. Placement already
    /// checked that the sum fits.
    pub fn grand_total(&self) -> Decimal {
        self.total.saturating_add(self.delivery_fee)
    }

    /// Validate a `PlaceOrder` command for an order that does not exist yet
    pub fn decide_placement(command: &OrderCommand) -> Result<Vec<OrderEvent>, OrderError> {
        match command {
            OrderCommand::PlaceOrder {
                order_id,
                customer_id,
                request,
                delivery_fee,
                placed_at,
            } => {
                request.validate()?;
                let total = request.subtotal()?;
                total
                    .checked_add(*delivery_fee)
                    .ok_or(OrderError::AmountOverflow)?;

                Ok(vec![OrderEvent::Placed(OrderPlaced {
                    order_id: order_id.clone(),
                    customer_id: customer_id.clone(),
                    restaurant_id: request.restaurant_id.clone(),
                    items: request.items.clone(),
                    total,
                    delivery_fee: *delivery_fee,
                    delivery_address: Some(request.delivery_address.clone()),
                    placed_at: *placed_at,
                })])
            }
            _ => Err(OrderError::NotInitialized),
        }
    }

    fn refuse_if_cancelled(&self) -> Result<(), OrderError> {
        if self.status == OrderStatus::Cancelled {
            return Err(OrderError::AlreadyCancelled);
        }
        Ok(())
    }
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for Order {
    type Event = OrderEvent;
    type Command = OrderCommand;
    type Error = OrderError;

    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            OrderEvent::Placed(e) => Ok(Self {
                id: e.order_id.clone(),
                version: 0,
                customer_id: e.customer_id.clone(),
                restaurant_id: e.restaurant_id.clone(),
                items: e.items.clone(),
                status: OrderStatus::Pending,
                total: e.total,
                delivery_fee: e.delivery_fee,
                delivery_address: e.delivery_address.clone(),
                created_at: e.placed_at,
                delivered_at: None,
                cancelled_at: None,
                cancel_reason: None,
                rating: None,
                comment: None,
            }),
            _ => Err(OrderError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            OrderEvent::Placed(_) => Err(OrderError::AlreadyExists(self.id.clone())),
            OrderEvent::PreparationStarted(_) => {
                self.status = OrderStatus::InProgress;
                Ok(())
            }
            OrderEvent::Delivered(e) => {
                self.status = OrderStatus::Delivered;
                self.delivered_at = Some(e.delivered_at);
                Ok(())
            }
            OrderEvent::Cancelled(e) => {
                self.status = OrderStatus::Cancelled;
                self.cancelled_at = Some(e.cancelled_at);
                self.cancel_reason = e.reason.clone();
                Ok(())
            }
            OrderEvent::Rated(e) => {
                self.rating = Some(e.rating);
                self.comment = e.comment.clone();
                Ok(())
            }
        }
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::PlaceOrder { .. } => Err(OrderError::AlreadyExists(self.id.clone())),

            OrderCommand::StartPreparation { started_at } => {
                self.refuse_if_cancelled()?;
                if self.status != OrderStatus::Pending {
                    return Err(OrderError::InvalidStatusTransition {
                        from: self.status,
                        action: "start preparing",
                    });
                }

                Ok(vec![OrderEvent::PreparationStarted(OrderPreparationStarted {
                    started_at: *started_at,
                })])
            }

            OrderCommand::MarkDelivered { delivered_at } => {
                self.refuse_if_cancelled()?;
                if !self.status.is_open() {
                    return Err(OrderError::InvalidStatusTransition {
                        from: self.status,
                        action: "deliver",
                    });
                }

                Ok(vec![OrderEvent::Delivered(OrderDelivered {
                    delivered_at: *delivered_at,
                })])
            }

            OrderCommand::CancelOrder { reason, cancelled_at } => {
                self.refuse_if_cancelled()?;
                if self.status == OrderStatus::Delivered {
                    return Err(OrderError::InvalidStatusTransition {
                        from: self.status,
                        action: "cancel",
                    });
                }

                Ok(vec![OrderEvent::Cancelled(OrderCancelled {
                    reason: reason.clone(),
                    cancelled_at: *cancelled_at,
                })])
            }

            OrderCommand::RateOrder { rating, comment } => {
                if self.status == OrderStatus::Cancelled {
                    return Err(OrderError::CannotRateCancelled);
                }

                Ok(vec![OrderEvent::Rated(OrderRated {
                    rating: *rating,
                    comment: comment.clone(),
                })])
            }
        }
    }

    fn aggregate_id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
