use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::value_objects::{DeliveryAddress, OrderLine, Rating};
use crate::event_sourcing::DomainEvent;

// ============================================================================
// Order Events - Domain Events for Order Aggregate
// ============================================================================

/// Order Event - Union type for all order events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    Placed(OrderPlaced),
    PreparationStarted(OrderPreparationStarted),
    Delivered(OrderDelivered),
    Cancelled(OrderCancelled),
    Rated(OrderRated),
}

impl OrderEvent {
    pub fn event_type_name(&self) -> &'static str {
        match self {
            OrderEvent::Placed(_) => OrderPlaced::event_type(),
            OrderEvent::PreparationStarted(_) => OrderPreparationStarted::event_type(),
            OrderEvent::Delivered(_) => OrderDelivered::event_type(),
            OrderEvent::Cancelled(_) => OrderCancelled::event_type(),
            OrderEvent::Rated(_) => OrderRated::event_type(),
        }
    }
}

impl DomainEvent for OrderEvent {
    fn event_type() -> &'static str { "OrderEvent" }
}

// ============================================================================
// Individual Event Types
// ============================================================================

/// Order Placed - Initial event in order lifecycle
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderPlaced {
    pub order_id: String,
    pub customer_id: String,
    pub restaurant_id: String,
    pub items: Vec<OrderLine>,
    pub total: Decimal,
    pub delivery_fee: Decimal,
    #[serde(default)]
    pub delivery_address: Option<DeliveryAddress>,
    pub placed_at: DateTime<Utc>,
}

impl DomainEvent for OrderPlaced {
    fn event_type() -> &'static str { "OrderPlaced" }
}

/// Kitchen accepted the order
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderPreparationStarted {
    pub started_at: DateTime<Utc>,
}

impl DomainEvent for OrderPreparationStarted {
    fn event_type() -> &'static str { "OrderPreparationStarted" }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderDelivered {
    pub delivered_at: DateTime<Utc>,
}

impl DomainEvent for OrderDelivered {
    fn event_type() -> &'static str { "OrderDelivered" }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderCancelled {
    pub reason: Option<String>,
    pub cancelled_at: DateTime<Utc>,
}

impl DomainEvent for OrderCancelled {
    fn event_type() -> &'static str { "OrderCancelled" }
}

/// Customer feedback; a later rating replaces an earlier one
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderRated {
    pub rating: Rating,
    pub comment: Option<String>,
}

impl DomainEvent for OrderRated {
    fn event_type() -> &'static str { "OrderRated" }
}
