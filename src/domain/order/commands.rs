use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::request::OrderRequest;
use super::value_objects::Rating;

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum OrderCommand {
    PlaceOrder {
        order_id: String,
        customer_id: String,
        request: OrderRequest,
        delivery_fee: Decimal,
        placed_at: DateTime<Utc>,
    },
    StartPreparation {
        started_at: DateTime<Utc>,
    },
    MarkDelivered {
        delivered_at: DateTime<Utc>,
    },
    CancelOrder {
        reason: Option<String>,
        cancelled_at: DateTime<Utc>,
    },
    RateOrder {
        rating: Rating,
        comment: Option<String>,
    },
}

impl OrderCommand {
    pub fn name(&self) -> &'static str {
        match self {
            OrderCommand::PlaceOrder { .. } => "PlaceOrder",
            OrderCommand::StartPreparation { .. } => "StartPreparation",
            OrderCommand::MarkDelivered { .. } => "MarkDelivered",
            OrderCommand::CancelOrder { .. } => "CancelOrder",
            OrderCommand::RateOrder { .. } => "RateOrder",
        }
    }
}
