use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::event_sourcing::{Aggregate, EventEnvelope, EventStore};

use super::aggregate::Order;
use super::commands::OrderCommand;
use super::errors::OrderError;
use super::events::OrderEvent;

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → Aggregate → Events → Event Store
//
// ============================================================================

pub struct OrderCommandHandler {
    event_store: Arc<EventStore<OrderEvent>>,
}

impl OrderCommandHandler {
    pub fn new(event_store: Arc<EventStore<OrderEvent>>) -> Self {
        Self { event_store }
    }

    /// Handle a command, persist resulting events and return the updated order
    #[instrument(skip(self, command), fields(command = command.name()))]
    pub async fn handle(
        &self,
        order_id: &str,
        command: OrderCommand,
        correlation_id: Uuid,
        user_id: Option<&str>,
    ) -> Result<Order, OrderError> {
        // Load current aggregate state
        let existing = self.load(order_id).await?;

        let (expected_version, domain_events) = match &existing {
            Some(order) => (order.version(), order.handle_command(&command)?),
            None => match &command {
                OrderCommand::PlaceOrder { .. } => (0, Order::decide_placement(&command)?),
                _ => return Err(OrderError::NotFound(order_id.to_string())),
            },
        };

        // Wrap in envelopes
        let mut envelopes = Vec::with_capacity(domain_events.len());
        let mut seq = expected_version;
        for domain_event in &domain_events {
            seq += 1;
            let mut envelope = EventEnvelope::new(
                order_id,
                seq,
                domain_event.event_type_name().to_string(),
                domain_event.clone(),
                correlation_id,
            );
            if let Some(user_id) = user_id {
                envelope = envelope.with_user(user_id);
            }
            envelopes.push(envelope);
        }

        let new_version = self
            .event_store
            .append_events(order_id, expected_version, envelopes)
            .await?;

        // Fold the new events into the state we already hold
        let mut events = domain_events.iter();
        let mut order = match existing {
            Some(order) => order,
            None => {
                let first = events.next().ok_or(OrderError::NotInitialized)?;
                Order::apply_first_event(first)?
            }
        };
        for event in events {
            order.apply_event(event)?;
        }
        order.set_version(new_version);

        tracing::debug!(
            order_id = %order_id,
            version = new_version,
            status = ?order.status,
            "Order command applied"
        );

        Ok(order)
    }

    /// Import an order's past events as-is, bypassing command validation.
    /// The events must still fold into a valid aggregate.
    pub async fn record_history(
        &self,
        order_id: &str,
        history: Vec<OrderEvent>,
    ) -> Result<Order, OrderError> {
        let correlation_id = Uuid::new_v4();
        let envelopes: Vec<_> = history
            .into_iter()
            .enumerate()
            .map(|(index, event)| {
                EventEnvelope::new(
                    order_id,
                    index as i64 + 1,
                    event.event_type_name().to_string(),
                    event,
                    correlation_id,
                )
                .with_metadata("source", "history")
            })
            .collect();

        let order = Order::load_from_events(envelopes.clone())?;
        self.event_store.append_events(order_id, 0, envelopes).await?;
        Ok(order)
    }

    pub async fn load(&self, order_id: &str) -> Result<Option<Order>, OrderError> {
        if !self.event_store.aggregate_exists(order_id).await {
            return Ok(None);
        }
        let order = self.event_store.load_aggregate::<Order>(order_id).await?;
        Ok(Some(order))
    }

    /// Every order, in the order they were placed
    pub async fn load_all(&self) -> Result<Vec<Order>, OrderError> {
        let mut orders = Vec::new();
        for order_id in self.event_store.aggregate_ids().await {
            orders.push(self.event_store.load_aggregate::<Order>(&order_id).await?);
        }
        Ok(orders)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{DeliveryAddress, OrderLine, OrderRequest, OrderStatus, Rating};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn handler() -> OrderCommandHandler {
        OrderCommandHandler::new(Arc::new(EventStore::new("Order")))
    }

    fn place(order_id: &str) -> OrderCommand {
        OrderCommand::PlaceOrder {
            order_id: order_id.to_string(),
            customer_id: "1".to_string(),
            request: OrderRequest::new(
                "2",
                vec![OrderLine {
                    id: "3".to_string(),
                    name: "Pizza Margherita".to_string(),
                    price: dec!(39.90),
                    quantity: 1,
                }],
                DeliveryAddress::from_line("Rua Augusta, 500"),
            )
            .unwrap(),
            delivery_fee: dec!(4.99),
            placed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_place_order_persists_events() {
        let handler = handler();
        let order = handler
            .handle("10", place("10"), Uuid::new_v4(), Some("1"))
            .await
            .unwrap();

        assert_eq!(order.version(), 1);
        assert_eq!(order.total, dec!(39.90));

        let reloaded = handler.load("10").await.unwrap().unwrap();
        assert_eq!(reloaded, order);
    }

    #[tokio::test]
    async fn test_command_on_unknown_order_is_not_found() {
        let handler = handler();
        let result = handler
            .handle(
                "99",
                OrderCommand::MarkDelivered { delivered_at: Utc::now() },
                Uuid::new_v4(),
                None,
            )
            .await;

        assert!(matches!(result, Err(OrderError::NotFound(id)) if id == "99"));
    }

    #[tokio::test]
    async fn test_place_twice_is_rejected() {
        let handler = handler();
        handler.handle("10", place("10"), Uuid::new_v4(), None).await.unwrap();

        let result = handler.handle("10", place("10"), Uuid::new_v4(), None).await;
        assert!(matches!(result, Err(OrderError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_lifecycle_increments_version() {
        let handler = handler();
        handler.handle("10", place("10"), Uuid::new_v4(), None).await.unwrap();
        handler
            .handle(
                "10",
                OrderCommand::CancelOrder {
                    reason: None,
                    cancelled_at: Utc::now(),
                },
                Uuid::new_v4(),
                None,
            )
            .await
            .unwrap();

        let order = handler.load("10").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.version(), 2);

        let rate = handler
            .handle(
                "10",
                OrderCommand::RateOrder {
                    rating: Rating::new(5).unwrap(),
                    comment: None,
                },
                Uuid::new_v4(),
                None,
            )
            .await;
        assert!(matches!(rate, Err(OrderError::CannotRateCancelled)));
    }

    #[tokio::test]
    async fn test_record_history_without_address() {
        use crate::domain::order::{OrderDelivered, OrderPlaced};

        let handler = handler();
        let placed_at = Utc::now();
        let order = handler
            .record_history(
                "1",
                vec![
                    OrderEvent::Placed(OrderPlaced {
                        order_id: "1".to_string(),
                        customer_id: "1".to_string(),
                        restaurant_id: "1".to_string(),
                        items: vec![],
                        total: dec!(71.80),
                        delivery_fee: dec!(5.99),
                        delivery_address: None,
                        placed_at,
                    }),
                    OrderEvent::Delivered(OrderDelivered { delivered_at: placed_at }),
                ],
            )
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.version(), 2);
        assert!(order.delivery_address.is_none());
        assert_eq!(handler.load("1").await.unwrap(), Some(order));
    }

    #[tokio::test]
    async fn test_record_history_rejects_invalid_fold() {
        use crate::domain::order::OrderDelivered;

        let handler = handler();
        let result = handler
            .record_history(
                "1",
                vec![OrderEvent::Delivered(OrderDelivered { delivered_at: Utc::now() })],
            )
            .await;
        assert!(result.is_err());
        assert!(handler.load("1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_history_for_existing_order_is_already_exists() {
        let handler = handler();
        let order = handler.handle("1", place("1"), Uuid::new_v4(), None).await.unwrap();

        let events = Order::decide_placement(&place("1")).unwrap();
        let result = handler.record_history("1", events).await;

        assert!(matches!(result, Err(OrderError::AlreadyExists(id)) if id == "1"));
        assert_eq!(handler.load("1").await.unwrap(), Some(order));
    }

    #[test]
    fn test_stale_version_becomes_concurrent_modification() {
        let conflict = crate::event_sourcing::ConcurrencyConflict {
            aggregate_type: "Order".to_string(),
            aggregate_id: "10".to_string(),
            expected: 1,
            current: 2,
        };

        let err = OrderError::from(anyhow::Error::from(conflict));
        assert!(matches!(err, OrderError::ConcurrentModification(id) if id == "10"));
        assert!(matches!(
            OrderError::from(anyhow::anyhow!("disk on fire")),
            OrderError::Store(_)
        ));
    }

    #[tokio::test]
    async fn test_racing_commands_never_surface_store_errors() {
        let handler = Arc::new(handler());
        handler.handle("10", place("10"), Uuid::new_v4(), None).await.unwrap();

        let start = |handler: Arc<OrderCommandHandler>| async move {
            handler
                .handle(
                    "10",
                    OrderCommand::StartPreparation { started_at: Utc::now() },
                    Uuid::new_v4(),
                    None,
                )
                .await
        };
        let (first, second) = tokio::join!(
            tokio::spawn(start(handler.clone())),
            tokio::spawn(start(handler.clone()))
        );

        let results = [first.unwrap(), second.unwrap()];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        for result in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(matches!(
                result,
                OrderError::ConcurrentModification(_) | OrderError::InvalidStatusTransition { .. }
            ));
        }
        assert_eq!(handler.load("10").await.unwrap().unwrap().version(), 2);
    }

    #[tokio::test]
    async fn test_load_all_keeps_placement_order() {
        let handler = handler();
        for id in ["2", "1", "3"] {
            handler.handle(id, place(id), Uuid::new_v4(), None).await.unwrap();
        }

        let ids: Vec<String> = handler
            .load_all()
            .await
            .unwrap()
            .into_iter()
            .map(|order| order.id)
            .collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }
}
