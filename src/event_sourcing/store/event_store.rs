use std::collections::HashMap;
use std::marker::PhantomData;

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::event_sourcing::core::{
    Aggregate, DomainEvent, EventEnvelope, deserialize_event, serialize_event,
};

// ============================================================================
// Generic Event Store - Repository for Events
// ============================================================================
//
// In-memory, append-only event log. Works with ANY event type.
//
// Responsibilities:
// 1. Append events per aggregate (append-only)
// 2. Load event history for aggregates
// 3. Ensure optimistic concurrency control
// 4. Remember the order in which aggregates were first written
//
// Event payloads are stored serialized, the same way a database row would
// hold them, and deserialized on load.
//
// ============================================================================

/// `append_events` was given a stale `expected_version`. Returned inside the
/// `anyhow::Error`; callers recover it with `downcast`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Concurrency conflict on {aggregate_type} {aggregate_id}: expected version {expected}, but current is {current}"
)]
pub struct ConcurrencyConflict {
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub expected: i64,
    pub current: i64,
}

/// A persisted row of the event log
#[derive(Debug, Clone)]
struct StoredEvent {
    event_id: Uuid,
    sequence_number: i64,
    event_type: String,
    event_version: i32,
    event_json: String,
    correlation_id: Uuid,
    user_id: Option<String>,
    timestamp: DateTime<Utc>,
    metadata: HashMap<String, String>,
}

#[derive(Default)]
struct Streams {
    by_aggregate: HashMap<String, Vec<StoredEvent>>,
    creation_order: Vec<String>,
}

pub struct EventStore<E: DomainEvent> {
    streams: RwLock<Streams>,
    aggregate_type_name: String,
    _phantom: PhantomData<E>,
}

impl<E: DomainEvent> EventStore<E> {
    pub fn new(aggregate_type_name: &str) -> Self {
        Self {
            streams: RwLock::new(Streams::default()),
            aggregate_type_name: aggregate_type_name.to_string(),
            _phantom: PhantomData,
        }
    }

    pub fn aggregate_type_name(&self) -> &str {
        &self.aggregate_type_name
    }

    /// Append events to the event store
    /// Returns the new version number after appending
    pub async fn append_events(
        &self,
        aggregate_id: &str,
        expected_version: i64,
        events: Vec<EventEnvelope<E>>,
    ) -> Result<i64> {
        if events.is_empty() {
            bail!("Cannot append empty event list");
        }

        // Serialize before taking the lock
        let mut rows = Vec::with_capacity(events.len());
        for envelope in &events {
            rows.push(StoredEvent {
                event_id: envelope.event_id,
                sequence_number: envelope.sequence_number,
                event_type: envelope.event_type.clone(),
                event_version: envelope.event_version,
                event_json: serialize_event(&envelope.event_data)?,
                correlation_id: envelope.correlation_id,
                user_id: envelope.user_id.clone(),
                timestamp: envelope.timestamp,
                metadata: envelope.metadata.clone(),
            });
        }

        let mut streams = self.streams.write().await;

        let current_version = streams
            .by_aggregate
            .get(aggregate_id)
            .and_then(|stream| stream.last())
            .map_or(0, |row| row.sequence_number);

        if current_version != expected_version {
            return Err(ConcurrencyConflict {
                aggregate_type: self.aggregate_type_name.clone(),
                aggregate_id: aggregate_id.to_string(),
                expected: expected_version,
                current: current_version,
            }
            .into());
        }

        let mut new_version = expected_version;
        for row in &mut rows {
            new_version += 1;
            if row.sequence_number != new_version {
                tracing::debug!(
                    aggregate_id = %aggregate_id,
                    given = row.sequence_number,
                    assigned = new_version,
                    "Renumbering event sequence"
                );
                row.sequence_number = new_version;
            }
        }

        if !streams.by_aggregate.contains_key(aggregate_id) {
            streams.creation_order.push(aggregate_id.to_string());
        }
        streams
            .by_aggregate
            .entry(aggregate_id.to_string())
            .or_default()
            .extend(rows);

        tracing::debug!(
            aggregate_id = %aggregate_id,
            aggregate_type = %self.aggregate_type_name,
            new_version = new_version,
            event_count = events.len(),
            "Appended events to event store"
        );

        Ok(new_version)
    }

    /// Load all events for an aggregate, oldest first
    pub async fn load_events(&self, aggregate_id: &str) -> Result<Vec<EventEnvelope<E>>> {
        let streams = self.streams.read().await;

        let Some(stream) = streams.by_aggregate.get(aggregate_id) else {
            return Ok(Vec::new());
        };

        let mut events = Vec::with_capacity(stream.len());
        for row in stream {
            let event_data: E = deserialize_event(&row.event_json)?;
            events.push(EventEnvelope {
                event_id: row.event_id,
                aggregate_id: aggregate_id.to_string(),
                sequence_number: row.sequence_number,
                event_type: row.event_type.clone(),
                event_version: row.event_version,
                event_data,
                correlation_id: row.correlation_id,
                user_id: row.user_id.clone(),
                timestamp: row.timestamp,
                metadata: row.metadata.clone(),
            });
        }

        Ok(events)
    }

    /// Get current version of aggregate (0 when it has no events)
    pub async fn get_current_version(&self, aggregate_id: &str) -> i64 {
        self.streams
            .read()
            .await
            .by_aggregate
            .get(aggregate_id)
            .and_then(|stream| stream.last())
            .map_or(0, |row| row.sequence_number)
    }

    /// Load aggregate from events
    pub async fn load_aggregate<A>(&self, aggregate_id: &str) -> Result<A>
    where
        A: Aggregate<Event = E>,
        <A as Aggregate>::Error: std::fmt::Display,
    {
        let events = self.load_events(aggregate_id).await?;

        if events.is_empty() {
            bail!("Aggregate not found: {}", aggregate_id);
        }

        A::load_from_events(events)
    }

    pub async fn aggregate_exists(&self, aggregate_id: &str) -> bool {
        self.get_current_version(aggregate_id).await > 0
    }

    /// Ids of every aggregate in the order they were first written
    pub async fn aggregate_ids(&self) -> Vec<String> {
        self.streams.read().await.creation_order.clone()
    }

    pub async fn event_count(&self) -> usize {
        self.streams
            .read()
            .await
            .by_aggregate
            .values()
            .map(Vec::len)
            .sum()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
