// Private module declaration
mod server;

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order lifecycle (placed, cancelled, rated, order value)
// - Authentication attempts and outcomes
// - API errors by kind
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Order Metrics
    pub orders_placed: IntCounter,
    pub orders_cancelled: IntCounter,
    pub orders_rated: IntCounter,
    pub order_value: Histogram,

    // Auth Metrics
    pub auth_attempts: IntCounterVec,

    // API Metrics
    pub http_errors: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Order Metrics
        let orders_placed = IntCounter::new("orders_placed_total", "Total orders placed")?;
        registry.register(Box::new(orders_placed.clone()))?;

        let orders_cancelled = IntCounter::new("orders_cancelled_total", "Total orders cancelled")?;
        registry.register(Box::new(orders_cancelled.clone()))?;

        let orders_rated = IntCounter::new("orders_rated_total", "Total ratings left on orders")?;
        registry.register(Box::new(orders_rated.clone()))?;

        let order_value = Histogram::with_opts(
            HistogramOpts::new("order_value", "Order total including delivery fee")
                .buckets(vec![10.0, 25.0, 50.0, 100.0, 200.0, 500.0]),
        )?;
        registry.register(Box::new(order_value.clone()))?;

        // Auth Metrics
        let auth_attempts = IntCounterVec::new(
            Opts::new("auth_attempts_total", "Authentication attempts"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(auth_attempts.clone()))?;

        // API Metrics
        let http_errors = IntCounterVec::new(
            Opts::new("http_errors_total", "Error responses returned by the API"),
            &["kind"],
        )?;
        registry.register(Box::new(http_errors.clone()))?;

        Ok(Self {
            registry,
            orders_placed,
            orders_cancelled,
            orders_rated,
            order_value,
            auth_attempts,
            http_errors,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_order_placed(&self, grand_total: Decimal) {
        self.orders_placed.inc();
        self.order_value.observe(grand_total.to_f64().unwrap_or_default());
    }

    pub fn record_order_cancelled(&self) {
        self.orders_cancelled.inc();
    }

    pub fn record_order_rated(&self) {
        self.orders_rated.inc();
    }

    /// `operation` is login/register/logout
    pub fn record_auth_attempt(&self, operation: &str, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.auth_attempts.with_label_values(&[operation, outcome]).inc();
    }

    pub fn record_http_error(&self, kind: &str) {
        self.http_errors.with_label_values(&[kind]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(metrics.registry.gather().len() >= 4);
    }

    #[test]
    fn test_record_order_placed() {
        let metrics = Metrics::new().unwrap();
        metrics.record_order_placed(dec!(120.69));

        let gathered = metrics.registry.gather();
        let placed = gathered.iter().find(|m| m.name() == "orders_placed_total").unwrap();
        assert_eq!(placed.metric[0].counter.value, Some(1.0));

        let value = gathered.iter().find(|m| m.name() == "order_value").unwrap();
        assert_eq!(value.metric[0].histogram.sample_count, Some(1));
    }

    #[test]
    fn test_record_auth_attempts() {
        let metrics = Metrics::new().unwrap();
        metrics.record_auth_attempt("login", true);
        metrics.record_auth_attempt("login", false);
        metrics.record_auth_attempt("login", false);

        let gathered = metrics.registry.gather();
        let attempts = gathered.iter().find(|m| m.name() == "auth_attempts_total").unwrap();
        assert_eq!(attempts.metric.len(), 2); // success and failure
    }

    #[test]
    fn test_record_http_error() {
        let metrics = Metrics::new().unwrap();
        metrics.record_http_error("not_found");
        metrics.record_http_error("not_found");

        assert_eq!(metrics.http_errors.with_label_values(&["not_found"]).get(), 2);
    }
}
