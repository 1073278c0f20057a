// ============================================================================
// HTTP API - actix-web routes over the mock backend
// ============================================================================

mod errors;
mod extractors;
mod handlers;
mod routes;

use std::sync::Arc;

use crate::backend::MockBackend;
use crate::metrics::Metrics;

pub use errors::ApiError;
pub use extractors::AuthenticatedUser;
pub use routes::configure;

/// Shared by every worker through `web::Data`
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<MockBackend>,
    pub metrics: Option<Arc<Metrics>>,
}

impl AppState {
    pub fn new(backend: Arc<MockBackend>, metrics: Option<Arc<Metrics>>) -> Self {
        Self { backend, metrics }
    }

    /// Convert a failure into a response error, counting it by kind
    pub fn reject(&self, err: impl Into<ApiError>) -> ApiError {
        let err = err.into();
        if let Some(metrics) = &self.metrics {
            metrics.record_http_error(err.kind().as_str());
        }
        err
    }
}
