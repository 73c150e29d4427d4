//! Application state management.
//!
//! This module provides the shared application state that is
//! accessible to all request handlers via Axum's State extractor.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::ProductRepository;
use crate::infra::observability::PrometheusHandle;

use super::service::ProductService;

/// Shared application state for the Axum web server.
///
/// Everything inside is constructed once at startup and injected here, so
/// handlers never reach for process-wide globals.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
///
/// let repository = Arc::new(PostgresProductRepository::with_defaults(&url).await?);
/// let state = AppState::new(repository);
///
/// let router = create_router(Arc::new(state));
/// ```
#[derive(Clone)]
pub struct AppState {
    /// Product use cases.
    pub service: Arc<ProductService>,

    /// Prometheus renderer backing `GET /metrics`, when a recorder is installed.
    pub metrics: Option<Arc<PrometheusHandle>>,
}

impl AppState {
    /// Creates a new `AppState` wired to the given repository.
    #[must_use]
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self::with_service(Arc::new(ProductService::new(repository)))
    }

    /// Creates a new `AppState` whose use cases run under `operation_timeout`.
    #[must_use]
    pub fn with_timeout(
        repository: Arc<dyn ProductRepository>,
        operation_timeout: Duration,
    ) -> Self {
        Self::with_service(Arc::new(
            ProductService::new(repository).with_timeout(operation_timeout),
        ))
    }

    /// Creates a new `AppState` with a custom service.
    ///
    /// This is useful for testing when you want to inject a pre-configured service.
    #[must_use]
    pub fn with_service(service: Arc<ProductService>) -> Self {
        Self {
            service,
            metrics: None,
        }
    }

    /// Attaches the Prometheus renderer.
    #[must_use]
    pub fn with_metrics(mut self, handle: Arc<PrometheusHandle>) -> Self {
        self.metrics = Some(handle);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockProductRepository;

    #[test]
    fn test_app_state_creation() {
        let repo = Arc::new(MockProductRepository::new());

        let state = AppState::new(repo);

        assert!(Arc::strong_count(&state.service) >= 1);
        assert!(state.metrics.is_none());
    }

    #[test]
    fn test_app_state_is_clone() {
        let repo = Arc::new(MockProductRepository::new());

        let state = AppState::new(repo);
        let cloned = state.clone();

        assert!(Arc::ptr_eq(&state.service, &cloned.service));
    }

    #[test]
    fn test_app_state_with_timeout() {
        let repo = Arc::new(MockProductRepository::new());

        let state = AppState::with_timeout(repo, Duration::from_secs(5));

        assert_eq!(state.service.operation_timeout(), Duration::from_secs(5));
    }
}
