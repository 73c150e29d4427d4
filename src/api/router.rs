//! HTTP routing configuration.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::response::{IntoResponse, Response};
use axum::{Json, Router, http::StatusCode, middleware, routing::get};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, error};

use crate::app::AppState;

use super::dto::ErrorResponse;
use super::handlers::{
    create_product_handler, delete_product_handler, get_product_handler, health_check_handler,
    list_products_handler, metrics_handler, openapi_handler, readiness_handler,
    update_product_handler,
};
use super::middleware::{RateLimitConfig, RateLimitState, rate_limit_middleware};

/// Extra time the transport allows beyond the use-case deadline, so that the
/// use case reports its own timeout first.
const TIMEOUT_GRACE: Duration = Duration::from_secs(1);

fn product_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/v1/products",
            get(list_products_handler).post(create_product_handler),
        )
        .route(
            "/api/v1/products/{id}",
            get(get_product_handler)
                .put(update_product_handler)
                .delete(delete_product_handler),
        )
}

/// Turns a handler panic into the generic 500 body instead of a dropped connection.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(
            "internal_server_error",
            "An internal error occurred",
        )),
    )
        .into_response()
}

fn build(app_state: Arc<AppState>, products: Router<Arc<AppState>>) -> Router {
    let request_timeout = app_state.service.operation_timeout() + TIMEOUT_GRACE;
    let layers = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ));

    let mut router = Router::new()
        .merge(products)
        .route("/health", get(health_check_handler))
        .route("/health/ready", get(readiness_handler))
        .route("/api-docs/openapi.json", get(openapi_handler));

    if app_state.metrics.is_some() {
        router = router.route("/metrics", get(metrics_handler));
    }

    router.layer(layers).with_state(app_state)
}

/// Create router without rate limiting
pub fn create_router(app_state: Arc<AppState>) -> Router {
    build(app_state, product_routes())
}

/// Create router with per-IP rate limiting on the product routes.
///
/// Health, documentation and metrics endpoints are never limited.
pub fn create_router_with_rate_limit(app_state: Arc<AppState>, config: RateLimitConfig) -> Router {
    let rate_limit_state = Arc::new(RateLimitState::new(config));
    let products = product_routes().layer(middleware::from_fn_with_state(
        rate_limit_state,
        rate_limit_middleware,
    ));
    build(app_state, products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::test_utils::MockProductRepository;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(Arc::new(MockProductRepository::new())))
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let res = create_router(state())
            .oneshot(get_request("/health"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_follows_repository_health() {
        let repo = Arc::new(MockProductRepository::new());
        let router = create_router(Arc::new(AppState::new(repo.clone())));

        let res = router
            .clone()
            .oneshot(get_request("/health/ready"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        repo.set_healthy(false);
        let res = router.oneshot(get_request("/health/ready")).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_openapi_document_lists_product_paths() {
        let res = create_router(state())
            .oneshot(get_request("/api-docs/openapi.json"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(doc["paths"]["/api/v1/products"].is_object());
        assert!(doc["paths"]["/api/v1/products/{id}"].is_object());
    }

    async fn exploding_handler() -> StatusCode {
        panic!("handler exploded")
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_internal_error() {
        let routes = Router::new().route("/boom", get(exploding_handler));
        let router = build(state(), routes);

        let res = router.oneshot(get_request("/boom")).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "internal_server_error");
        assert_eq!(body.message, "An internal error occurred");
    }

    #[tokio::test]
    async fn test_metrics_route_absent_without_recorder() {
        let res = create_router(state())
            .oneshot(get_request("/metrics"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unsupported_method_is_rejected() {
        let res = create_router(state())
            .oneshot(
                Request::builder()
                    .method(Method::PATCH)
                    .uri("/api/v1/products/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_rate_limit_applies_to_products_only() {
        let router = create_router_with_rate_limit(state(), RateLimitConfig { rps: 1, burst: 1 });

        let first = router
            .clone()
            .oneshot(get_request("/api/v1/products"))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = router
            .clone()
            .oneshot(get_request("/api/v1/products"))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

        for _ in 0..5 {
            let health = router.clone().oneshot(get_request("/health")).await.unwrap();
            assert_eq!(health.status(), StatusCode::OK);
        }
    }
}
