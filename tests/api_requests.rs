//! Additional integration tests for specific request flows.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use product_service::api::dto::{ErrorResponse, ProductListResponse, ProductResponse};
use product_service::api::{RateLimitConfig, create_router, create_router_with_rate_limit};
use product_service::app::AppState;
use product_service::test_utils::{MockConfig, MockProductRepository};

fn create_test_state() -> Arc<AppState> {
    Arc::new(AppState::new(Arc::new(MockProductRepository::new())))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn test_full_product_lifecycle_flow() {
    let router = create_router(create_test_state());

    // 1. POST - Create product
    let create_request = Request::builder()
        .method("POST")
        .uri("/api/v1/products")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "store_id": 3,
                "name": "Lifecycle Lamp",
                "description": "Warm white",
                "amount": 4,
                "price": 49.5
            })
            .to_string(),
        ))
        .unwrap();

    let create_response = router.clone().oneshot(create_request).await.unwrap();
    assert_eq!(create_response.status(), StatusCode::CREATED);
    let created: ProductResponse =
        serde_json::from_value(body_json(create_response).await).unwrap();
    assert_eq!(created.description, "Warm white");

    // 2. PUT - Replace every field
    let update_request = Request::builder()
        .method("PUT")
        .uri(format!("/api/v1/products/{}", created.id))
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "store_id": 3,
                "name": "Lifecycle Lamp v2",
                "amount": 0,
                "price": 59.0
            })
            .to_string(),
        ))
        .unwrap();

    let update_response = router.clone().oneshot(update_request).await.unwrap();
    assert_eq!(update_response.status(), StatusCode::OK);
    let updated: ProductResponse =
        serde_json::from_value(body_json(update_response).await).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Lifecycle Lamp v2");
    assert_eq!(updated.description, "");
    assert_eq!(updated.amount, 0);
    assert_eq!(updated.price, 59.0);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    // 3. GET - Reflects the update
    let get_request = Request::builder()
        .uri(format!("/api/v1/products/{}", created.id))
        .body(Body::empty())
        .unwrap();
    let get_response = router.clone().oneshot(get_request).await.unwrap();
    let fetched: ProductResponse = serde_json::from_value(body_json(get_response).await).unwrap();
    assert_eq!(fetched, updated);

    // 4. DELETE
    let delete_request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/v1/products/{}", created.id))
        .body(Body::empty())
        .unwrap();
    let delete_response = router.clone().oneshot(delete_request).await.unwrap();
    assert_eq!(delete_response.status(), StatusCode::NO_CONTENT);

    // 5. GET - Gone
    let get_request = Request::builder()
        .uri(format!("/api/v1/products/{}", created.id))
        .body(Body::empty())
        .unwrap();
    let get_response = router.clone().oneshot(get_request).await.unwrap();
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);

    // 6. LIST - Empty
    let list_request = Request::builder()
        .uri("/api/v1/products")
        .body(Body::empty())
        .unwrap();
    let list_response = router.oneshot(list_request).await.unwrap();
    let list: ProductListResponse = serde_json::from_value(body_json(list_response).await).unwrap();
    assert!(list.products.is_empty());
    assert_eq!(list.total, 0);
}

#[tokio::test]
async fn test_update_with_invalid_body_leaves_product_untouched() {
    let repo = Arc::new(MockProductRepository::new());
    let router = create_router(Arc::new(AppState::new(repo.clone())));

    let create_request = Request::builder()
        .method("POST")
        .uri("/api/v1/products")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({ "store_id": 1, "name": "Widget", "amount": 1, "price": 2.5 }).to_string(),
        ))
        .unwrap();
    let create_response = router.clone().oneshot(create_request).await.unwrap();
    let created: ProductResponse =
        serde_json::from_value(body_json(create_response).await).unwrap();

    let update_request = Request::builder()
        .method("PUT")
        .uri(format!("/api/v1/products/{}", created.id))
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({ "store_id": 1, "name": "Widget", "amount": 1, "price": -2.5 }).to_string(),
        ))
        .unwrap();
    let response = router.oneshot(update_request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let stored = repo.get_all_products();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Widget");
    assert_eq!(stored[0].price, dec!(2.5));
}

#[tokio::test]
async fn test_slow_repository_times_out() {
    let repo = Arc::new(MockProductRepository::with_config(
        MockConfig::success().with_latency(200),
    ));
    let state = Arc::new(AppState::with_timeout(repo, Duration::from_millis(20)));
    let router = create_router(state);

    let request = Request::builder()
        .uri("/api/v1/products/1")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(body.error, "timeout");
}

#[tokio::test]
async fn test_readiness_reports_unavailable_database() {
    let repo = Arc::new(MockProductRepository::new());
    repo.set_healthy(false);
    let router = create_router(Arc::new(AppState::new(repo)));

    let request = Request::builder()
        .uri("/health/ready")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["status"], "unavailable");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let router = create_router(create_test_state());

    let request = Request::builder()
        .uri("/api-docs/openapi.json")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let doc = body_json(response).await;
    assert_eq!(doc["info"]["title"], "Product Service API");
    assert!(doc["components"]["schemas"]["CreateProductRequest"].is_object());
}

#[tokio::test]
async fn test_rate_limited_router_rejects_burst() {
    let router = create_router_with_rate_limit(
        create_test_state(),
        RateLimitConfig { rps: 1, burst: 2 },
    );

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let request = Request::builder()
            .uri("/api/v1/products")
            .header("X-Forwarded-For", "203.0.113.7")
            .body(Body::empty())
            .unwrap();
        statuses.push(router.clone().oneshot(request).await.unwrap().status());
    }

    assert_eq!(
        statuses,
        [StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
    );
}
