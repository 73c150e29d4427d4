//! HTTP request handlers with OpenAPI documentation.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::error;
use utoipa::OpenApi;

use crate::app::AppState;
use crate::domain::{AppError, ErrorKind, ValidationError};

use super::dto::{
    CreateProductRequest, ErrorResponse, HealthResponse, ListProductsQuery, ProductListResponse,
    ProductResponse, UpdateProductRequest,
};
use super::extract::{ProductIdPath, ValidatedJson};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Product Service API",
        version = "0.1.0",
        description = "CRUD API for store products",
        license(
            name = "MIT"
        )
    ),
    paths(
        create_product_handler,
        list_products_handler,
        get_product_handler,
        update_product_handler,
        delete_product_handler,
        health_check_handler,
        readiness_handler,
    ),
    components(
        schemas(
            CreateProductRequest,
            UpdateProductRequest,
            ProductResponse,
            ProductListResponse,
            ErrorResponse,
            HealthResponse,
        )
    ),
    tags(
        (name = "products", description = "Product management endpoints"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Malformed or invalid product", body = ErrorResponse),
        (status = 409, description = "Duplicate product", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_product_handler(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let input = payload.into_input()?;
    let product = state.service.create_product(&input).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// List products, most recent first
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "One page of products", body = ProductListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_products_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListProductsQuery>, QueryRejection>,
) -> Result<Json<ProductListResponse>, AppError> {
    // An unreadable query string falls back to the defaults like any other bad value.
    let (limit, offset) = query.map(|Query(q)| q).unwrap_or_default().lenient();
    let page = state.service.get_products(limit, offset).await?;
    Ok(Json(page.into()))
}

/// Get a single product by ID
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    tag = "products",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 400, description = "Invalid product ID", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_product_handler(
    State(state): State<Arc<AppState>>,
    ProductIdPath(id): ProductIdPath,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state.service.get_product(id).await?;
    Ok(Json(product.into()))
}

/// Replace a product
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    tag = "products",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Malformed or invalid product", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 409, description = "Duplicate product", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn update_product_handler(
    State(state): State<Arc<AppState>>,
    ProductIdPath(id): ProductIdPath,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let input = payload.into_input()?;
    let product = state.service.update_product(id, &input).await?;
    Ok(Json(product.into()))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    tag = "products",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, description = "Invalid product ID", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn delete_product_handler(
    State(state): State<Arc<AppState>>,
    ProductIdPath(id): ProductIdPath,
) -> Result<StatusCode, AppError> {
    state.service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Process is up", body = HealthResponse)
    )
)]
pub async fn health_check_handler() -> Json<HealthResponse> {
    Json(HealthResponse::new("ok", "Service is healthy"))
}

/// Readiness check against the database
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn readiness_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.service.check_readiness().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse::new("ok", "Database is reachable")),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::new("unavailable", "Database is unreachable")),
        ),
    }
}

/// Prometheus scrape endpoint
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Serves the generated OpenAPI document
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.kind() {
            ErrorKind::InvalidInput => match &self {
                AppError::InvalidId(_) => (
                    StatusCode::BAD_REQUEST,
                    "invalid_id",
                    "Product ID must be a valid number".to_string(),
                ),
                AppError::Deserialization(msg)
                | AppError::Validation(ValidationError::Multiple(msg)) => (
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    msg.clone(),
                ),
                _ => (
                    StatusCode::BAD_REQUEST,
                    "invalid_product",
                    format!("invalid product data: {self}"),
                ),
            },
            ErrorKind::NotFound => (
                StatusCode::NOT_FOUND,
                "product_not_found",
                "Product not found".to_string(),
            ),
            ErrorKind::Duplicate => (
                StatusCode::CONFLICT,
                "duplicate_product",
                "Product with this name already exists".to_string(),
            ),
            ErrorKind::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "timeout",
                "The request timed out".to_string(),
            ),
            ErrorKind::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_server_error",
                "An internal error occurred".to_string(),
            ),
        };

        if status.is_server_error() {
            error!(error_type = %error_type, error = %self, "Server error");
        }

        (status, Json(ErrorResponse::new(error_type, message))).into_response()
    }
}
