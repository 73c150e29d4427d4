//! Wire-format request and response shapes.
//!
//! These types exist only at the transport boundary. Requests are converted to
//! [`ProductInput`] before reaching the use cases, and responses are built from
//! [`Product`] on the way out.

use chrono::SecondsFormat;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{
    AppError, DEFAULT_PAGE_LIMIT, Product, ProductInput, ProductPage, ValidationError,
};

/// Request payload for creating a product.
///
/// Integer bounds match the `INTEGER` columns and the price bound matches
/// `NUMERIC(12,2)`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(range(min = 1, max = 2147483647))]
    #[schema(minimum = 1, example = 1)]
    pub store_id: i64,
    #[validate(length(min = 1, max = 100))]
    #[schema(min_length = 1, max_length = 100, example = "Widget")]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    #[schema(max_length = 1000)]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 2147483647))]
    #[schema(minimum = 0, example = 10)]
    pub amount: i64,
    #[validate(range(exclusive_min = 0.0, max = 9999999999.99))]
    #[schema(example = 29.99)]
    pub price: f64,
}

/// Request payload for replacing a product; every field is overwritten.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(range(min = 1, max = 2147483647))]
    #[schema(minimum = 1, example = 1)]
    pub store_id: i64,
    #[validate(length(min = 1, max = 100))]
    #[schema(min_length = 1, max_length = 100, example = "Widget")]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    #[schema(max_length = 1000)]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 2147483647))]
    #[schema(minimum = 0, example = 10)]
    pub amount: i64,
    #[validate(range(exclusive_min = 0.0, max = 9999999999.99))]
    #[schema(example = 29.99)]
    pub price: f64,
}

impl CreateProductRequest {
    pub fn into_input(self) -> Result<ProductInput, AppError> {
        to_input(
            self.store_id,
            self.name,
            self.description,
            self.amount,
            self.price,
        )
    }
}

impl UpdateProductRequest {
    pub fn into_input(self) -> Result<ProductInput, AppError> {
        to_input(
            self.store_id,
            self.name,
            self.description,
            self.amount,
            self.price,
        )
    }
}

/// An empty description on the wire means "no description".
fn to_input(
    store_id: i64,
    name: String,
    description: Option<String>,
    amount: i64,
    price: f64,
) -> Result<ProductInput, AppError> {
    let price = Decimal::from_f64(price)
        .ok_or_else(|| ValidationError::Multiple(format!("price: {price} is not a decimal")))?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    Ok(ProductInput {
        store_id,
        name,
        description: description.filter(|d| !d.is_empty()),
        amount,
        price,
    })
}

/// Product as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ProductResponse {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    /// Empty when the product has no description.
    pub description: String,
    pub amount: i64,
    pub price: f64,
    /// RFC 3339
    pub created_at: String,
    /// RFC 3339
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            store_id: product.store_id,
            name: product.name,
            description: product.description.unwrap_or_default(),
            amount: product.amount,
            price: product.price.to_f64().unwrap_or_default(),
            created_at: product
                .created_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            updated_at: product
                .updated_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    /// Number of products in this page.
    pub total: usize,
    pub limit: i64,
    pub offset: i64,
}

impl From<ProductPage> for ProductListResponse {
    fn from(page: ProductPage) -> Self {
        let products: Vec<ProductResponse> =
            page.products.into_iter().map(ProductResponse::from).collect();
        Self {
            total: products.len(),
            products,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

/// Raw pagination query. Values are kept as text so that garbage falls back
/// to the defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListProductsQuery {
    /// Page size (default 10, max 100)
    pub limit: Option<String>,
    /// Rows to skip (default 0)
    pub offset: Option<String>,
}

impl ListProductsQuery {
    /// Returns `(limit, offset)`, ignoring values that do not parse or are out of range.
    #[must_use]
    pub fn lenient(&self) -> (i64, i64) {
        let parse = |raw: &Option<String>| {
            raw.as_deref().and_then(|v| v.trim().parse::<i64>().ok())
        };

        let limit = parse(&self.limit)
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT);
        let offset = parse(&self.offset).filter(|o| *o >= 0).unwrap_or(0);
        (limit, offset)
    }
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable code, e.g. `product_not_found`
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }
}
