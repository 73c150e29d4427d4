//! Domain traits defining contracts for external systems.

use async_trait::async_trait;

use super::error::AppError;
use super::types::{Product, ProductId, ProductInput};

/// Persistence contract for products.
///
/// Implementations classify storage failures at this boundary: a missing row
/// is `DatabaseError::NotFound`, a uniqueness violation is
/// `DatabaseError::Duplicate`, anything else is a generic database error.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Check database connectivity
    async fn health_check(&self) -> Result<(), AppError>;

    /// Insert a product; the store assigns `id`, `created_at` and `updated_at`.
    async fn create(&self, input: &ProductInput) -> Result<Product, AppError>;

    /// Single-row lookup by primary key
    async fn get_by_id(&self, id: ProductId) -> Result<Product, AppError>;

    /// Most recently created first
    async fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<Product>, AppError>;

    /// Replace every mutable column and refresh `updated_at`.
    async fn update(&self, id: ProductId, input: &ProductInput) -> Result<Product, AppError>;

    /// Hard delete
    async fn delete(&self, id: ProductId) -> Result<(), AppError>;
}
