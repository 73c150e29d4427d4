//! Product use cases.
//!
//! This module contains the business rules that sit between the HTTP layer
//! and the repository abstraction: validation, id checks, pagination
//! normalization and error contextualization.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, instrument, warn};

use crate::domain::{
    AppError, ErrorKind, PageRequest, Product, ProductId, ProductInput, ProductPage,
    ProductRepository, ValidationError,
};

/// Deadline applied to every use-case call unless configured otherwise.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Application service orchestrating product operations.
///
/// Each public method performs at most one repository call and runs under a
/// fixed deadline. When the deadline expires the repository future is dropped,
/// which aborts the in-flight statement, and `AppError::Timeout` is returned.
///
/// # Example
///
/// ```ignore
/// let repository = Arc::new(PostgresProductRepository::with_defaults(&url).await?);
/// let service = ProductService::new(repository);
///
/// let product = service.create_product(&input).await?;
/// ```
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
    operation_timeout: Duration,
}

impl ProductService {
    /// Creates a new `ProductService` with the default deadline.
    #[must_use]
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self {
            repository,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Overrides the per-call deadline.
    #[must_use]
    pub fn with_timeout(mut self, operation_timeout: Duration) -> Self {
        self.operation_timeout = operation_timeout;
        self
    }

    #[must_use]
    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Validates and persists a new product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if a business rule fails, the
    /// repository's `Duplicate` error unchanged, and any other persistence
    /// failure wrapped as `AppError::Internal` with "failed to create product".
    #[instrument(skip(self, input), fields(store_id = input.store_id, name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, AppError> {
        info!("Creating new product");

        self.observe("create_product", async {
            input.validate().map_err(|e| {
                warn!(error = %e, "Product validation failed");
                AppError::from(e)
            })?;

            let product = self
                .repository
                .create(input)
                .await
                .map_err(|e| e.context("create product"))?;

            info!(product_id = product.id, "Product created successfully");
            Ok(product)
        })
        .await
    }

    /// Gets a product by ID.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, AppError> {
        info!(product_id = id, "Retrieving product");

        self.observe("get_product", async {
            ensure_valid_id(id)?;
            self.repository.get_by_id(id).await
        })
        .await
    }

    /// Lists products, most recent first.
    ///
    /// Out-of-range pagination is corrected rather than rejected: a
    /// non-positive `limit` becomes 10, anything above 100 becomes 100, and a
    /// negative `offset` becomes 0.
    #[instrument(skip(self))]
    pub async fn get_products(&self, limit: i64, offset: i64) -> Result<ProductPage, AppError> {
        info!("Retrieving products");
        let page = PageRequest::normalized(limit, offset);

        self.observe("get_products", async {
            let products = self
                .repository
                .get_all(page.limit, page.offset)
                .await
                .map_err(|e| e.context("get products"))?;

            Ok(ProductPage {
                products,
                limit: page.limit,
                offset: page.offset,
            })
        })
        .await
    }

    /// Replaces the mutable fields of an existing product.
    #[instrument(skip(self, input), fields(store_id = input.store_id, name = %input.name))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, AppError> {
        info!(product_id = id, "Updating product");

        self.observe("update_product", async {
            ensure_valid_id(id)?;
            input.validate().map_err(|e| {
                warn!(error = %e, "Product validation failed");
                AppError::from(e)
            })?;

            let product = self.repository.update(id, input).await?;
            info!(product_id = product.id, "Product updated successfully");
            Ok(product)
        })
        .await
    }

    /// Hard-deletes a product.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), AppError> {
        info!(product_id = id, "Deleting product");

        self.observe("delete_product", async {
            ensure_valid_id(id)?;
            self.repository.delete(id).await?;
            info!(product_id = id, "Product deleted successfully");
            Ok(())
        })
        .await
    }

    /// Probes the persistence layer for the readiness endpoint.
    #[instrument(skip(self))]
    pub async fn check_readiness(&self) -> Result<(), AppError> {
        self.observe("check_readiness", self.repository.health_check())
            .await
    }

    /// Applies the deadline, then logs and counts the outcome.
    async fn observe<T, F>(&self, operation: &'static str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        let result = match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(format!(
                "{operation} exceeded {}ms",
                self.operation_timeout.as_millis()
            ))),
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => {
                match e.kind() {
                    ErrorKind::Internal | ErrorKind::Timeout => {
                        error!(operation, error = %e, "Product operation failed");
                    }
                    kind => {
                        warn!(
                            operation,
                            kind = kind.as_str(),
                            error = %e,
                            "Product operation rejected"
                        );
                    }
                }
                e.kind().as_str()
            }
        };
        metrics::counter!(
            "products_operations_total",
            "operation" => operation,
            "outcome" => outcome
        )
        .increment(1);

        result
    }
}

fn ensure_valid_id(id: ProductId) -> Result<(), AppError> {
    if id <= 0 {
        return Err(ValidationError::invalid_field("id", "invalid product ID").into());
    }
    Ok(())
}
