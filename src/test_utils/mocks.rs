//! Mock implementations for testing.
//!
//! These mocks provide in-memory implementations of domain traits
//! that can be configured to simulate various scenarios including
//! success, failure, and edge cases.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::{AppError, DatabaseError, Product, ProductId, ProductInput, ProductRepository};

/// Configuration for mock behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// If true, operations will fail.
    pub should_fail: bool,
    /// Custom error message for failures.
    pub error_message: Option<String>,
    /// Simulated latency in milliseconds.
    pub latency_ms: Option<u64>,
    /// Behave as if `products.name` carried a unique index.
    pub unique_names: bool,
}

impl MockConfig {
    /// Creates a config that always succeeds.
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    /// Creates a config that always fails.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Adds simulated latency.
    #[must_use]
    pub fn with_latency(mut self, ms: u64) -> Self {
        self.latency_ms = Some(ms);
        self
    }

    /// Rejects a second product with an existing name as a duplicate.
    #[must_use]
    pub fn with_unique_names(mut self) -> Self {
        self.unique_names = true;
        self
    }
}

/// In-memory product repository.
///
/// Ids are assigned from a counter starting at 1, mirroring a `SERIAL` column.
///
/// # Example
///
/// ```ignore
/// use product_service::test_utils::{MockProductRepository, mocks::MockConfig};
///
/// // Create a mock that succeeds
/// let mock = MockProductRepository::new();
///
/// // Create a mock that fails
/// let failing_mock = MockProductRepository::with_config(MockConfig::failure("DB error"));
/// ```
pub struct MockProductRepository {
    storage: Arc<Mutex<BTreeMap<ProductId, Product>>>,
    config: MockConfig,
    next_id: AtomicI64,
    call_count: AtomicU64,
    is_healthy: AtomicBool,
}

impl MockProductRepository {
    /// Creates a new mock with default (success) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a new mock with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            storage: Arc::new(Mutex::new(BTreeMap::new())),
            config,
            next_id: AtomicI64::new(1),
            call_count: AtomicU64::new(0),
            is_healthy: AtomicBool::new(true),
        }
    }

    /// Creates a mock that always fails.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Gets the number of times any method was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Sets the health status.
    pub fn set_healthy(&self, healthy: bool) {
        self.is_healthy.store(healthy, Ordering::Relaxed);
    }

    /// Gets all stored products ordered by id.
    pub fn get_all_products(&self) -> Vec<Product> {
        self.storage.lock().unwrap().values().cloned().collect()
    }

    async fn begin_call(&self) -> Result<(), AppError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        if let Some(ms) = self.config.latency_ms {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }

        if self.config.should_fail {
            let msg = self
                .config
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock database error".to_string());
            return Err(AppError::Database(DatabaseError::Query(msg)));
        }
        Ok(())
    }

    fn check_unique_name(
        &self,
        storage: &BTreeMap<ProductId, Product>,
        name: &str,
        except: Option<ProductId>,
    ) -> Result<(), AppError> {
        if !self.config.unique_names {
            return Ok(());
        }
        let taken = storage
            .values()
            .any(|p| p.name == name && Some(p.id) != except);
        if taken {
            return Err(AppError::Database(DatabaseError::Duplicate(format!(
                "product name '{name}' already exists"
            ))));
        }
        Ok(())
    }

    fn not_found(id: ProductId) -> AppError {
        AppError::Database(DatabaseError::NotFound(format!("product {id}")))
    }
}

/// Rounds like a `NUMERIC(12,2)` column.
fn to_cents(price: Decimal) -> Decimal {
    price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl Default for MockProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductRepository for MockProductRepository {
    async fn health_check(&self) -> Result<(), AppError> {
        self.begin_call().await?;

        if !self.is_healthy.load(Ordering::Relaxed) {
            return Err(AppError::Database(DatabaseError::Connection(
                "Mock database unhealthy".to_string(),
            )));
        }
        Ok(())
    }

    async fn create(&self, input: &ProductInput) -> Result<Product, AppError> {
        self.begin_call().await?;

        let mut storage = self.storage.lock().unwrap();
        self.check_unique_name(&storage, &input.name, None)?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();
        let product = Product {
            id,
            store_id: input.store_id,
            name: input.name.clone(),
            description: input.description.clone(),
            amount: input.amount,
            price: to_cents(input.price),
            created_at: now,
            updated_at: now,
        };

        storage.insert(id, product.clone());
        Ok(product)
    }

    async fn get_by_id(&self, id: ProductId) -> Result<Product, AppError> {
        self.begin_call().await?;

        let storage = self.storage.lock().unwrap();
        storage.get(&id).cloned().ok_or_else(|| Self::not_found(id))
    }

    async fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<Product>, AppError> {
        self.begin_call().await?;

        let storage = self.storage.lock().unwrap();
        let mut products: Vec<Product> = storage.values().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(products
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn update(&self, id: ProductId, input: &ProductInput) -> Result<Product, AppError> {
        self.begin_call().await?;

        let mut storage = self.storage.lock().unwrap();
        if !storage.contains_key(&id) {
            return Err(Self::not_found(id));
        }
        self.check_unique_name(&storage, &input.name, Some(id))?;

        let existing = storage.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        existing.store_id = input.store_id;
        existing.name = input.name.clone();
        existing.description = input.description.clone();
        existing.amount = input.amount;
        existing.price = to_cents(input.price);
        existing.updated_at = Utc::now().max(existing.created_at);
        Ok(existing.clone())
    }

    async fn delete(&self, id: ProductId) -> Result<(), AppError> {
        self.begin_call().await?;

        let mut storage = self.storage.lock().unwrap();
        storage.remove(&id).map(|_| ()).ok_or_else(|| Self::not_found(id))
    }
}
