//! PostgreSQL product repository.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument};

use crate::domain::{
    AppError, DatabaseError, Product, ProductId, ProductInput, ProductRepository,
};

/// PostgreSQL connection pool configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            max_connections: 25,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(3),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(300),
        }
    }
}

/// Product repository backed by a shared PostgreSQL pool.
///
/// Integer columns are `INTEGER` in the schema; they are widened to `BIGINT`
/// on the way out and narrowed on the way in so the domain can use `i64`.
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    /// Connect with explicit options and pool configuration
    pub async fn connect(
        options: PgConnectOptions,
        config: PostgresConfig,
    ) -> Result<Self, AppError> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Connection(e.to_string())))?;
        info!(
            max_connections = config.max_connections,
            "Connected to PostgreSQL"
        );
        Ok(Self { pool })
    }

    /// Connect from a `postgres://` URL
    pub async fn new(database_url: &str, config: PostgresConfig) -> Result<Self, AppError> {
        let options = PgConnectOptions::from_str(database_url)
            .map_err(|e| AppError::Database(DatabaseError::Connection(e.to_string())))?;
        Self::connect(options, config).await
    }

    /// Connect from a URL with default pool configuration
    pub async fn with_defaults(database_url: &str) -> Result<Self, AppError> {
        Self::new(database_url, PostgresConfig::default()).await
    }

    /// Run database migrations using sqlx migrate
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn row_to_product(row: &PgRow) -> Result<Product, AppError> {
        let read = |e: sqlx::Error| AppError::Database(DatabaseError::from(e));

        Ok(Product {
            id: row.try_get("id").map_err(read)?,
            store_id: row.try_get("store_id").map_err(read)?,
            name: row.try_get("name").map_err(read)?,
            description: row.try_get("description").map_err(read)?,
            amount: row.try_get("amount").map_err(read)?,
            price: row.try_get("price").map_err(read)?,
            created_at: row.try_get("created_at").map_err(read)?,
            updated_at: row.try_get("updated_at").map_err(read)?,
        })
    }

    fn not_found(id: ProductId) -> AppError {
        AppError::Database(DatabaseError::NotFound(format!("product {id}")))
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Connection(e.to_string())))?;
        Ok(())
    }

    #[instrument(skip(self, input), fields(store_id = input.store_id))]
    async fn create(&self, input: &ProductInput) -> Result<Product, AppError> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (store_id, name, description, amount, price, created_at, updated_at)
            VALUES ($1::INTEGER, $2, $3, $4::INTEGER, $5, NOW(), NOW())
            RETURNING id::BIGINT AS id, store_id::BIGINT AS store_id, name, description,
                      amount::BIGINT AS amount, price, created_at, updated_at
            "#,
        )
        .bind(input.store_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::from(e)))?;

        Self::row_to_product(&row)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: ProductId) -> Result<Product, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id::BIGINT AS id, store_id::BIGINT AS store_id, name, description,
                   amount::BIGINT AS amount, price, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::from(e)))?;

        match row {
            Some(row) => Self::row_to_product(&row),
            None => Err(Self::not_found(id)),
        }
    }

    #[instrument(skip(self))]
    async fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<Product>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id::BIGINT AS id, store_id::BIGINT AS store_id, name, description,
                   amount::BIGINT AS amount, price, created_at, updated_at
            FROM products
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::from(e)))?;

        rows.iter().map(Self::row_to_product).collect()
    }

    #[instrument(skip(self, input), fields(store_id = input.store_id))]
    async fn update(&self, id: ProductId, input: &ProductInput) -> Result<Product, AppError> {
        let row = sqlx::query(
            r#"
            UPDATE products
            SET store_id = $1::INTEGER,
                name = $2,
                description = $3,
                amount = $4::INTEGER,
                price = $5,
                updated_at = GREATEST(NOW(), created_at)
            WHERE id = $6
            RETURNING id::BIGINT AS id, store_id::BIGINT AS store_id, name, description,
                      amount::BIGINT AS amount, price, created_at, updated_at
            "#,
        )
        .bind(input.store_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.price)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::from(e)))?;

        match row {
            Some(row) => Self::row_to_product(&row),
            None => Err(Self::not_found(id)),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ProductId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(DatabaseError::from(e)))?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}
