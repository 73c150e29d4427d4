//! Product Service
//!
//! A REST service for creating, reading, listing, updating and deleting the
//! products of a store, backed by PostgreSQL.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   API Layer                  │
//! │  HTTP handlers, routing, request validation  │
//! ├─────────────────────────────────────────────┤
//! │               Application Layer              │
//! │   Product use cases, configuration, state    │
//! ├─────────────────────────────────────────────┤
//! │                 Domain Layer                 │
//! │    Product entity, repository trait, errors  │
//! ├─────────────────────────────────────────────┤
//! │             Infrastructure Layer             │
//! │    PostgreSQL repository, logging, metrics   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The use cases only see the [`domain::ProductRepository`] trait, so the
//! PostgreSQL adapter can be swapped for the in-memory mock in tests.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use product_service::api::create_router;
//! use product_service::app::AppState;
//! use product_service::infra::PostgresProductRepository;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let repository = Arc::new(PostgresProductRepository::with_defaults(&database_url).await?);
//!     repository.run_migrations().await?;
//!
//!     let state = Arc::new(AppState::new(repository));
//!     let router = create_router(state);
//!     axum::serve(listener, router).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod domain;
pub mod infra;

// Test utilities are available in tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
