//! Concrete database adapters.
//!
//! This module contains the PostgreSQL implementation of the
//! `ProductRepository` trait defined in the domain layer.

pub mod postgres;

pub use postgres::{PostgresConfig, PostgresProductRepository};
