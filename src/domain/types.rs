use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Surrogate key assigned by the store.
pub type ProductId = i64;

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Core domain entity representing a product listed by a store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub store_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub amount: i64,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The replaceable fields of a product, used for both create and full update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductInput {
    pub store_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub amount: i64,
    pub price: Decimal,
}

impl ProductInput {
    pub fn new(store_id: i64, name: impl Into<String>, amount: i64, price: Decimal) -> Self {
        Self {
            store_id,
            name: name.into(),
            description: None,
            amount,
            price,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks the business rules in a fixed order; the first violation wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.store_id <= 0 {
            return Err(ValidationError::invalid_field(
                "store_id",
                "store_id must be positive",
            ));
        }

        if self.name.is_empty() {
            return Err(ValidationError::invalid_field("name", "name is required"));
        }

        if self.name.chars().count() > MAX_NAME_CHARS {
            return Err(ValidationError::invalid_field(
                "name",
                "name must not exceed 100 characters",
            ));
        }

        if self
            .description
            .as_ref()
            .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_CHARS)
        {
            return Err(ValidationError::invalid_field(
                "description",
                "description must not exceed 1000 characters",
            ));
        }

        if self.amount < 0 {
            return Err(ValidationError::invalid_field(
                "amount",
                "amount must be non-negative",
            ));
        }

        if !self.has_valid_price() {
            return Err(ValidationError::invalid_field(
                "price",
                "price must be positive",
            ));
        }

        Ok(())
    }

    pub fn has_valid_price(&self) -> bool {
        self.price > Decimal::ZERO
    }
}

/// Page window over the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

impl PageRequest {
    /// Silently corrects out-of-range values instead of rejecting them.
    #[must_use]
    pub fn normalized(limit: i64, offset: i64) -> Self {
        let limit = if limit <= 0 {
            DEFAULT_PAGE_LIMIT
        } else {
            limit.min(MAX_PAGE_LIMIT)
        };

        Self {
            limit,
            offset: offset.max(0),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// One page of products together with the window that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub limit: i64,
    pub offset: i64,
}
