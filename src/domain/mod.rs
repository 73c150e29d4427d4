//! Domain layer containing core business types, traits, and error definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{AppError, ConfigError, DatabaseError, ErrorKind, ValidationError};
pub use traits::ProductRepository;
pub use types::{
    DEFAULT_PAGE_LIMIT, MAX_DESCRIPTION_CHARS, MAX_NAME_CHARS, MAX_PAGE_LIMIT, PageRequest,
    Product, ProductId, ProductInput, ProductPage,
};
