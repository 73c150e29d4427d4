//! The API layer, containing web handlers and routing.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use middleware::RateLimitConfig;
pub use router::{create_router, create_router_with_rate_limit};
