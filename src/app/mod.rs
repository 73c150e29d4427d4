//! Application layer containing use cases, configuration and shared state.

pub mod config;
pub mod service;
pub mod state;

pub use config::AppConfig;
pub use service::ProductService;
pub use state::AppState;
