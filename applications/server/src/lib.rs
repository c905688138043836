//! Roster Server Library
//!
//! REST and GraphQL API for the users service, backed by PostgreSQL or an
//! in-memory store.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod graphql;
pub mod router;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::{ServerConfig, StorageBackend};
pub use error::{Result, ServerError};
pub use router::create_router;
pub use services::UserService;
pub use state::{open_store, AppState};
