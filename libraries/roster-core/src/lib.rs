//! Roster Core
//!
//! Backend-agnostic domain types, traits, and query semantics for the Roster
//! users service.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `User`, `NewUser`, `UserPatch`, `SearchCriteria`
//! - **Field Registry**: `UserField`, the only way to name a column
//! - **Query Translator**: parsing of the where/select/sort DSL into a
//!   validated `UserQuery`, plus the in-memory pipeline that executes it
//! - **Collation**: base-level text comparison and personal-name ordering
//! - **Pagination**: the forward-only cursor contract
//! - **Storage Trait**: `UserStore`, implemented by `roster-storage`
//! - **Error Handling**: unified `RosterError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use roster_core::query::QueryRequest;
//! use serde_json::json;
//!
//! let request: QueryRequest = serde_json::from_value(json!({
//!     "where": { "age": { "gt": 20, "lt": 35 } },
//!     "select": ["name"],
//!     "sort": { "field": "name", "direction": "asc" }
//! }))
//! .unwrap();
//!
//! let query = request.parse().unwrap();
//! assert_eq!(query.limit, 10);
//! ```

#![forbid(unsafe_code)]

pub mod collation;
pub mod error;
pub mod field;
pub mod pagination;
pub mod projection;
pub mod query;
pub mod storage;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use error::{Result, RosterError};
pub use field::{FieldKind, FieldValue, UserField};
pub use pagination::{CursorPage, PageRequest};
pub use projection::DisplayZone;
pub use query::{QueryRequest, UserQuery};
pub use storage::UserStore;
pub use types::{NewUser, SearchCriteria, User, UserId, UserInput, UserPatch};
pub use validation::ValidationPolicy;
