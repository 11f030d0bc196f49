//! Repository trait definitions for person storage.
//!
//! - [`error`]: Error types for repository operations
//! - [`person`]: CRUD and lookup queries over the person table
//!
//! Backends live in [`crate::db::repositories`]; callers hold them as
//! `Arc<dyn PersonRepository>`.

pub mod error;
pub mod person;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use person::PersonRepository;
