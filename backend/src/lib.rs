//! # Person Registry Backend
//!
//! Create, read, update, delete and search person records over a REST API.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: The `Person` record and its identifier type
//! - [`db`]: Repository trait, storage backends, and the business rules in
//!   [`db::services`]
//! - [`config`]: TOML configuration with environment overrides
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! Storage is pluggable: an in-memory repository (`local-repo` feature) and
//! a PostgreSQL repository built on Diesel (`postgres-repo` feature).

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod models;

#[cfg(feature = "http-server")]
pub mod http;
