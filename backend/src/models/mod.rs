//! Domain model types shared by the store, the rule layer and the HTTP API.

pub mod macros;
pub mod person;

pub use person::*;
