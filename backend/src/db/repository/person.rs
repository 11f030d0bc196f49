//! Person repository trait.
//!
//! Lookups return `Option`/`Vec` and never fail on a miss. Writes are the only
//! operations that report domain conditions: a uniqueness violation surfaces as
//! [`RepositoryError::ConflictError`](super::RepositoryError::ConflictError),
//! and updating a row that does not exist as
//! [`RepositoryError::NotFound`](super::RepositoryError::NotFound).

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Person, PersonId};

/// Storage operations for [`Person`] rows.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to be shared across request handlers.
#[async_trait]
pub trait PersonRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the backing store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Writes ====================

    /// Insert or update a person.
    ///
    /// When `person.id` is `None` a new row is inserted and assigned a fresh
    /// identifier. Otherwise the row with that identifier is overwritten.
    ///
    /// # Returns
    /// * `Ok(Person)` - The persisted row, with id and timestamps set
    /// * `Err(RepositoryError::ConflictError)` - Email already used by another row
    /// * `Err(RepositoryError::NotFound)` - Update of an identifier with no row
    async fn save(&self, person: &Person) -> RepositoryResult<Person>;

    /// Remove the row with the given identifier. Absent rows are a no-op.
    async fn delete_by_id(&self, id: PersonId) -> RepositoryResult<()>;

    // ==================== Lookups ====================

    async fn find_by_id(&self, id: PersonId) -> RepositoryResult<Option<Person>>;

    /// All rows in identifier order.
    async fn find_all(&self) -> RepositoryResult<Vec<Person>>;

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Person>>;

    /// Rows whose last name matches exactly, in identifier order.
    async fn find_by_last_name(&self, last_name: &str) -> RepositoryResult<Vec<Person>>;

    /// Rows whose age is strictly greater than `age`. Rows without an age never match.
    async fn find_by_age_greater_than(&self, age: i32) -> RepositoryResult<Vec<Person>>;

    async fn exists_by_email(&self, email: &str) -> RepositoryResult<bool>;

    async fn exists_by_id(&self, id: PersonId) -> RepositoryResult<bool>;
}
