//! In-memory local repository implementation.
//!
//! All rows live in a `BTreeMap` keyed by identifier behind a single
//! `RwLock`. The email uniqueness check and the write happen under the same
//! write guard, so concurrent inserts of one email cannot both succeed.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::db::repository::{ErrorContext, PersonRepository, RepositoryError, RepositoryResult};
use crate::models::{Person, PersonId};

/// In-memory local repository.
///
/// Cloning shares the underlying data, which makes it easy to hand one
/// instance to the HTTP state and keep another for assertions.
///
/// # Example
/// ```
/// use person_registry::db::repositories::LocalRepository;
/// use person_registry::db::repository::PersonRepository;
/// use person_registry::models::Person;
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// rt.block_on(async {
///     let repo = LocalRepository::new();
///     let saved = repo.save(&Person::new("Ann", "Lee", "ann@x.com")).await.unwrap();
///     assert!(saved.id.is_some());
///     assert_eq!(repo.person_count(), 1);
/// });
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    persons: BTreeMap<PersonId, Person>,
    next_person_id: PersonId,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            persons: BTreeMap::new(),
            next_person_id: PersonId(1),
            is_healthy: true,
        }
    }
}

impl LocalData {
    /// Whether `email` belongs to a row other than `except`.
    fn email_taken(&self, email: &str, except: Option<PersonId>) -> bool {
        self.persons
            .values()
            .any(|p| p.email == email && p.id != except)
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    ///
    /// While unhealthy every operation other than `health_check` fails with a
    /// connection error.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository. Identifiers restart at 1.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Get the number of persons stored.
    pub fn person_count(&self) -> usize {
        self.data.read().persons.len()
    }

    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Database is not healthy")
                .with_context(ErrorContext::new(operation).with_entity("person")));
        }
        Ok(())
    }

    fn collect_where(&self, predicate: impl Fn(&Person) -> bool) -> Vec<Person> {
        self.data
            .read()
            .persons
            .values()
            .filter(|p| predicate(p))
            .cloned()
            .collect()
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersonRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn save(&self, person: &Person) -> RepositoryResult<Person> {
        self.check_health("save")?;

        let mut data = self.data.write();
        let now = Utc::now();

        if data.email_taken(&person.email, person.id) {
            return Err(
                RepositoryError::conflict(format!("Email {} is already in use", person.email))
                    .with_context(
                        ErrorContext::new("save")
                            .with_entity("person")
                            .with_details("constraint=persons_email_key"),
                    ),
            );
        }

        let saved = match person.id {
            None => {
                let id = data.next_person_id;
                data.next_person_id = PersonId(id.0 + 1);

                let mut row = person.clone();
                row.id = Some(id);
                row.created_at = Some(now);
                row.updated_at = Some(now);
                row
            }
            Some(id) => {
                let existing = data.persons.get(&id).ok_or_else(|| {
                    RepositoryError::not_found(format!("Person {} not found", id)).with_context(
                        ErrorContext::new("save")
                            .with_entity("person")
                            .with_entity_id(id),
                    )
                })?;

                let mut row = person.clone();
                row.created_at = existing.created_at;
                row.updated_at = Some(now);
                row
            }
        };

        if let Some(id) = saved.id {
            data.persons.insert(id, saved.clone());
        }
        Ok(saved)
    }

    async fn delete_by_id(&self, id: PersonId) -> RepositoryResult<()> {
        self.check_health("delete_by_id")?;
        self.data.write().persons.remove(&id);
        Ok(())
    }

    async fn find_by_id(&self, id: PersonId) -> RepositoryResult<Option<Person>> {
        self.check_health("find_by_id")?;
        Ok(self.data.read().persons.get(&id).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Person>> {
        self.check_health("find_all")?;
        Ok(self.collect_where(|_| true))
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Person>> {
        self.check_health("find_by_email")?;
        Ok(self
            .data
            .read()
            .persons
            .values()
            .find(|p| p.email == email)
            .cloned())
    }

    async fn find_by_last_name(&self, last_name: &str) -> RepositoryResult<Vec<Person>> {
        self.check_health("find_by_last_name")?;
        Ok(self.collect_where(|p| p.last_name == last_name))
    }

    async fn find_by_age_greater_than(&self, age: i32) -> RepositoryResult<Vec<Person>> {
        self.check_health("find_by_age_greater_than")?;
        Ok(self.collect_where(|p| p.age.is_some_and(|a| a > age)))
    }

    async fn exists_by_email(&self, email: &str) -> RepositoryResult<bool> {
        self.check_health("exists_by_email")?;
        Ok(self.data.read().email_taken(email, None))
    }

    async fn exists_by_id(&self, id: PersonId) -> RepositoryResult<bool> {
        self.check_health("exists_by_id")?;
        Ok(self.data.read().persons.contains_key(&id))
    }
}
