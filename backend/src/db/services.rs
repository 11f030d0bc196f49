//! Business rules for person records.
//!
//! These functions work with any [`PersonRepository`] and are the only place
//! that decides whether a write may go ahead:
//!
//! - an email belongs to at most one person;
//! - update and delete require the target record to exist.
//!
//! The uniqueness check here is advisory. Both backends also reject duplicate
//! emails on write, and that conflict is reported as
//! [`ServiceError::DuplicateEmail`] on create and [`ServiceError::EmailInUse`]
//! on update, so a lost race looks the same to callers as a failed pre-check.
//!
//! # Usage
//!
//! ```no_run
//! use person_registry::db::{repositories::LocalRepository, services};
//! use person_registry::models::Person;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let ann = services::create_person(&repo, Person::new("Ann", "Lee", "ann@x.com")).await?;
//!     println!("Created person {:?}", ann.id);
//!     Ok(())
//! }
//! ```

use log::{info, warn};

use super::repository::{PersonRepository, RepositoryError, RepositoryResult};
use crate::models::{Person, PersonId};

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Rule violations and store failures reported by the service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Another record already uses this email.
    #[error("Person with email {0} already exists")]
    DuplicateEmail(String),

    /// An update tried to take an email that belongs to another person.
    #[error("Email {0} is already in use")]
    EmailInUse(String),

    /// No record with this identifier.
    #[error("Person not found with id {0}")]
    NotFound(PersonId),

    /// The store failed; nothing more specific is known.
    #[error(transparent)]
    Store(#[from] RepositoryError),
}

/// Translate store write errors that carry rule meaning.
fn map_write_error(err: RepositoryError, email: &str, id: Option<PersonId>) -> ServiceError {
    match (err, id) {
        (err, None) if err.is_conflict() => ServiceError::DuplicateEmail(email.to_string()),
        (err, Some(_)) if err.is_conflict() => ServiceError::EmailInUse(email.to_string()),
        (err, Some(id)) if err.is_not_found() => ServiceError::NotFound(id),
        (err, _) => ServiceError::Store(err),
    }
}

// ==================== Health & Connection ====================

/// Check if the store is reachable.
pub async fn health_check<R: PersonRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Writes ====================

/// Create a new person.
///
/// Any identifier or timestamps on `person` are discarded; the store assigns
/// them.
///
/// # Errors
/// * [`ServiceError::DuplicateEmail`] if the email is already in use
/// * [`ServiceError::Store`] if the store fails
pub async fn create_person<R: PersonRepository + ?Sized>(
    repo: &R,
    mut person: Person,
) -> ServiceResult<Person> {
    person.id = None;
    person.created_at = None;
    person.updated_at = None;

    if repo.exists_by_email(&person.email).await? {
        warn!("Rejected create: email {} already exists", person.email);
        return Err(ServiceError::DuplicateEmail(person.email));
    }

    let saved = repo
        .save(&person)
        .await
        .map_err(|e| map_write_error(e, &person.email, None))?;

    info!(
        "Created person {} ({})",
        saved.id.map(|id| id.to_string()).unwrap_or_default(),
        saved.email
    );
    Ok(saved)
}

/// Overwrite the mutable fields of an existing person.
///
/// First name, last name, email, age and phone number are taken from
/// `details`; the identifier and creation time are kept.
///
/// # Errors
/// * [`ServiceError::NotFound`] if no person has this `id`
/// * [`ServiceError::EmailInUse`] if the new email belongs to another person
/// * [`ServiceError::Store`] if the store fails
pub async fn update_person<R: PersonRepository + ?Sized>(
    repo: &R,
    id: PersonId,
    details: Person,
) -> ServiceResult<Person> {
    let mut existing = repo
        .find_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound(id))?;

    if existing.email != details.email && repo.exists_by_email(&details.email).await? {
        warn!(
            "Rejected update of person {}: email {} already in use",
            id, details.email
        );
        return Err(ServiceError::EmailInUse(details.email));
    }

    existing.apply_changes(&details);

    let saved = repo
        .save(&existing)
        .await
        .map_err(|e| map_write_error(e, &existing.email, Some(id)))?;

    info!("Updated person {}", id);
    Ok(saved)
}

/// Permanently remove a person.
///
/// # Errors
/// * [`ServiceError::NotFound`] if no person has this `id`
/// * [`ServiceError::Store`] if the store fails
pub async fn delete_person<R: PersonRepository + ?Sized>(
    repo: &R,
    id: PersonId,
) -> ServiceResult<()> {
    if !repo.exists_by_id(id).await? {
        warn!("Rejected delete: person {} not found", id);
        return Err(ServiceError::NotFound(id));
    }

    repo.delete_by_id(id).await?;
    info!("Deleted person {}", id);
    Ok(())
}

// ==================== Lookups ====================

pub async fn get_person_by_id<R: PersonRepository + ?Sized>(
    repo: &R,
    id: PersonId,
) -> ServiceResult<Option<Person>> {
    Ok(repo.find_by_id(id).await?)
}

pub async fn get_person_by_email<R: PersonRepository + ?Sized>(
    repo: &R,
    email: &str,
) -> ServiceResult<Option<Person>> {
    Ok(repo.find_by_email(email).await?)
}

pub async fn get_all_persons<R: PersonRepository + ?Sized>(
    repo: &R,
) -> ServiceResult<Vec<Person>> {
    Ok(repo.find_all().await?)
}

/// Persons whose last name matches `last_name` exactly.
pub async fn search_by_last_name<R: PersonRepository + ?Sized>(
    repo: &R,
    last_name: &str,
) -> ServiceResult<Vec<Person>> {
    Ok(repo.find_by_last_name(last_name).await?)
}

/// Persons strictly older than `age`.
pub async fn get_persons_older_than<R: PersonRepository + ?Sized>(
    repo: &R,
    age: i32,
) -> ServiceResult<Vec<Person>> {
    Ok(repo.find_by_age_greater_than(age).await?)
}
