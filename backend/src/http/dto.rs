//! Data Transfer Objects for the HTTP API.
//!
//! Responses serialize [`Person`] directly. Requests go through
//! [`PersonRequest`], which is validated before any store access.

use serde::{Deserialize, Serialize};

use crate::config::ValidationSettings;
use crate::models::Person;

/// Request body for creating or replacing a person.
///
/// Missing string fields deserialize as empty and are then reported by
/// [`PersonRequest::validate`] rather than as a JSON shape error. `id` and
/// timestamps in the body are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl PersonRequest {
    /// Check field rules. Returns every violation, not just the first.
    pub fn validate(&self, rules: &ValidationSettings) -> Result<(), Vec<String>> {
        let mut violations = Vec::new();

        if self.first_name.trim().is_empty() {
            violations.push("firstName must not be blank".to_string());
        }
        if self.last_name.trim().is_empty() {
            violations.push("lastName must not be blank".to_string());
        }
        if self.email.trim().is_empty() {
            violations.push("email must not be blank".to_string());
        } else if !is_valid_email(&self.email) {
            violations.push(format!("email '{}' is not a valid email address", self.email));
        }

        match self.age {
            None if rules.require_age => violations.push("age is required".to_string()),
            Some(age) if !(0..=rules.max_age).contains(&age) => violations.push(format!(
                "age must be between 0 and {}, got {}",
                rules.max_age, age
            )),
            _ => {}
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Convert into an unsaved [`Person`]. A blank phone number becomes `None`.
    pub fn into_person(self) -> Person {
        Person {
            id: None,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            age: self.age,
            phone_number: self.phone_number.filter(|p| !p.trim().is_empty()),
            created_at: None,
            updated_at: None,
        }
    }
}

/// Minimal `local@domain` shape check.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Query parameters for the last-name search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastNameQuery {
    pub lastname: String,
}

/// Query parameters for the age filter endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeFilterQuery {
    #[serde(rename = "minAge")]
    pub min_age: i32,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the crate
    pub version: String,
    /// Database connection status
    pub database: String,
}
