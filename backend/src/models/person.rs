//! The `Person` record and its identifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id_type!(i64, PersonId);

/// A person record.
///
/// `id` is `None` until the store assigns one on insert; after that it never
/// changes. The timestamps are maintained by the store as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default)]
    pub id: Option<PersonId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Person {
    /// Build an unsaved person with the required fields set.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            age: None,
            phone_number: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_age(mut self, age: i32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    /// Whether the record has been persisted (has a store-assigned id).
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Overwrite every mutable field with the values from `other`.
    ///
    /// Identifier and timestamps are left untouched.
    pub fn apply_changes(&mut self, other: &Person) {
        self.first_name = other.first_name.clone();
        self.last_name = other.last_name.clone();
        self.email = other.email.clone();
        self.age = other.age;
        self.phone_number = other.phone_number.clone();
    }
}
