use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::persons;
use crate::models::{Person, PersonId};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = persons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PersonRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: Option<i32>,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PersonRow> for Person {
    fn from(row: PersonRow) -> Self {
        Person {
            id: Some(PersonId(row.id)),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            age: row.age,
            phone_number: row.phone_number,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

/// Insert payload. `id` comes from the `BIGSERIAL` sequence and the
/// timestamps from column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = persons)]
pub struct NewPersonRow {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: Option<i32>,
    pub phone_number: Option<String>,
}

impl From<&Person> for NewPersonRow {
    fn from(person: &Person) -> Self {
        Self {
            first_name: person.first_name.clone(),
            last_name: person.last_name.clone(),
            email: person.email.clone(),
            age: person.age,
            phone_number: person.phone_number.clone(),
        }
    }
}

/// Update payload. `treat_none_as_null` so clearing `age` or
/// `phone_number` actually writes NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = persons)]
#[diesel(treat_none_as_null = true)]
pub struct PersonChangeset {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: Option<i32>,
    pub phone_number: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PersonChangeset {
    pub fn from_person(person: &Person, updated_at: DateTime<Utc>) -> Self {
        Self {
            first_name: person.first_name.clone(),
            last_name: person.last_name.clone(),
            email: person.email.clone(),
            age: person.age,
            phone_number: person.phone_number.clone(),
            updated_at,
        }
    }
}
