//! Postgres repository implementation using Diesel.
//!
//! The `persons` table is created by the embedded migrations in
//! `migrations/`. Email uniqueness is enforced by the `persons_email_key`
//! constraint; violations come back as
//! [`RepositoryError::ConflictError`].
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic migration execution
//!
//! Every operation runs once. A connection or query failure is returned to
//! the caller as is.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::debug;
use std::time::Duration;
use tokio::task;

use crate::db::repository::{ErrorContext, PersonRepository, RepositoryError, RepositoryResult};
use crate::models::{Person, PersonId};

mod models;
mod schema;

use models::{NewPersonRow, PersonChangeset, PersonRow};
use schema::persons;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone, PartialEq)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// See the module documentation for the variables and their defaults.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if connection or migration fails
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::from(e).with_context(
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool
                .get()
                .map_err(|e| RepositoryError::from(e).with_operation("run_migrations"))?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self { pool })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal(format!("Migration failed: {}", e))
                .with_operation("run_migrations")
        })?;
        debug!("Applied {} pending migration(s)", applied.len());

        Ok(())
    }

    /// Run `f` on a pooled connection, off the async runtime.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            RepositoryError::internal(format!("Task join error: {}", e))
                .with_operation("spawn_blocking")
        })?
    }
}

fn person_error(operation: &'static str) -> impl Fn(diesel::result::Error) -> RepositoryError {
    move |err| RepositoryError::from(err).with_operation(operation)
}

fn rows_to_persons(rows: Vec<PersonRow>) -> Vec<Person> {
    rows.into_iter().map(Person::from).collect()
}

#[async_trait]
impl PersonRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map_err(person_error("health_check"))?;
            Ok(true)
        })
        .await
    }

    async fn save(&self, person: &Person) -> RepositoryResult<Person> {
        let person = person.clone();
        self.with_conn(move |conn| {
            let row = match person.id {
                None => diesel::insert_into(persons::table)
                    .values(NewPersonRow::from(&person))
                    .returning(PersonRow::as_returning())
                    .get_result(conn)
                    .map_err(person_error("save"))?,
                Some(id) => diesel::update(persons::table.find(id.value()))
                    .set(PersonChangeset::from_person(&person, Utc::now()))
                    .returning(PersonRow::as_returning())
                    .get_result(conn)
                    .map_err(|e| match e {
                        diesel::result::Error::NotFound => {
                            RepositoryError::not_found(format!("Person {} not found", id))
                                .with_context(
                                    ErrorContext::new("save")
                                        .with_entity("person")
                                        .with_entity_id(id),
                                )
                        }
                        other => person_error("save")(other),
                    })?,
            };
            Ok(Person::from(row))
        })
        .await
    }

    async fn delete_by_id(&self, id: PersonId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            diesel::delete(persons::table.find(id.value()))
                .execute(conn)
                .map_err(person_error("delete_by_id"))?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: PersonId) -> RepositoryResult<Option<Person>> {
        self.with_conn(move |conn| {
            let row = persons::table
                .find(id.value())
                .select(PersonRow::as_select())
                .first(conn)
                .optional()
                .map_err(person_error("find_by_id"))?;
            Ok(row.map(Person::from))
        })
        .await
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Person>> {
        self.with_conn(|conn| {
            let rows = persons::table
                .select(PersonRow::as_select())
                .order(persons::id.asc())
                .load(conn)
                .map_err(person_error("find_all"))?;
            Ok(rows_to_persons(rows))
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<Person>> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            let row = persons::table
                .filter(persons::email.eq(&email))
                .select(PersonRow::as_select())
                .first(conn)
                .optional()
                .map_err(person_error("find_by_email"))?;
            Ok(row.map(Person::from))
        })
        .await
    }

    async fn find_by_last_name(&self, last_name: &str) -> RepositoryResult<Vec<Person>> {
        let last_name = last_name.to_string();
        self.with_conn(move |conn| {
            let rows = persons::table
                .filter(persons::last_name.eq(&last_name))
                .select(PersonRow::as_select())
                .order(persons::id.asc())
                .load(conn)
                .map_err(person_error("find_by_last_name"))?;
            Ok(rows_to_persons(rows))
        })
        .await
    }

    async fn find_by_age_greater_than(&self, age: i32) -> RepositoryResult<Vec<Person>> {
        self.with_conn(move |conn| {
            // NULL ages never satisfy `age > $1`
            let rows = persons::table
                .filter(persons::age.gt(age))
                .select(PersonRow::as_select())
                .order(persons::id.asc())
                .load(conn)
                .map_err(person_error("find_by_age_greater_than"))?;
            Ok(rows_to_persons(rows))
        })
        .await
    }

    async fn exists_by_email(&self, email: &str) -> RepositoryResult<bool> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            diesel::select(exists(persons::table.filter(persons::email.eq(&email))))
                .get_result::<bool>(conn)
                .map_err(person_error("exists_by_email"))
        })
        .await
    }

    async fn exists_by_id(&self, id: PersonId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::select(exists(persons::table.find(id.value())))
                .get_result::<bool>(conn)
                .map_err(person_error("exists_by_id"))
        })
        .await
    }
}
