//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business rules. Extractor rejections are taken as
//! `Result` so malformed input surfaces as [`AppError::BadRequest`] with the
//! same JSON error body as every other failure.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use super::dto::{AgeFilterQuery, HealthResponse, LastNameQuery, PersonRequest};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::{Person, PersonId};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Unwrap a JSON body and run field validation.
fn validated_person(
    state: &AppState,
    body: Result<Json<PersonRequest>, JsonRejection>,
) -> Result<Person, AppError> {
    let Json(request) = body?;
    request
        .validate(&state.validation)
        .map_err(AppError::Validation)?;
    Ok(request.into_person())
}

fn person_id(path: Result<Path<i64>, PathRejection>) -> Result<PersonId, AppError> {
    let Path(id) = path?;
    Ok(PersonId::new(id))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Person CRUD
// =============================================================================

/// POST /api/persons
pub async fn create_person(
    State(state): State<AppState>,
    body: Result<Json<PersonRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Person>), AppError> {
    let person = validated_person(&state, body)?;
    let created = db_services::create_person(state.repository.as_ref(), person).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/persons
pub async fn list_persons(State(state): State<AppState>) -> HandlerResult<Vec<Person>> {
    let persons = db_services::get_all_persons(state.repository.as_ref()).await?;
    Ok(Json(persons))
}

/// GET /api/persons/{id}
pub async fn get_person(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> HandlerResult<Person> {
    let id = person_id(path)?;
    db_services::get_person_by_id(state.repository.as_ref(), id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// GET /api/persons/email/{email}
pub async fn get_person_by_email(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> HandlerResult<Person> {
    let Path(email) = path?;
    db_services::get_person_by_email(state.repository.as_ref(), &email)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// PUT /api/persons/{id}
///
/// Replaces every mutable field. Omitted `age` or `phoneNumber` clear the
/// stored value.
pub async fn update_person(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<PersonRequest>, JsonRejection>,
) -> HandlerResult<Person> {
    let id = person_id(path)?;
    let details = validated_person(&state, body)?;
    let updated = db_services::update_person(state.repository.as_ref(), id, details).await?;
    Ok(Json(updated))
}

/// DELETE /api/persons/{id}
pub async fn delete_person(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = person_id(path)?;
    db_services::delete_person(state.repository.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Queries
// =============================================================================

/// GET /api/persons/search/lastname?lastname=...
pub async fn search_by_last_name(
    State(state): State<AppState>,
    query: Result<Query<LastNameQuery>, QueryRejection>,
) -> HandlerResult<Vec<Person>> {
    let Query(query) = query?;
    let persons =
        db_services::search_by_last_name(state.repository.as_ref(), &query.lastname).await?;
    Ok(Json(persons))
}

/// GET /api/persons/filter/age?minAge=...
///
/// Persons strictly older than `minAge`.
pub async fn filter_by_age(
    State(state): State<AppState>,
    query: Result<Query<AgeFilterQuery>, QueryRejection>,
) -> HandlerResult<Vec<Person>> {
    let Query(query) = query?;
    let persons =
        db_services::get_persons_older_than(state.repository.as_ref(), query.min_age).await?;
    Ok(Json(persons))
}
