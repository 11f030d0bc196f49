//! End-to-end tests for the REST API, driven through the router with
//! `tower::ServiceExt::oneshot`.

#![cfg(feature = "http-server")]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use person_registry::config::ValidationSettings;
use person_registry::db::{LocalRepository, PersonRepository};
use person_registry::http::{create_router, create_router_with_limit, AppState};

fn app(repo: &LocalRepository) -> Router {
    let repo = Arc::new(repo.clone()) as Arc<dyn PersonRepository>;
    create_router(AppState::new(repo))
}

fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn ann_lee() -> Value {
    json!({"firstName": "Ann", "lastName": "Lee", "email": "ann@x.com", "age": 30})
}

#[tokio::test]
async fn test_ann_lee_scenario() {
    let repo = LocalRepository::new();
    let app = app(&repo);

    let (status, created) =
        send_json(&app, json_request(Method::POST, "/api/persons", &ann_lee())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["firstName"], "Ann");
    assert_eq!(created["age"], 30);
    let id = created["id"].as_i64().unwrap();

    let (status, body) =
        send_json(&app, json_request(Method::POST, "/api/persons", &ann_lee())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE_EMAIL");
    assert_eq!(body["message"], "Person with email ann@x.com already exists");

    let (status, found) = send_json(
        &app,
        empty_request(Method::GET, "/api/persons/search/lastname?lastname=Lee"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(found.as_array().unwrap().iter().any(|p| p["id"] == id));

    let (status, older) =
        send_json(&app, empty_request(Method::GET, "/api/persons/filter/age?minAge=25")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(older.as_array().unwrap().iter().any(|p| p["id"] == id));

    let mut changes = ann_lee();
    changes["age"] = json!(31);
    let (status, updated) = send_json(
        &app,
        json_request(Method::PUT, &format!("/api/persons/{}", id), &changes),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["age"], 31);
    assert_eq!(updated["id"], id);

    let (status, body) = send(&app, empty_request(Method::DELETE, &format!("/api/persons/{}", id))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, body) = send(&app, empty_request(Method::GET, &format!("/api/persons/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());
    assert_eq!(repo.person_count(), 0);
}

#[tokio::test]
async fn test_list_and_get_by_email() {
    let repo = LocalRepository::new();
    let app = app(&repo);

    send(&app, json_request(Method::POST, "/api/persons", &ann_lee())).await;
    send(
        &app,
        json_request(
            Method::POST,
            "/api/persons",
            &json!({"firstName": "Bob", "lastName": "Stone", "email": "bob@x.com", "phoneNumber": "555-0101"}),
        ),
    )
    .await;

    let (status, all) = send_json(&app, empty_request(Method::GET, "/api/persons")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (status, bob) =
        send_json(&app, empty_request(Method::GET, "/api/persons/email/bob@x.com")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bob["phoneNumber"], "555-0101");
    assert_eq!(bob["age"], Value::Null);

    let (status, body) =
        send(&app, empty_request(Method::GET, "/api/persons/email/nobody@x.com")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_create_ignores_id_in_body() {
    let repo = LocalRepository::new();
    let app = app(&repo);

    let mut payload = ann_lee();
    payload["id"] = json!(99);
    let (status, created) =
        send_json(&app, json_request(Method::POST, "/api/persons", &payload)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);
}

#[tokio::test]
async fn test_validation_errors_are_reported_before_store_access() {
    let repo = LocalRepository::new();
    let app = app(&repo);

    let (status, body) = send_json(
        &app,
        json_request(
            Method::POST,
            "/api/persons",
            &json!({"firstName": "", "lastName": "Lee", "email": "not-an-email", "age": -4}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let details = body["details"].as_str().unwrap();
    assert!(details.contains("firstName"));
    assert!(details.contains("email"));
    assert!(details.contains("age"));
    assert_eq!(repo.person_count(), 0);
}

#[tokio::test]
async fn test_require_age_setting() {
    let repo = LocalRepository::new();
    let state = AppState::with_validation(
        Arc::new(repo.clone()),
        ValidationSettings {
            require_age: true,
            max_age: 150,
        },
    );
    let app = create_router(state);

    let (status, body) = send_json(
        &app,
        json_request(
            Method::POST,
            "/api/persons",
            &json!({"firstName": "Ann", "lastName": "Lee", "email": "ann@x.com"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("age is required"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app(&LocalRepository::new());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/persons")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"firstName\": "))
        .unwrap();
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = send_json(
        &app,
        json_request(
            Method::POST,
            "/api/persons",
            &json!({"firstName": "Ann", "lastName": "Lee", "email": "ann@x.com", "age": "thirty"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_bad_path_and_query_parameters() {
    let app = app(&LocalRepository::new());

    let (status, body) = send_json(&app, empty_request(Method::GET, "/api/persons/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) =
        send_json(&app, empty_request(Method::GET, "/api/persons/search/lastname")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, _) =
        send_json(&app, empty_request(Method::GET, "/api/persons/filter/age?minAge=old")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(&app, empty_request(Method::GET, "/api/persons/filter/age")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_search_results() {
    let app = app(&LocalRepository::new());

    let (status, found) = send_json(
        &app,
        empty_request(Method::GET, "/api/persons/search/lastname?lastname=Nobody"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, json!([]));
}

#[tokio::test]
async fn test_update_and_delete_missing_are_not_found() {
    let app = app(&LocalRepository::new());

    let (status, body) =
        send(&app, json_request(Method::PUT, "/api/persons/42", &ann_lee())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());

    let (status, body) = send(&app, empty_request(Method::DELETE, "/api/persons/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_update_to_taken_email_is_rejected() {
    let repo = LocalRepository::new();
    let app = app(&repo);

    send(&app, json_request(Method::POST, "/api/persons", &ann_lee())).await;
    let (_, bob) = send_json(
        &app,
        json_request(
            Method::POST,
            "/api/persons",
            &json!({"firstName": "Bob", "lastName": "Stone", "email": "bob@x.com"}),
        ),
    )
    .await;

    let (status, body) = send_json(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/persons/{}", bob["id"]),
            &json!({"firstName": "Bob", "lastName": "Stone", "email": "ann@x.com"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE_EMAIL");
    assert_eq!(body["message"], "Email ann@x.com is already in use");

    let (_, stored) = send_json(
        &app,
        empty_request(Method::GET, &format!("/api/persons/{}", bob["id"])),
    )
    .await;
    assert_eq!(stored["email"], "bob@x.com");
}

#[tokio::test]
async fn test_store_failure_is_repository_error() {
    let repo = LocalRepository::new();
    let app = app(&repo);
    repo.set_healthy(false);

    let (status, body) = send_json(&app, empty_request(Method::GET, "/api/persons")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "REPOSITORY_ERROR");
}

#[tokio::test]
async fn test_health_endpoint() {
    let repo = LocalRepository::new();
    let app = app(&repo);

    let (status, body) = send_json(&app, empty_request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    repo.set_healthy(false);
    let (_, body) = send_json(&app, empty_request(Method::GET, "/health")).await;
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_body_limit() {
    let repo = LocalRepository::new();
    let app = create_router_with_limit(AppState::new(Arc::new(repo.clone())), 64);

    let mut payload = ann_lee();
    payload["phoneNumber"] = json!("5".repeat(256));
    let (status, body) =
        send_json(&app, json_request(Method::POST, "/api/persons", &payload)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(repo.person_count(), 0);
}

#[tokio::test]
async fn test_cors_headers_present() {
    let app = app(&LocalRepository::new());

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/persons")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
