use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use contacts_router::model::Document;
use contacts_router::server::{build_router, AppState, ServerRoutes};
use contacts_router::store::mock::MockStore;
use contacts_router::store::{object_id, StoreActor, StoreError};

/// Router over a fresh in-memory store.
fn memory_app() -> Router {
    let (actor, client) = StoreActor::new(32, object_id);
    tokio::spawn(actor.run());
    let state = AppState::new(Arc::new(client), Duration::from_secs(5)).unwrap();
    build_router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

#[tokio::test]
async fn test_create_then_list_and_show() {
    let app = memory_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/contacts",
        Some(json!({"firstname": "Ada", "lastname": "Lovelace", "age": 28})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created = json_body(&body);
    let id = created["_id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 24);
    assert_eq!(created["firstname"], "Ada");

    let (status, body) = send(&app, Method::GET, "/api/contacts", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = json_body(&body);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0], created);

    let (status, body) = send(&app, Method::GET, &format!("/api/contacts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), created);
}

#[tokio::test]
async fn test_list_empty_collection() {
    let app = memory_app();
    let (status, body) = send(&app, Method::GET, "/api/contacts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!([]));
}

#[tokio::test]
async fn test_client_supplied_id_is_ignored_on_create() {
    let app = memory_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/contacts",
        Some(json!({"_id": "chosen-by-client", "firstname": "Grace", "lastname": "Hopper", "age": 85})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(json_body(&body)["_id"], "chosen-by-client");
}

#[tokio::test]
async fn test_update_and_destroy() {
    let app = memory_app();
    let (_, body) = send(
        &app,
        Method::POST,
        "/api/contacts",
        Some(json!({"firstname": "Ada", "lastname": "Lovelace", "age": 28})),
    )
    .await;
    let id = json_body(&body)["_id"].as_str().unwrap().to_string();
    let item = format!("/api/contacts/{id}");

    let (status, body) = send(
        &app,
        Method::PUT,
        &item,
        Some(json!({"firstname": "Ada", "lastname": "King", "age": 29})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated = json_body(&body);
    assert_eq!(updated["_id"], id.as_str());
    assert_eq!(updated["lastname"], "King");

    let (status, body) = send(&app, Method::DELETE, &item, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), updated);

    let (status, _) = send(&app, Method::GET, &item, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let app = memory_app();
    for method in [Method::GET, Method::DELETE] {
        let (status, body) = send(&app, method, "/api/contacts/000000000000000000000000", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json_body(&body)["error"]["code"], "not_found");
    }

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/contacts/000000000000000000000000",
        Some(json!({"firstname": "Nobody", "lastname": "Here", "age": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = memory_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/contacts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::POST, "/api/contacts", Some(json!(["not", "an", "object"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_undecodable_id_is_bad_request() {
    let app = memory_app();
    for method in [Method::GET, Method::DELETE] {
        let (status, body) = send(&app, method.clone(), "/api/contacts/%FF", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method}");
        assert_eq!(json_body(&body)["error"]["code"], "bad_request");
    }

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/contacts/%FF",
        Some(json!({"firstname": "Ada", "lastname": "Lovelace", "age": 28})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_method_lists_allowed_methods() {
    let app = memory_app();
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/contacts")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let allow = response.headers()[header::ALLOW].to_str().unwrap().to_string();
    assert!(allow.contains("GET"), "allow header was {allow}");
    assert!(allow.contains("POST"), "allow header was {allow}");
}

#[tokio::test]
async fn test_store_failure_is_service_unavailable() {
    let mock = MockStore::new();
    mock.expect_find_all()
        .return_err(StoreError::Unavailable("connection refused".into()));

    let state = AppState::new(Arc::new(mock.client()), Duration::from_secs(5)).unwrap();
    let app = build_router(state);

    let (status, body) = send(&app, Method::GET, "/api/contacts", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(&body)["error"]["code"], "store_unavailable");

    mock.verify();
}

#[tokio::test]
async fn test_stalled_store_times_out() {
    // No expectation queued: the mock parks the request and never answers.
    let mock = MockStore::new();
    let state = AppState::new(Arc::new(mock.client()), Duration::from_millis(50)).unwrap();
    let app = build_router(state);

    let (status, body) = send(&app, Method::GET, "/api/contacts/abc", None).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json_body(&body)["error"]["code"], "timeout");
}

#[tokio::test]
async fn test_show_serves_stored_document_verbatim() {
    let mock = MockStore::new();
    let mut stored = Document::new();
    stored.set_id("abc");
    stored.insert("firstname", "Ada").insert("nickname", "Countess");
    mock.expect_find_by_id().return_ok(Some(stored.clone()));

    let state = AppState::new(Arc::new(mock.client()), Duration::from_secs(5)).unwrap();
    let app = build_router(state);

    let (status, body) = send(&app, Method::GET, "/api/contacts/abc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), serde_json::to_value(&stored).unwrap());
    mock.verify();
}

#[tokio::test]
async fn test_partials_are_served_by_name() {
    let app = memory_app();
    for name in ["list", "show", "new", "edit"] {
        let (status, body) = send(&app, Method::GET, &format!("/partials/{name}"), None).await;
        assert_eq!(status, StatusCode::OK, "partial {name}");
        assert!(!body.is_empty());
        assert!(!String::from_utf8(body).unwrap().contains("<!DOCTYPE html>"));
    }
}

#[tokio::test]
async fn test_unknown_partial_is_not_found() {
    let app = memory_app();
    for path in ["/partials/secret", "/partials/..%2F..%2FCargo.toml"] {
        let (status, _) = send(&app, Method::GET, path, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "path {path}");
    }
}

#[tokio::test]
async fn test_shell_answers_every_other_get() {
    let app = memory_app();
    for path in ["/", "/contacts", "/contacts/123/edit", "/anything/at/all"] {
        let (status, body) = send(&app, Method::GET, path, None).await;
        assert_eq!(status, StatusCode::OK, "path {path}");
        assert!(String::from_utf8(body).unwrap().contains("<!DOCTYPE html>"));
    }
}

#[tokio::test]
async fn test_shell_registered_first_swallows_partials() {
    let (actor, client) = StoreActor::new(8, object_id);
    tokio::spawn(actor.run());

    let mut routes = ServerRoutes::new();
    routes.shell().unwrap().partials().unwrap().api("/api/contacts").unwrap();
    let app = build_router(AppState::with_routes(Arc::new(client), routes, Duration::from_secs(5)));

    let (status, body) = send(&app, Method::GET, "/partials/edit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("<!DOCTYPE html>"));

    let (status, body) = send(&app, Method::GET, "/api/contacts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("<!DOCTYPE html>"));
}
