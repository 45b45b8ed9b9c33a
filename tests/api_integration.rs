//! HTTP-level integration tests for the generated API: CRUD status codes,
//! merge-semantics updates, relationship traversal, and error bodies.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use autoapi_sdk::{
    ApiGenerator, FieldDef, FieldKind, IntKind, MemoryStore, RecordSchema, Store, StoreError,
};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

// ── Model fixtures ─────────────────────────────────────────────

fn user_type() -> FieldKind {
    FieldKind::record(
        RecordSchema::new("User")
            .field(FieldDef::new("ID", FieldKind::Int(IntKind::Uint)).json("id"))
            .field(FieldDef::new("Name", FieldKind::Str).json("name"))
            .field(FieldDef::new("Email", FieldKind::Str).json("email"))
            .field(FieldDef::new("Age", FieldKind::Int(IntKind::Int)).json("age,omitempty")),
    )
}

fn post_type() -> FieldKind {
    FieldKind::record(
        RecordSchema::new("Post")
            .field(FieldDef::new("ID", FieldKind::Int(IntKind::Uint)).json("id"))
            .field(FieldDef::new("Title", FieldKind::Str).json("title"))
            .field(FieldDef::new("UserID", FieldKind::Int(IntKind::Uint)).json("user_id"))
            .field(
                FieldDef::new("User", FieldKind::record(RecordSchema::named("User")))
                    .json("user,omitempty"),
            ),
    )
}

fn build_app(store: Arc<dyn Store>, types: &[FieldKind]) -> axum::Router {
    let mut generator = ApiGenerator::new(store);
    for ty in types {
        generator.register_model(ty, None).expect("register model");
    }
    generator.generate_api().expect("generate api");
    generator.into_router()
}

// ── Request helpers ────────────────────────────────────────────

async fn send(app: axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let raw = body.map(|v| v.to_string());
    send_raw(app, method, uri, raw.as_deref()).await
}

async fn send_raw(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(raw) => builder
            .header("content-type", "application/json")
            .body(Body::from(raw.to_string()))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    };
    let response = app.oneshot(request).await.expect("send request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse body")
    };
    (status, value)
}

// ── CRUD ───────────────────────────────────────────────────────

#[tokio::test]
async fn create_list_and_read_round_trip() {
    let store = Arc::new(MemoryStore::new());
    let app = build_app(store, &[user_type()]);

    let (status, created) = send(
        app.clone(),
        "POST",
        "/api/users",
        Some(json!({"name": "Ann", "email": "ann@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], json!(1));
    assert_eq!(created["name"], json!("Ann"));

    let (status, listed) = send(app.clone(), "GET", "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, fetched) = send(app, "GET", "/api/users/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["email"], json!("ann@example.com"));
}

#[tokio::test]
async fn reading_an_unknown_id_returns_not_found_with_error_body() {
    let app = build_app(Arc::new(MemoryStore::new()), &[user_type()]);
    let (status, body) = send(app, "GET", "/api/users/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "record not found"}));
}

#[tokio::test]
async fn a_malformed_numeric_id_is_a_bad_request() {
    let app = build_app(Arc::new(MemoryStore::new()), &[user_type()]);
    for method in ["GET", "PUT", "DELETE"] {
        let body = (method == "PUT").then(|| json!({"name": "x"}));
        let (status, response) =
            send(app.clone(), method, "/api/users/ninety-nine", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", method);
        assert!(response["error"].is_string());
    }
}

#[tokio::test]
async fn update_merges_fields_absent_from_the_body() {
    let store = Arc::new(MemoryStore::new());
    let app = build_app(store, &[user_type()]);
    send(
        app.clone(),
        "POST",
        "/api/users",
        Some(json!({"name": "Ann", "email": "ann@example.com", "age": 40})),
    )
    .await;

    let (status, updated) = send(
        app.clone(),
        "PUT",
        "/api/users/1",
        Some(json!({"name": "Anne"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], json!("Anne"));
    assert_eq!(updated["email"], json!("ann@example.com"));
    assert_eq!(updated["age"], json!(40));
}

#[tokio::test]
async fn delete_returns_no_content_and_removes_the_record() {
    let app = build_app(Arc::new(MemoryStore::new()), &[user_type()]);
    send(
        app.clone(),
        "POST",
        "/api/users",
        Some(json!({"name": "Ann", "email": "a@example.com"})),
    )
    .await;

    let (status, body) = send(app.clone(), "DELETE", "/api/users/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(app, "GET", "/api/users/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_request_bodies_surface_the_parser_error() {
    let app = build_app(Arc::new(MemoryStore::new()), &[user_type()]);
    let (status, body) = send_raw(app, "POST", "/api/users", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn kind_mismatches_in_the_body_are_bad_requests() {
    let app = build_app(Arc::new(MemoryStore::new()), &[user_type()]);
    let (status, body) = send(
        app,
        "POST",
        "/api/users",
        Some(json!({"name": 7, "email": "a@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));
}

// ── Update must not reach the store for missing records ────────

struct RecordingStore {
    inner: MemoryStore,
    saves: AtomicUsize,
}

#[async_trait::async_trait]
impl Store for RecordingStore {
    async fn find_all(&self, resource: &str) -> Result<Vec<Value>, StoreError> {
        self.inner.find_all(resource).await
    }

    async fn find_by_id(&self, resource: &str, id: u64) -> Result<Value, StoreError> {
        self.inner.find_by_id(resource, id).await
    }

    async fn find_where(
        &self,
        resource: &str,
        column: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        self.inner.find_where(resource, column, value).await
    }

    async fn create(&self, resource: &str, instance: Value) -> Result<Value, StoreError> {
        self.inner.create(resource, instance).await
    }

    async fn save(&self, resource: &str, instance: Value) -> Result<Value, StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(resource, instance).await
    }

    async fn delete(&self, resource: &str, instance: &Value) -> Result<(), StoreError> {
        self.inner.delete(resource, instance).await
    }
}

#[tokio::test]
async fn updating_an_unknown_id_never_invokes_save() {
    let store = Arc::new(RecordingStore {
        inner: MemoryStore::new(),
        saves: AtomicUsize::new(0),
    });
    let app = build_app(store.clone(), &[user_type()]);

    let (status, _) = send(app, "PUT", "/api/users/99", Some(json!({"name": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(store.saves.load(Ordering::SeqCst), 0);
}

// ── Relationship traversal ─────────────────────────────────────

#[tokio::test]
async fn relationship_route_filters_by_the_explicit_column() {
    let store = Arc::new(MemoryStore::new());
    let app = build_app(store.clone(), &[user_type(), post_type()]);

    send(
        app.clone(),
        "POST",
        "/api/posts",
        Some(json!({"title": "Hello", "user_id": 1})),
    )
    .await;
    // The explicit relationship column is the declared field name.
    store
        .create("user", json!({"name": "Ann", "UserID": 1}))
        .await
        .unwrap();
    store
        .create("user", json!({"name": "Bob", "UserID": 2}))
        .await
        .unwrap();

    let (status, body) = send(app, "GET", "/api/posts/1/user", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("Ann"));
}

#[tokio::test]
async fn relationship_route_falls_back_to_the_conventional_column() {
    let author = FieldKind::record(
        RecordSchema::new("Author")
            .field(FieldDef::new("ID", FieldKind::Int(IntKind::Uint)).json("id"))
            .field(FieldDef::new("Name", FieldKind::Str).json("name"))
            .field(
                FieldDef::new("Book", FieldKind::record(RecordSchema::named("Book")))
                    .json("book,omitempty"),
            ),
    );
    let book = FieldKind::record(
        RecordSchema::new("Book")
            .field(FieldDef::new("ID", FieldKind::Int(IntKind::Uint)).json("id"))
            .field(FieldDef::new("Title", FieldKind::Str).json("title")),
    );
    let store = Arc::new(MemoryStore::new());
    let app = build_app(store.clone(), &[author, book]);

    send(app.clone(), "POST", "/api/authors", Some(json!({"name": "Ann"}))).await;
    store
        .create("book", json!({"title": "One", "authorID": 1}))
        .await
        .unwrap();
    store
        .create("book", json!({"title": "Two", "authorID": 2}))
        .await
        .unwrap();

    let (status, body) = send(app, "GET", "/api/authors/1/book", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], json!("One"));
}

#[tokio::test]
async fn relationship_route_with_an_unregistered_target_is_an_internal_error() {
    let app = build_app(Arc::new(MemoryStore::new()), &[post_type()]);
    send(app.clone(), "POST", "/api/posts", Some(json!({"title": "Hello"}))).await;

    let (status, body) = send(app, "GET", "/api/posts/1/user", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "related model User not registered"}));
}

#[tokio::test]
async fn relationship_route_reports_a_missing_parent() {
    let app = build_app(Arc::new(MemoryStore::new()), &[user_type(), post_type()]);
    let (status, body) = send(app, "GET", "/api/posts/42/user", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "parent record not found"}));
}

// ── String identifiers ─────────────────────────────────────────

#[tokio::test]
async fn string_id_models_resolve_by_exact_match() {
    let session = FieldKind::record(
        RecordSchema::new("Session")
            .field(FieldDef::new("ID", FieldKind::Str).json("id"))
            .field(FieldDef::new("Token", FieldKind::Str).json("token")),
    );
    let app = build_app(Arc::new(MemoryStore::new()), &[session]);

    let (status, created) = send(
        app.clone(),
        "POST",
        "/api/sessions",
        Some(json!({"id": "", "token": "abc"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let (status, fetched) = send(app.clone(), "GET", &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["token"], json!("abc"));

    let (status, _) = send(app, "GET", "/api/sessions/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Operational routes ─────────────────────────────────────────

#[tokio::test]
async fn health_and_schema_document_are_served() {
    let app = build_app(Arc::new(MemoryStore::new()), &[user_type(), post_type()]);

    let (status, body) = send(app.clone(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, doc) = send(app, "GET", "/api/swagger.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["swagger"], json!("2.0"));
    assert!(doc["definitions"]["User"].is_object());
    assert!(doc["paths"]["/api/posts/{id}/user"].is_object());
    assert!(doc["paths"]["/api/users"].is_object());
}
