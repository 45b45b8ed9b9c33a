//! Example consumer: registers two record types against an in-memory store,
//! generates the CRUD API, and serves it with the schema document at
//! /api/swagger.json.
//!
//! Run from repo root: `cargo run -p example-consumer`

use autoapi_sdk::{ApiGenerator, FieldDef, FieldKind, IntKind, MemoryStore, RecordSchema, Store};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;

fn user_type() -> FieldKind {
    FieldKind::record(
        RecordSchema::new("User")
            .field(FieldDef::new("ID", FieldKind::Int(IntKind::Uint)).json("id"))
            .field(FieldDef::new("Name", FieldKind::Str).json("name"))
            .field(FieldDef::new("Email", FieldKind::Str).json("email"))
            .field(FieldDef::new("Age", FieldKind::Int(IntKind::Int)).json("age,omitempty"))
            .field(FieldDef::new("CreatedAt", FieldKind::Time).json("created_at"))
            .field(FieldDef::new("UpdatedAt", FieldKind::Time).json("updated_at"))
            .field(
                FieldDef::new(
                    "Posts",
                    FieldKind::sequence(FieldKind::record(RecordSchema::named("Post"))),
                )
                .json("posts,omitempty"),
            ),
    )
}

fn post_type() -> FieldKind {
    FieldKind::record(
        RecordSchema::new("Post")
            .field(FieldDef::new("ID", FieldKind::Int(IntKind::Uint)).json("id"))
            .field(FieldDef::new("Title", FieldKind::Str).json("title"))
            .field(FieldDef::new("Content", FieldKind::Str).json("content"))
            .field(FieldDef::new("UserID", FieldKind::Int(IntKind::Uint)).json("user_id"))
            .field(
                FieldDef::new("User", FieldKind::record(RecordSchema::named("User")))
                    .json("user,omitempty"),
            )
            .field(FieldDef::new("CreatedAt", FieldKind::Time).json("created_at"))
            .field(FieldDef::new("UpdatedAt", FieldKind::Time).json("updated_at")),
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("autoapi_sdk=debug")),
        )
        .init();

    let store = Arc::new(MemoryStore::new());
    let mut generator = ApiGenerator::new(store.clone());
    generator.register_model(&user_type(), Some("user"))?;
    generator.register_model(&post_type(), Some("post"))?;
    generator.generate_api()?;
    let app = generator.into_router();

    seed(store.as_ref()).await?;

    let addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".into());
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn seed(store: &MemoryStore) -> Result<(), Box<dyn std::error::Error>> {
    let ann = store
        .create("user", json!({"name": "Ann", "email": "ann@example.com"}))
        .await?;
    store
        .create(
            "post",
            json!({"title": "Hello", "content": "First post", "user_id": ann["id"]}),
        )
        .await?;
    Ok(())
}
