//! Generated CRUD handlers: list, read, create, update, delete.
//! Each route carries its model metadata as an extension, captured when the
//! synthesizer binds the route.

use crate::error::AppError;
use crate::model::{FieldKind, ModelInfo};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;
use std::sync::Arc;

pub async fn list(
    State(state): State<AppState>,
    Extension(model): Extension<Arc<ModelInfo>>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let rows = state.store.find_all(&model.resource_name).await?;
    Ok((StatusCode::OK, Json(Value::Array(rows))))
}

pub async fn read(
    State(state): State<AppState>,
    Extension(model): Extension<Arc<ModelInfo>>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let row = fetch_instance(&state, &model, &id).await?;
    Ok((StatusCode::OK, Json(row)))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(model): Extension<Arc<ModelInfo>>,
    body: Bytes,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let instance = decode_body(&model, &body)?;
    let created = state.store.create(&model.resource_name, instance).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(model): Extension<Arc<ModelInfo>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let existing = fetch_instance(&state, &model, &id).await?;
    let patch = decode_body(&model, &body)?;
    let merged = merge_instance(existing, patch);
    let saved = state.store.save(&model.resource_name, merged).await?;
    Ok((StatusCode::OK, Json(saved)))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(model): Extension<Arc<ModelInfo>>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let existing = fetch_instance(&state, &model, &id).await?;
    state.store.delete(&model.resource_name, &existing).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Resolve one instance by path id. String identifiers filter on the `id`
/// column by exact equality; anything else is a primary-key lookup.
pub(crate) async fn fetch_instance(
    state: &AppState,
    model: &ModelInfo,
    id: &str,
) -> Result<Value, AppError> {
    if id.is_empty() {
        return Err(AppError::BadRequest("id is required".into()));
    }
    if model.has_string_id() {
        let rows = state
            .store
            .find_where(&model.resource_name, "id", &Value::String(id.to_string()))
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("record not found".into()))
    } else {
        let id = parse_numeric_id(id)?;
        Ok(state.store.find_by_id(&model.resource_name, id).await?)
    }
}

pub(crate) fn parse_numeric_id(id: &str) -> Result<u64, AppError> {
    id.parse()
        .map_err(|_| AppError::BadRequest("invalid id format".into()))
}

/// Parse a request body and check known fields against their declared kinds.
/// Unknown keys pass through untouched.
fn decode_body(model: &ModelInfo, body: &Bytes) -> Result<Value, AppError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let Value::Object(obj) = &value else {
        return Err(AppError::BadRequest("request body must be a JSON object".into()));
    };
    for field in &model.fields {
        if let Some(v) = obj.get(&field.json_name) {
            check_kind(&field.json_name, v, &field.kind)?;
        }
    }
    Ok(value)
}

fn check_kind(name: &str, value: &Value, kind: &FieldKind) -> Result<(), AppError> {
    if value.is_null() {
        return Ok(());
    }
    let ok = match kind {
        FieldKind::Bool => value.is_boolean(),
        FieldKind::Int(_) => value.is_i64() || value.is_u64(),
        FieldKind::Float(_) => value.is_number(),
        FieldKind::Str | FieldKind::Time => value.is_string(),
        FieldKind::Record(_) | FieldKind::Mapping(_) => value.is_object(),
        FieldKind::Sequence(_) => value.is_array(),
        FieldKind::Pointer(target) => return check_kind(name, value, target),
    };
    if ok {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "field '{}' must be a {}",
            name,
            kind.kind_name()
        )))
    }
}

/// Merge body keys over the existing instance; absent fields stay unchanged.
fn merge_instance(existing: Value, patch: Value) -> Value {
    match (existing, patch) {
        (Value::Object(mut base), Value::Object(changes)) => {
            for (k, v) in changes {
                base.insert(k, v);
            }
            Value::Object(base)
        }
        (_, patch) => patch,
    }
}
