//! Generated relationship handler: list records of one resource filtered by
//! their association to a parent instance of another.

use crate::error::AppError;
use crate::handlers::entity::parse_numeric_id;
use crate::model::{ForeignKeyInfo, ModelInfo};
use crate::state::AppState;
use crate::store::StoreError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;
use std::sync::Arc;

/// Context captured when the synthesizer binds a relationship route.
#[derive(Clone)]
pub struct RelatedRoute {
    pub model: Arc<ModelInfo>,
    pub fk: ForeignKeyInfo,
}

pub async fn related(
    State(state): State<AppState>,
    Extension(route): Extension<RelatedRoute>,
    Path(id): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let parent_id = parse_numeric_id(&id)?;
    state
        .store
        .find_by_id(&route.model.resource_name, parent_id)
        .await
        .map_err(|err| match err {
            StoreError::NotFound => AppError::NotFound("parent record not found".into()),
            other => other.into(),
        })?;

    // Models may register in any order, so the target resolves per request,
    // not when the route binds. The guard is released before the store call.
    let related_resource = {
        let models = state.models()?;
        match models.by_type(&route.fk.related_model) {
            Some(related) => related.resource_name.clone(),
            None => {
                return Err(AppError::Internal(format!(
                    "related model {} not registered",
                    route.fk.related_model
                )))
            }
        }
    };

    let rows = match &route.fk.relationship_column {
        Some(column) => {
            state
                .store
                .find_where(&related_resource, column, &Value::Number(parent_id.into()))
                .await?
        }
        None => {
            let column = format!("{}ID", route.model.resource_name);
            state
                .store
                .find_where(&related_resource, &column, &Value::String(id))
                .await?
        }
    };
    Ok((StatusCode::OK, Json(Value::Array(rows))))
}
