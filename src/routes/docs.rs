//! Documentation route: the generated schema document for the live registry.

use crate::error::AppError;
use crate::state::AppState;
use crate::swagger::SwaggerGenerator;
use axum::{extract::State, routing::get, Json, Router};

async fn swagger_json(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let models = state.models()?;
    Ok(Json(SwaggerGenerator::new(&models).document()))
}

/// GET /api/swagger.json, regenerated per request from the registry.
pub fn docs_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/swagger.json", get(swagger_json))
        .with_state(state)
}
