//! Route synthesis: walk the registry once and bind CRUD and relationship
//! routes for every registered model.

use crate::case::to_snake_case;
use crate::error::AppError;
use crate::handlers::entity;
use crate::handlers::related::{related, RelatedRoute};
use crate::model::{FieldKind, ModelAnalyzer, ModelInfo};
use crate::routes::{common_routes, docs_routes};
use crate::state::AppState;
use crate::store::Store;
use axum::routing::get;
use axum::{Extension, Router};
use std::collections::HashSet;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Two-phase API generator. Registration (register models, synthesize
/// routes) must complete before the router starts serving; afterwards the
/// registry is only read.
pub struct ApiGenerator {
    state: AppState,
    /// Paths already bound, so re-running synthesis adds no duplicates and
    /// colliding relationship paths resolve to the first registration.
    registered_paths: HashSet<String>,
    router: Router,
}

impl ApiGenerator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        ApiGenerator {
            state: AppState::new(store),
            registered_paths: HashSet::new(),
            router: Router::new(),
        }
    }

    /// Analyze and register a record type. `resource_name` overrides the
    /// snake-case name derived from the type name.
    pub fn register_model(
        &mut self,
        ty: &FieldKind,
        resource_name: Option<&str>,
    ) -> Result<Arc<ModelInfo>, AppError> {
        let info = ModelAnalyzer::analyze(ty, resource_name)?;
        let mut registry = self
            .state
            .registry
            .write()
            .map_err(|_| AppError::Internal("model registry lock poisoned".into()))?;
        Ok(registry.insert(info))
    }

    /// Bind routes for every registered model. Already-bound paths are
    /// skipped silently, so repeated calls add nothing.
    pub fn generate_api(&mut self) -> Result<(), AppError> {
        let models: Vec<Arc<ModelInfo>> = self.state.models()?.models().cloned().collect();
        for model in &models {
            self.generate_model_api(model);
        }
        Ok(())
    }

    fn generate_model_api(&mut self, model: &Arc<ModelInfo>) {
        let base_path = format!("/api/{}", model.plural_name);

        if self.bind(&base_path) {
            let item_path = format!("{}/:id", base_path);
            self.bind(&item_path);
            let crud = Router::new()
                .route(&base_path, get(entity::list).post(entity::create))
                .route(
                    &item_path,
                    get(entity::read)
                        .put(entity::update)
                        .delete(entity::delete),
                )
                .layer(Extension(Arc::clone(model)))
                .with_state(self.state.clone());
            self.merge(crud);
        }

        for fk in &model.foreign_keys {
            if fk.related_model.is_empty() {
                continue;
            }
            let related_path = format!("{}/:id/{}", base_path, to_snake_case(&fk.related_model));
            if !self.bind(&related_path) {
                continue;
            }
            let route = Router::new()
                .route(&related_path, get(related))
                .layer(Extension(RelatedRoute {
                    model: Arc::clone(model),
                    fk: fk.clone(),
                }))
                .with_state(self.state.clone());
            self.merge(route);
        }
    }

    /// Finalize: merge the operational routes and apply the ambient layers.
    /// The registry is read-only from here on.
    pub fn into_router(self) -> Router {
        let ApiGenerator { state, router, .. } = self;
        Router::new()
            .merge(router)
            .merge(common_routes())
            .merge(docs_routes(state))
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Paths bound so far, for introspection and tests.
    pub fn registered_paths(&self) -> &HashSet<String> {
        &self.registered_paths
    }

    fn bind(&mut self, path: &str) -> bool {
        let newly_bound = self.registered_paths.insert(path.to_string());
        if newly_bound {
            tracing::debug!(path, "bind route");
        } else {
            tracing::debug!(path, "path already bound, skipping");
        }
        newly_bound
    }

    fn merge(&mut self, routes: Router) {
        self.router = std::mem::take(&mut self.router).merge(routes);
    }
}
