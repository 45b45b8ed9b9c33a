//! Shared application state for all generated routes.

use crate::error::AppError;
use crate::model::ModelRegistry;
use crate::store::Store;
use std::sync::{Arc, RwLock, RwLockReadGuard};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Written only during the registration phase; read-only while serving.
    pub registry: Arc<RwLock<ModelRegistry>>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        AppState {
            store,
            registry: Arc::new(RwLock::new(ModelRegistry::new())),
        }
    }

    /// Read access to the registry for request handling.
    pub fn models(&self) -> Result<RwLockReadGuard<'_, ModelRegistry>, AppError> {
        self.registry
            .read()
            .map_err(|_| AppError::Internal("model registry lock poisoned".into()))
    }
}
