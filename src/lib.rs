//! Autoapi SDK: model-driven REST backend library.
//!
//! Register record type descriptors once; CRUD routes, relationship-traversal
//! routes, and a machine-readable API schema document are generated from the
//! same metadata. Persistence is a collaborator behind the [`store::Store`]
//! trait; transport is axum.

pub mod case;
pub mod error;
pub mod generator;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod state;
pub mod store;
pub mod swagger;

pub use case::{pluralize, to_camel_case, to_snake_case};
pub use error::AppError;
pub use generator::ApiGenerator;
pub use model::{
    FieldDef, FieldInfo, FieldKind, FloatKind, ForeignKeyInfo, IntKind, ModelAnalyzer, ModelInfo,
    ModelRegistry, RecordSchema,
};
pub use routes::{common_routes, docs_routes};
pub use state::AppState;
pub use store::{MemoryStore, Store, StoreError};
pub use swagger::SwaggerGenerator;
