//! Analyzed model metadata: immutable once produced, read concurrently by the
//! route synthesizer, the handlers, and the schema generator.

use crate::model::types::{FieldKind, RecordSchema};
use std::sync::Arc;

/// One serializable field of a record.
#[derive(Clone, Debug)]
pub struct FieldInfo {
    /// Declared identifier (e.g. `UserID`).
    pub name: String,
    /// External serialization name (e.g. `user_id`).
    pub json_name: String,
    pub kind: FieldKind,
    /// Name is exactly `ID` or ends with `ID`.
    pub is_identifier: bool,
    /// Serialization tag carries `omitempty`.
    pub omit_empty: bool,
}

/// One detected relationship. Both inference rules may fire for logically
/// related fields, producing two entries; they are not merged here.
#[derive(Clone, Debug)]
pub struct ForeignKeyInfo {
    pub field_name: String,
    /// Declared type name of the related record (e.g. `User`).
    pub related_model: String,
    pub related_field: String,
    /// Literal filter column when the relationship is a scalar id field
    /// (e.g. `UserID`); `None` for nested-record relationships, which fall
    /// back to the conventional `{resource}ID` column at query time.
    pub relationship_column: Option<String>,
}

/// Metadata for one registered record type.
#[derive(Clone, Debug)]
pub struct ModelInfo {
    /// The declared structural shape; shared, never mutated after analysis.
    pub schema: Arc<RecordSchema>,
    /// Snake-case singular resource name; unique key into the registry.
    pub resource_name: String,
    /// URL collection segment.
    pub plural_name: String,
    /// Fields in declaration order, excluded fields already dropped.
    pub fields: Vec<FieldInfo>,
    /// Relationships in field declaration order; may contain duplicates.
    pub foreign_keys: Vec<ForeignKeyInfo>,
}

impl ModelInfo {
    pub fn type_name(&self) -> &str {
        &self.schema.name
    }

    pub fn id_field(&self) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == "ID")
    }

    /// Whether the primary identifier is a string (drives the lookup branch
    /// in GET/UPDATE/DELETE handlers).
    pub fn has_string_id(&self) -> bool {
        matches!(self.id_field().map(|f| &f.kind), Some(FieldKind::Str))
    }
}
