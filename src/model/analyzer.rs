//! Structural metadata extraction: record descriptors -> `ModelInfo`.

use crate::case::{pluralize, to_snake_case};
use crate::error::AppError;
use crate::model::resolved::{FieldInfo, ForeignKeyInfo, ModelInfo};
use crate::model::types::FieldKind;
use std::sync::Arc;

pub struct ModelAnalyzer;

impl ModelAnalyzer {
    /// Analyze a registerable type into its model metadata. A pointer to a
    /// record is accepted as the record itself; any other kind fails.
    ///
    /// `resource_name` overrides the snake-case name derived from the type
    /// name; pass `None` (or an empty string) to derive it.
    pub fn analyze(ty: &FieldKind, resource_name: Option<&str>) -> Result<ModelInfo, AppError> {
        let ty = match ty {
            FieldKind::Pointer(inner) => inner.as_ref(),
            other => other,
        };
        let schema = match ty {
            FieldKind::Record(schema) => schema,
            other => return Err(AppError::InvalidModel(other.kind_name().to_string())),
        };

        let resource_name = match resource_name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => to_snake_case(&schema.name),
        };
        let plural_name = pluralize(&resource_name);

        let mut fields = Vec::new();
        let mut foreign_keys = Vec::new();
        for def in &schema.fields {
            let Some((json_name, omit_empty)) = parse_json_tag(def.json.as_deref()) else {
                continue;
            };

            fields.push(FieldInfo {
                name: def.name.clone(),
                json_name,
                kind: def.kind.clone(),
                is_identifier: def.name == "ID" || def.name.ends_with("ID"),
                omit_empty,
            });

            // Nested-record field: relationship to the nested type.
            if let FieldKind::Record(nested) = &def.kind {
                foreign_keys.push(ForeignKeyInfo {
                    field_name: def.name.clone(),
                    related_model: nested.name.clone(),
                    related_field: "ID".to_string(),
                    relationship_column: None,
                });
            }

            // Scalar id-suffix field: relationship to the type the name implies,
            // filtered by this field's own column.
            if let Some(stem) = def.name.strip_suffix("ID") {
                if matches!(def.kind, FieldKind::Int(k) if k.is_unsigned()) {
                    foreign_keys.push(ForeignKeyInfo {
                        field_name: def.name.clone(),
                        related_model: stem.to_string(),
                        related_field: "ID".to_string(),
                        relationship_column: Some(def.name.clone()),
                    });
                }
            }
        }

        Ok(ModelInfo {
            schema: Arc::new(schema.clone()),
            resource_name,
            plural_name,
            fields,
            foreign_keys,
        })
    }
}

/// `None`: field excluded. Otherwise the external name and the omitempty flag.
pub(crate) fn parse_json_tag(tag: Option<&str>) -> Option<(String, bool)> {
    let tag = tag?;
    if tag.is_empty() || tag == "-" {
        return None;
    }
    let name = tag.split(',').next().unwrap_or("").to_string();
    let omit_empty = tag.contains("omitempty");
    Some((name, omit_empty))
}
