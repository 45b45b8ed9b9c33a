//! API schema document generation from the model registry.
//!
//! Pure functions of a registry snapshot: no side effects, callable
//! repeatedly and concurrently. The path documents mirror the route set the
//! synthesizer binds for the same registry, so the two cannot diverge.

use crate::case::to_snake_case;
use crate::model::analyzer::parse_json_tag;
use crate::model::{FieldKind, FloatKind, ModelInfo, ModelRegistry, RecordSchema};
use serde_json::{json, Map, Value};

pub struct SwaggerGenerator<'a> {
    models: &'a ModelRegistry,
}

impl<'a> SwaggerGenerator<'a> {
    pub fn new(models: &'a ModelRegistry) -> Self {
        SwaggerGenerator { models }
    }

    /// Complete Swagger 2.0 document: info, paths, definitions.
    pub fn document(&self) -> Value {
        json!({
            "swagger": "2.0",
            "info": {
                "title": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
            "basePath": "/",
            "paths": self.paths(),
            "definitions": self.model_definitions(),
        })
    }

    /// Definitions for all registered models, keyed by type name.
    pub fn model_definitions(&self) -> Value {
        let mut definitions = Map::new();
        for model in self.models.models() {
            definitions.insert(model.type_name().to_string(), self.definition(model));
        }
        Value::Object(definitions)
    }

    /// Object definition for one model: properties per field, with fields
    /// not marked omit-on-output listed as required.
    pub fn definition(&self, model: &ModelInfo) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &model.fields {
            if field.json_name == "-" {
                continue;
            }
            properties.insert(field.json_name.clone(), self.swagger_type(&field.kind));
            if !field.omit_empty {
                required.push(Value::String(field.json_name.clone()));
            }
        }
        finish_object(properties, required)
    }

    /// Request body document. Create requests omit identifier fields
    /// entirely; the persistence layer assigns them.
    pub fn request_body(&self, model: &ModelInfo, is_create: bool) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &model.fields {
            if field.json_name == "-" || (is_create && field.is_identifier) {
                continue;
            }
            properties.insert(field.json_name.clone(), self.swagger_type(&field.kind));
            if !field.omit_empty {
                required.push(Value::String(field.json_name.clone()));
            }
        }
        finish_object(properties, required)
    }

    /// Response body document: every field, nothing required.
    pub fn response_body(&self, model: &ModelInfo) -> Value {
        let mut properties = Map::new();
        for field in &model.fields {
            if field.json_name == "-" {
                continue;
            }
            properties.insert(field.json_name.clone(), self.swagger_type(&field.kind));
        }
        json!({ "type": "object", "properties": properties })
    }

    /// Path documents for every route the synthesizer would bind.
    pub fn paths(&self) -> Value {
        let mut paths = Map::new();
        for model in self.models.models() {
            let plural = &model.plural_name;
            let resource = &model.resource_name;

            paths.insert(
                format!("/api/{}", plural),
                json!({
                    "get": {
                        "summary": format!("List all {}", plural),
                        "responses": {
                            "200": {
                                "description": "List response",
                                "schema": {
                                    "type": "array",
                                    "items": { "$ref": format!("#/definitions/{}", model.type_name()) },
                                },
                            },
                        },
                    },
                    "post": {
                        "summary": format!("Create a new {}", resource),
                        "parameters": [{
                            "in": "body",
                            "name": resource,
                            "description": "Create request",
                            "required": true,
                            "schema": self.request_body(model, true),
                        }],
                        "responses": {
                            "201": { "description": "Created", "schema": self.response_body(model) },
                        },
                    },
                }),
            );

            paths.insert(
                format!("/api/{}/{{id}}", plural),
                json!({
                    "get": {
                        "summary": format!("Get a {}", resource),
                        "parameters": [id_parameter()],
                        "responses": {
                            "200": { "description": "Success", "schema": self.response_body(model) },
                            "404": { "description": "Not found" },
                        },
                    },
                    "put": {
                        "summary": format!("Update a {}", resource),
                        "parameters": [
                            id_parameter(),
                            {
                                "in": "body",
                                "name": resource,
                                "description": "Update request",
                                "required": true,
                                "schema": self.request_body(model, false),
                            },
                        ],
                        "responses": {
                            "200": { "description": "Updated", "schema": self.response_body(model) },
                            "404": { "description": "Not found" },
                        },
                    },
                    "delete": {
                        "summary": format!("Delete a {}", resource),
                        "parameters": [id_parameter()],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": { "description": "Not found" },
                        },
                    },
                }),
            );

            for fk in &model.foreign_keys {
                if fk.related_model.is_empty() {
                    continue;
                }
                let related_path = format!(
                    "/api/{}/{{id}}/{}",
                    plural,
                    to_snake_case(&fk.related_model)
                );
                paths.entry(related_path).or_insert_with(|| {
                    json!({
                        "get": {
                            "summary": format!("Get related {} for {}", fk.related_model, resource),
                            "parameters": [id_parameter()],
                            "responses": {
                                "200": { "description": "List response" },
                            },
                        },
                    })
                });
            }
        }
        Value::Object(paths)
    }

    fn swagger_type(&self, kind: &FieldKind) -> Value {
        match kind {
            FieldKind::Bool => json!({ "type": "boolean" }),
            FieldKind::Int(k) => {
                let format = if k.is_wide() { "int64" } else { "int32" };
                json!({ "type": "integer", "format": format })
            }
            FieldKind::Float(k) => {
                let format = match k {
                    FloatKind::F64 => "double",
                    FloatKind::F32 => "float",
                };
                json!({ "type": "number", "format": format })
            }
            FieldKind::Str => json!({ "type": "string" }),
            FieldKind::Time => json!({ "type": "string", "format": "date-time" }),
            FieldKind::Record(schema) => {
                if let Some(model) = self.models.by_type(&schema.name) {
                    json!({ "$ref": format!("#/definitions/{}", model.type_name()) })
                } else {
                    self.inline_object(schema)
                }
            }
            FieldKind::Sequence(element) => json!({
                "type": "array",
                "items": self.swagger_type(element),
            }),
            FieldKind::Mapping(value) => json!({
                "type": "object",
                "additionalProperties": self.swagger_type(value),
            }),
            FieldKind::Pointer(target) => self.swagger_type(target),
        }
    }

    /// Inline definition for a nested record that is not registered.
    fn inline_object(&self, schema: &RecordSchema) -> Value {
        let mut properties = Map::new();
        for def in &schema.fields {
            let Some((name, _)) = parse_json_tag(def.json.as_deref()) else {
                continue;
            };
            properties.insert(name, self.swagger_type(&def.kind));
        }
        json!({ "type": "object", "properties": properties })
    }
}

fn id_parameter() -> Value {
    json!({ "name": "id", "in": "path", "required": true, "type": "string" })
}

fn finish_object(properties: Map<String, Value>, required: Vec<Value>) -> Value {
    let mut definition = Map::new();
    definition.insert("type".into(), json!("object"));
    definition.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        definition.insert("required".into(), Value::Array(required));
    }
    Value::Object(definition)
}
