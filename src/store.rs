//! Persistence collaborator: the storage operations the generated handlers
//! consume, plus an in-process implementation for development and tests.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("{0}")]
    Backend(String),
}

/// Storage operations over schemaless instances, keyed by resource name.
/// Instances are JSON objects; the primary key lives under the `id` key.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_all(&self, resource: &str) -> Result<Vec<Value>, StoreError>;
    async fn find_by_id(&self, resource: &str, id: u64) -> Result<Value, StoreError>;
    async fn find_where(
        &self,
        resource: &str,
        column: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError>;
    async fn create(&self, resource: &str, instance: Value) -> Result<Value, StoreError>;
    async fn save(&self, resource: &str, instance: Value) -> Result<Value, StoreError>;
    async fn delete(&self, resource: &str, instance: &Value) -> Result<(), StoreError>;
}

#[derive(Default)]
struct Collection {
    rows: Vec<Value>,
    next_id: u64,
}

/// In-memory store. Assigns sequential numeric ids per collection (or a
/// fresh UUID when the instance carries an empty string id) and stamps
/// `created_at`/`updated_at` on write.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_collection<T>(
        &self,
        resource: &str,
        f: impl FnOnce(&mut Collection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::Backend("store lock poisoned".into()))?;
        let collection = collections.entry(resource.to_string()).or_default();
        f(collection)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_all(&self, resource: &str) -> Result<Vec<Value>, StoreError> {
        tracing::debug!(resource, "find_all");
        self.with_collection(resource, |c| Ok(c.rows.clone()))
    }

    async fn find_by_id(&self, resource: &str, id: u64) -> Result<Value, StoreError> {
        tracing::debug!(resource, id, "find_by_id");
        self.with_collection(resource, |c| {
            c.rows
                .iter()
                .find(|row| row.get("id").and_then(Value::as_u64) == Some(id))
                .cloned()
                .ok_or(StoreError::NotFound)
        })
    }

    async fn find_where(
        &self,
        resource: &str,
        column: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        tracing::debug!(resource, column, %value, "find_where");
        self.with_collection(resource, |c| {
            Ok(c.rows
                .iter()
                .filter(|row| value_matches(row.get(column).unwrap_or(&Value::Null), value))
                .cloned()
                .collect())
        })
    }

    async fn create(&self, resource: &str, instance: Value) -> Result<Value, StoreError> {
        tracing::debug!(resource, "create");
        let Value::Object(mut obj) = instance else {
            return Err(StoreError::Backend("instance must be a JSON object".into()));
        };
        let wants_uuid = matches!(obj.get("id"), Some(Value::String(s)) if s.is_empty());
        let wants_numeric = match obj.get("id") {
            None => true,
            Some(Value::Number(n)) => n.as_u64() == Some(0),
            Some(_) => false,
        };
        self.with_collection(resource, |c| {
            if wants_uuid {
                obj.insert("id".into(), Value::String(uuid::Uuid::new_v4().to_string()));
            } else if wants_numeric {
                c.next_id += 1;
                obj.insert("id".into(), Value::Number(c.next_id.into()));
            }
            let now = Value::String(Utc::now().to_rfc3339());
            obj.entry("created_at").or_insert_with(|| now.clone());
            obj.insert("updated_at".into(), now);
            let row = Value::Object(obj);
            c.rows.push(row.clone());
            Ok(row)
        })
    }

    async fn save(&self, resource: &str, instance: Value) -> Result<Value, StoreError> {
        tracing::debug!(resource, "save");
        let Value::Object(mut obj) = instance else {
            return Err(StoreError::Backend("instance must be a JSON object".into()));
        };
        obj.insert("updated_at".into(), Value::String(Utc::now().to_rfc3339()));
        let id = obj.get("id").cloned().unwrap_or(Value::Null);
        self.with_collection(resource, |c| {
            let row = Value::Object(obj);
            match c
                .rows
                .iter_mut()
                .find(|r| value_matches(r.get("id").unwrap_or(&Value::Null), &id))
            {
                Some(existing) => *existing = row.clone(),
                None => c.rows.push(row.clone()),
            }
            Ok(row)
        })
    }

    async fn delete(&self, resource: &str, instance: &Value) -> Result<(), StoreError> {
        tracing::debug!(resource, "delete");
        let id = instance.get("id").cloned().unwrap_or(Value::Null);
        if id.is_null() {
            return Err(StoreError::Backend("instance has no id".into()));
        }
        self.with_collection(resource, |c| {
            c.rows
                .retain(|r| !value_matches(r.get("id").unwrap_or(&Value::Null), &id));
            Ok(())
        })
    }
}

/// Equality with the loose string/number coercion a database driver applies
/// when a path segment is compared against a numeric column.
fn value_matches(stored: &Value, needle: &Value) -> bool {
    if stored == needle {
        return true;
    }
    match (stored, needle) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            s.parse::<f64>().ok() == n.as_f64()
        }
        _ => false,
    }
}
