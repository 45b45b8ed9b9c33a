//! Write-once-then-read-many registry of analyzed models.
//!
//! All registrations happen before any route is synthesized or request
//! served; afterwards the registry is only read.

use crate::model::resolved::ModelInfo;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct ModelRegistry {
    by_resource: HashMap<String, Arc<ModelInfo>>,
    by_type: HashMap<String, Arc<ModelInfo>>,
    /// Resource names in registration order, for deterministic iteration.
    order: Vec<String>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under both the resource name and the declared type name; both
    /// keys resolve to the same shared entry. Registering a type again
    /// replaces its previous entry.
    pub fn insert(&mut self, info: ModelInfo) -> Arc<ModelInfo> {
        let info = Arc::new(info);
        if let Some(prev) = self
            .by_type
            .insert(info.type_name().to_string(), Arc::clone(&info))
        {
            self.by_resource.remove(&prev.resource_name);
            self.order.retain(|r| r != &prev.resource_name);
        }
        self.by_resource
            .insert(info.resource_name.clone(), Arc::clone(&info));
        self.order.push(info.resource_name.clone());
        info
    }

    pub fn by_resource(&self, resource_name: &str) -> Option<&Arc<ModelInfo>> {
        self.by_resource.get(resource_name)
    }

    pub fn by_type(&self, type_name: &str) -> Option<&Arc<ModelInfo>> {
        self.by_type.get(type_name)
    }

    /// Models in registration order.
    pub fn models(&self) -> impl Iterator<Item = &Arc<ModelInfo>> {
        self.order.iter().filter_map(|r| self.by_resource.get(r))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::analyzer::ModelAnalyzer;
    use crate::model::types::{FieldDef, FieldKind, IntKind, RecordSchema};

    fn user_type() -> FieldKind {
        FieldKind::record(
            RecordSchema::new("User")
                .field(FieldDef::new("ID", FieldKind::Int(IntKind::Uint)).json("id")),
        )
    }

    #[test]
    fn both_keys_resolve_to_the_same_entry() {
        let mut registry = ModelRegistry::new();
        let info = ModelAnalyzer::analyze(&user_type(), None).unwrap();
        registry.insert(info);
        let by_resource = registry.by_resource("user").unwrap();
        let by_type = registry.by_type("User").unwrap();
        assert!(Arc::ptr_eq(by_resource, by_type));
    }

    #[test]
    fn reregistering_a_type_replaces_its_entry() {
        let mut registry = ModelRegistry::new();
        registry.insert(ModelAnalyzer::analyze(&user_type(), None).unwrap());
        registry.insert(ModelAnalyzer::analyze(&user_type(), None).unwrap());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.models().count(), 1);
    }

    #[test]
    fn reregistering_under_a_new_resource_name_drops_the_old_key() {
        let mut registry = ModelRegistry::new();
        registry.insert(ModelAnalyzer::analyze(&user_type(), None).unwrap());
        registry.insert(ModelAnalyzer::analyze(&user_type(), Some("member")).unwrap());
        assert!(registry.by_resource("user").is_none());
        assert_eq!(registry.by_resource("member").unwrap().type_name(), "User");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn models_iterates_in_registration_order() {
        let post = FieldKind::record(
            RecordSchema::new("Post")
                .field(FieldDef::new("ID", FieldKind::Int(IntKind::Uint)).json("id")),
        );
        let mut registry = ModelRegistry::new();
        registry.insert(ModelAnalyzer::analyze(&post, None).unwrap());
        registry.insert(ModelAnalyzer::analyze(&user_type(), None).unwrap());
        let order: Vec<&str> = registry.models().map(|m| m.resource_name.as_str()).collect();
        assert_eq!(order, vec!["post", "user"]);
    }
}
