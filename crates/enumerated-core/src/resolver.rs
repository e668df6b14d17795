//! Type resolution collaborator.
//!
//! Reflections never look types up themselves; they ask a [`TypeResolver`]
//! for the target type the first time it is needed and cache the answer.

use crate::model::ModelInfo;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves record types by name.
pub trait TypeResolver: Send + Sync {
    /// Look up a type by name.
    fn resolve_type(&self, name: &str) -> Option<Arc<ModelInfo>>;

    /// Get the table name of a resolved type (`None` if it has no table).
    fn table_name(&self, model: &ModelInfo) -> Option<String> {
        model.table_name.clone()
    }
}

/// In-memory type table.
///
/// Built during startup, then read-only; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: HashMap<String, Arc<ModelInfo>>,
}

impl ModelCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, replacing any previous type of the same name.
    pub fn register(&mut self, model: ModelInfo) -> Arc<ModelInfo> {
        let model = Arc::new(model);
        self.models.insert(model.name.clone(), Arc::clone(&model));
        model
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, model: ModelInfo) -> Self {
        self.register(model);
        self
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl TypeResolver for ModelCatalog {
    fn resolve_type(&self, name: &str) -> Option<Arc<ModelInfo>> {
        self.models.get(name).cloned()
    }
}
