//! Process-wide table of association registries.
//!
//! The catalog maps a type name to its built registry. Registries are
//! immutable once installed; redefining a type installs a new registry with a
//! single swap, so concurrent readers see either the old or the new set of
//! reflections and never a mix.

use crate::definition::{ModelDefinition, Registry};
use crate::enumeration::EnumerationReflection;
use enumerated_core::{AssociationReflection, MacroKind, ReflectionProvider, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registries of every defined type, keyed by type name.
#[derive(Debug, Default)]
pub struct ReflectionCatalog {
    registries: RwLock<HashMap<String, Arc<Registry>>>,
}

/// Plain description of one association, for logs and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssociationSummary {
    pub name: String,
    pub macro_kind: MacroKind,
    pub source_macro: MacroKind,
    pub target_type: String,
    pub foreign_key: String,
    pub local_key: String,
    pub scoped: bool,
}

impl AssociationSummary {
    pub fn of(reflection: &dyn AssociationReflection) -> Self {
        Self {
            name: reflection.name().to_string(),
            macro_kind: reflection.macro_kind(),
            source_macro: reflection.source_macro(),
            target_type: reflection.target_type_name().to_string(),
            foreign_key: reflection.foreign_key().to_string(),
            local_key: reflection.local_key().to_string(),
            scoped: reflection.scope().is_some(),
        }
    }
}

impl ReflectionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `registry` under its owner's name, returning the one it replaced.
    pub fn install(&self, registry: Registry) -> Option<Arc<Registry>> {
        self.swap(Arc::new(registry))
    }

    /// Build `definition` and install the result.
    ///
    /// A failed build leaves the installed registry untouched.
    pub fn define(&self, definition: ModelDefinition) -> Result<Arc<Registry>> {
        let registry = Arc::new(definition.build()?);
        self.swap(Arc::clone(&registry));
        Ok(registry)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(model = %registry.owner().name))]
    fn swap(&self, registry: Arc<Registry>) -> Option<Arc<Registry>> {
        let name = registry.owner().name.clone();
        let previous = self
            .registries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name, registry);
        if previous.is_some() {
            tracing::debug!("Replaced existing association registry");
        }
        previous
    }

    /// Remove a type's registry.
    pub fn remove(&self, type_name: &str) -> Option<Arc<Registry>> {
        self.registries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(type_name)
    }

    /// The installed registry of `type_name`.
    pub fn registry(&self, type_name: &str) -> Option<Arc<Registry>> {
        self.registries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(type_name)
            .cloned()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.registries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(type_name)
    }

    /// Names of all defined types, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .registries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.registries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All associations of `type_name`; empty for an undefined type.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn reflect_on_all_associations(
        &self,
        type_name: &str,
        kind: Option<MacroKind>,
    ) -> Vec<Arc<dyn AssociationReflection>> {
        self.registry(type_name)
            .map(|r| r.reflect_on_all_associations(kind))
            .unwrap_or_default()
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub fn reflect_on_association(
        &self,
        type_name: &str,
        name: &str,
    ) -> Option<Arc<dyn AssociationReflection>> {
        self.registry(type_name)?.reflect_on_association(name)
    }

    pub fn reflect_on_all_enumerated(&self, type_name: &str) -> Vec<Arc<EnumerationReflection>> {
        self.registry(type_name)
            .map(|r| r.reflect_on_all_enumerated().to_vec())
            .unwrap_or_default()
    }

    pub fn reflect_on_enumerated(
        &self,
        type_name: &str,
        name: &str,
    ) -> Option<Arc<EnumerationReflection>> {
        self.registry(type_name)?.reflect_on_enumerated(name).cloned()
    }

    /// Summaries of every association of `type_name`, in listing order.
    pub fn describe(&self, type_name: &str) -> Vec<AssociationSummary> {
        self.reflect_on_all_associations(type_name, None)
            .iter()
            .map(|r| AssociationSummary::of(r.as_ref()))
            .collect()
    }
}
