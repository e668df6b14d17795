//! Ordinary association metadata.
//!
//! `AssociationInfo` is the native relation descriptor of the host engine:
//! belongs-to, has-one, has-many and has-and-belongs-to-many associations.
//! `ModelReflections` is the base per-type registry of them and the provider
//! that interceptors decorate.

use crate::error::{DeclarationError, DeclarationErrorKind, Result, ScopeError};
use crate::inflect;
use crate::model::ModelInfo;
use crate::reflection::{
    AssociationReflection, LazyTarget, MacroKind, ReflectionProvider, Scope,
};
use crate::resolver::TypeResolver;
use heck::ToSnakeCase;
use std::any::Any;
use std::sync::Arc;

/// Metadata about one ordinary association.
#[derive(Debug)]
pub struct AssociationInfo {
    name: String,
    kind: MacroKind,
    owner: Arc<ModelInfo>,
    target: LazyTarget,
    foreign_key: String,
    primary_key: Option<String>,
    polymorphic: bool,
    type_column: Option<String>,
    scope: Option<Scope>,
}

/// Declaration inputs for an [`AssociationInfo`].
#[derive(Debug, Clone, Default)]
pub struct AssociationOptions {
    pub class_name: Option<String>,
    pub foreign_key: Option<String>,
    pub primary_key: Option<String>,
    /// Polymorphic belongs-to: the target type varies per row.
    pub polymorphic: bool,
    /// Polymorphic has-one/has-many: the interface name on the target (`as:`).
    pub as_interface: Option<String>,
    pub scope: Option<Scope>,
}

impl AssociationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn foreign_key(mut self, key: impl Into<String>) -> Self {
        self.foreign_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn primary_key(mut self, key: impl Into<String>) -> Self {
        self.primary_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn polymorphic(mut self, value: bool) -> Self {
        self.polymorphic = value;
        self
    }

    #[must_use]
    pub fn as_interface(mut self, name: impl Into<String>) -> Self {
        self.as_interface = Some(name.into());
        self
    }

    #[must_use]
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }
}

impl AssociationInfo {
    /// Build an association of `kind` named `name` on `owner`.
    pub fn new(
        name: impl Into<String>,
        kind: MacroKind,
        owner: Arc<ModelInfo>,
        options: AssociationOptions,
        resolver: Arc<dyn TypeResolver>,
    ) -> Self {
        let name = name.into();
        let class_name = options
            .class_name
            .unwrap_or_else(|| inflect::class_name_for(&name));
        let foreign_key = options.foreign_key.unwrap_or_else(|| {
            if let Some(interface) = &options.as_interface {
                inflect::foreign_key_for(interface)
            } else if kind == MacroKind::BelongsTo {
                inflect::foreign_key_for(&name)
            } else {
                inflect::foreign_key_for(&owner.name.to_snake_case())
            }
        });
        let type_column = if options.polymorphic {
            Some(format!("{name}_type"))
        } else {
            options.as_interface.map(|i| format!("{i}_type"))
        };
        Self {
            target: LazyTarget::new(class_name, resolver),
            name,
            kind,
            owner,
            foreign_key,
            primary_key: options.primary_key,
            polymorphic: options.polymorphic,
            type_column,
            scope: options.scope,
        }
    }
}

impl AssociationReflection for AssociationInfo {
    fn name(&self) -> &str {
        &self.name
    }

    fn macro_kind(&self) -> MacroKind {
        self.kind
    }

    fn owner(&self) -> &Arc<ModelInfo> {
        &self.owner
    }

    fn target_type_name(&self) -> &str {
        self.target.type_name()
    }

    fn target_type(&self) -> Result<Arc<ModelInfo>> {
        self.target.model(&self.owner.name, &self.name).cloned()
    }

    fn target_table_name(&self) -> Result<&str> {
        self.target.table_name(&self.owner.name, &self.name)
    }

    fn foreign_key(&self) -> &str {
        &self.foreign_key
    }

    fn local_key(&self) -> &str {
        self.primary_key.as_deref().unwrap_or(&self.owner.primary_key)
    }

    fn association_primary_key(&self) -> Result<&str> {
        match self.primary_key.as_deref() {
            Some(key) => Ok(key),
            None => self.target.primary_key(&self.owner.name, &self.name),
        }
    }

    fn is_polymorphic(&self) -> bool {
        self.polymorphic
    }

    fn source_macro(&self) -> MacroKind {
        self.kind
    }

    fn chain(&self) -> Vec<&dyn AssociationReflection> {
        vec![self as &dyn AssociationReflection]
    }

    fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    fn source_reflection(&self) -> Option<&dyn AssociationReflection> {
        None
    }

    fn relation_type(&self) -> Option<&str> {
        self.type_column.as_deref()
    }

    fn check_validity(&self) -> Result<()> {
        if self.polymorphic && self.kind != MacroKind::BelongsTo {
            return Err(DeclarationError {
                kind: DeclarationErrorKind::InvalidOptions,
                owner: self.owner.name.clone(),
                association: self.name.clone(),
                message: format!("only belongs_to can be polymorphic, not {}", self.kind),
            }
            .into());
        }
        if !self.polymorphic {
            self.target_type()?;
        }
        Ok(())
    }

    fn check_preloadable(&self) -> Result<()> {
        match &self.scope {
            Some(scope) if scope.is_instance_dependent() => Err(ScopeError {
                owner: self.owner.name.clone(),
                association: self.name.clone(),
                message: "instance dependent scopes cannot be preloaded".to_string(),
            }
            .into()),
            _ => Ok(()),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Base registry of a type's ordinary associations.
#[derive(Debug)]
pub struct ModelReflections {
    owner: Arc<ModelInfo>,
    associations: Vec<Arc<AssociationInfo>>,
}

impl ModelReflections {
    pub fn new(owner: Arc<ModelInfo>) -> Self {
        Self {
            owner,
            associations: Vec::new(),
        }
    }

    /// Add an association; names must be unique identifiers.
    pub fn add(&mut self, association: AssociationInfo) -> Result<()> {
        if !inflect::is_valid_identifier(&association.name) {
            return Err(self.declaration_error(
                DeclarationErrorKind::InvalidName,
                &association.name,
                "association name is not a valid identifier",
            ));
        }
        if self.find(&association.name).is_some() {
            return Err(self.declaration_error(
                DeclarationErrorKind::Duplicate,
                &association.name,
                "association is already declared",
            ));
        }
        self.associations.push(Arc::new(association));
        Ok(())
    }

    /// Find an association by name.
    pub fn find(&self, name: &str) -> Option<&Arc<AssociationInfo>> {
        self.associations.iter().find(|a| a.name == name)
    }

    pub fn len(&self) -> usize {
        self.associations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.associations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssociationInfo> {
        self.associations.iter().map(|a| &**a)
    }

    fn declaration_error(
        &self,
        kind: DeclarationErrorKind,
        association: &str,
        message: &str,
    ) -> crate::Error {
        DeclarationError {
            kind,
            owner: self.owner.name.clone(),
            association: association.to_string(),
            message: message.to_string(),
        }
        .into()
    }
}

impl ReflectionProvider for ModelReflections {
    fn owner(&self) -> &Arc<ModelInfo> {
        &self.owner
    }

    fn reflect_on_all_associations(
        &self,
        kind: Option<MacroKind>,
    ) -> Vec<Arc<dyn AssociationReflection>> {
        self.associations
            .iter()
            .filter(|a| kind.is_none_or(|k| a.kind == k))
            .map(|a| Arc::clone(a) as Arc<dyn AssociationReflection>)
            .collect()
    }

    fn reflect_on_association(&self, name: &str) -> Option<Arc<dyn AssociationReflection>> {
        self.find(name)
            .map(|a| Arc::clone(a) as Arc<dyn AssociationReflection>)
    }
}
