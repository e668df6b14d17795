//! Declaring a type's associations.
//!
//! A [`ModelDefinition`] collects declarations while a type is being defined
//! and builds its complete registry in one step, so a registry is never seen
//! half-declared.

use crate::enumeration::{EnumeratedOptions, EnumerationReflection};
use crate::registry::EnumeratedReflections;
use enumerated_core::{
    AssociationInfo, AssociationOptions, AssociationReflection, DeclarationError,
    DeclarationErrorKind, MacroKind, Model, ModelInfo, ModelReflections, ReflectionConfig,
    ReflectionProvider, Result, TypeResolver,
};
use std::sync::Arc;

/// Registry type produced for every defined type.
pub type Registry = EnumeratedReflections<ModelReflections>;

/// Builder for one type's association registry.
///
/// # Example
///
/// ```ignore
/// let registry = ModelDefinition::new(ModelInfo::new("Booking", "bookings"), resolver)
///     .belongs_to("author", AssociationOptions::new())
///     .has_enumerated("status", EnumeratedOptions::new())
///     .build()?;
/// ```
pub struct ModelDefinition {
    owner: Arc<ModelInfo>,
    resolver: Arc<dyn TypeResolver>,
    config: ReflectionConfig,
    associations: Vec<(String, MacroKind, AssociationOptions)>,
    enumerated: Vec<(String, EnumeratedOptions)>,
    inherited: Vec<Arc<EnumerationReflection>>,
}

impl ModelDefinition {
    /// Start defining `owner`, resolving target types through `resolver`.
    pub fn new(owner: ModelInfo, resolver: Arc<dyn TypeResolver>) -> Self {
        Self {
            owner: owner.shared(),
            resolver,
            config: ReflectionConfig::default(),
            associations: Vec::new(),
            enumerated: Vec::new(),
            inherited: Vec::new(),
        }
    }

    /// Start defining the statically known type `M`.
    pub fn for_model<M: Model>(resolver: Arc<dyn TypeResolver>) -> Self {
        Self::new(M::model_info(), resolver)
    }

    /// The type being defined.
    pub fn owner(&self) -> &Arc<ModelInfo> {
        &self.owner
    }

    #[must_use]
    pub fn config(mut self, config: ReflectionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn belongs_to(self, name: impl Into<String>, options: AssociationOptions) -> Self {
        self.association(name, MacroKind::BelongsTo, options)
    }

    #[must_use]
    pub fn has_one(self, name: impl Into<String>, options: AssociationOptions) -> Self {
        self.association(name, MacroKind::HasOne, options)
    }

    #[must_use]
    pub fn has_many(self, name: impl Into<String>, options: AssociationOptions) -> Self {
        self.association(name, MacroKind::HasMany, options)
    }

    #[must_use]
    pub fn has_and_belongs_to_many(
        self,
        name: impl Into<String>,
        options: AssociationOptions,
    ) -> Self {
        self.association(name, MacroKind::HasAndBelongsToMany, options)
    }

    /// Declare an ordinary association of any kind.
    ///
    /// `MacroKind::HasEnumerated` is not an ordinary kind; use
    /// [`has_enumerated`](Self::has_enumerated) for that.
    #[must_use]
    pub fn association(
        mut self,
        name: impl Into<String>,
        kind: MacroKind,
        options: AssociationOptions,
    ) -> Self {
        self.associations.push((name.into(), kind, options));
        self
    }

    /// Declare an enumeration-backed association.
    #[must_use]
    pub fn has_enumerated(mut self, name: impl Into<String>, options: EnumeratedOptions) -> Self {
        self.enumerated.push((name.into(), options));
        self
    }

    /// Inherit the enumerated associations of a parent type's registry.
    ///
    /// Each inherited reflection is re-declared on this type and points back
    /// at the parent's reflection. A declaration of the same name on this
    /// type replaces the inherited one.
    #[must_use]
    pub fn inherit<P: ReflectionProvider>(mut self, parent: &EnumeratedReflections<P>) -> Self {
        self.inherited
            .extend(parent.reflect_on_all_enumerated().iter().cloned());
        self
    }

    /// Build the registry.
    ///
    /// Fails on the first invalid, duplicate or (under
    /// `CollisionPolicy::Reject`) colliding declaration.
    pub fn build(self) -> Result<Registry> {
        let Self {
            owner,
            resolver,
            config,
            associations,
            enumerated,
            inherited,
        } = self;

        let mut base = ModelReflections::new(Arc::clone(&owner));
        for (name, kind, options) in associations {
            if kind == MacroKind::HasEnumerated {
                return Err(DeclarationError {
                    kind: DeclarationErrorKind::InvalidOptions,
                    owner: owner.name.clone(),
                    association: name,
                    message: "enumerated associations are declared with has_enumerated"
                        .to_string(),
                }
                .into());
            }
            base.add(AssociationInfo::new(
                name,
                kind,
                Arc::clone(&owner),
                options,
                Arc::clone(&resolver),
            ))?;
        }

        let mut registry = EnumeratedReflections::new(base);
        let mut inherited_count = 0;
        for parent in &inherited {
            let name = parent.name();
            if enumerated.iter().any(|(own, _)| own == name) {
                continue;
            }
            registry.add(
                parent.inherited_by(Arc::clone(&owner), config.profile),
                config.collisions,
            )?;
            inherited_count += 1;
        }
        for (name, options) in enumerated {
            registry.add(
                EnumerationReflection::new(
                    name,
                    options,
                    Arc::clone(&owner),
                    config.profile,
                    Arc::clone(&resolver),
                ),
                config.collisions,
            )?;
        }

        tracing::debug!(
            model = %owner.name,
            associations = registry.base().len(),
            enumerated = registry.reflect_on_all_enumerated().len(),
            inherited = inherited_count,
            profile = %config.profile,
            "Built association registry"
        );
        Ok(registry)
    }
}

impl std::fmt::Debug for ModelDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDefinition")
            .field("owner", &self.owner.name)
            .field("config", &self.config)
            .field("associations", &self.associations.len())
            .field("enumerated", &self.enumerated.len())
            .field("inherited", &self.inherited.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enumerated_core::{CollisionPolicy, ContractProfile, ModelCatalog, Scope};

    struct Product;

    impl Model for Product {
        const TYPE_NAME: &'static str = "Product";
        const TABLE_NAME: &'static str = "products";
        const PRIMARY_KEY: &'static str = "sku";
    }

    fn resolver() -> Arc<dyn TypeResolver> {
        Arc::new(
            ModelCatalog::new()
                .with(ModelInfo::new("Status", "statuses"))
                .with(ModelInfo::new("Author", "authors"))
                .with(ModelInfo::new("ProductCategory", "product_categories")),
        )
    }

    fn names(registry: &Registry) -> Vec<String> {
        registry
            .reflect_on_all_associations(None)
            .iter()
            .map(|r| r.name().to_string())
            .collect()
    }

    #[test]
    fn test_build_mixed_registry() {
        let registry = ModelDefinition::new(ModelInfo::new("Booking", "bookings"), resolver())
            .belongs_to("author", AssociationOptions::new())
            .has_many("comments", AssociationOptions::new())
            .has_enumerated("status", EnumeratedOptions::new())
            .build()
            .unwrap();

        assert_eq!(names(&registry), vec!["status", "author", "comments"]);
        assert_eq!(registry.base().len(), 2);
        assert_eq!(registry.reflect_on_all_enumerated().len(), 1);
        assert_eq!(registry.owner().name, "Booking");
    }

    #[test]
    fn test_for_model_uses_static_metadata() {
        let registry = ModelDefinition::for_model::<Product>(resolver())
            .has_enumerated(
                "category",
                EnumeratedOptions::new()
                    .class_name("ProductCategory")
                    .foreign_key("cat_id"),
            )
            .build()
            .unwrap();

        let category = registry.reflect_on_association("category").unwrap();
        assert_eq!(category.local_key(), "sku");
        assert_eq!(category.association_primary_key().unwrap(), "sku");
        assert_eq!(category.foreign_key(), "cat_id");
        assert_eq!(category.target_table_name().unwrap(), "product_categories");
    }

    #[test]
    fn test_config_reaches_reflections() {
        let registry = ModelDefinition::new(ModelInfo::new("Booking", "bookings"), resolver())
            .config(ReflectionConfig::new().profile(ContractProfile::Legacy))
            .has_enumerated(
                "status",
                EnumeratedOptions::new().scope(Scope::instance(|_, _| true)),
            )
            .build()
            .unwrap();

        let status = &registry.reflect_on_all_enumerated()[0];
        assert_eq!(status.profile(), ContractProfile::Legacy);
        assert!(status.check_preloadable().is_ok());
    }

    #[test]
    fn test_build_reports_declaration_errors() {
        let strict = ModelDefinition::new(ModelInfo::new("Booking", "bookings"), resolver())
            .config(ReflectionConfig::new().collisions(CollisionPolicy::Reject))
            .belongs_to("status", AssociationOptions::new())
            .has_enumerated("status", EnumeratedOptions::new())
            .build()
            .unwrap_err();
        assert!(matches!(
            strict,
            enumerated_core::Error::Declaration(ref e) if e.kind == DeclarationErrorKind::Collision
        ));

        let wrong_kind = ModelDefinition::new(ModelInfo::new("Booking", "bookings"), resolver())
            .association("status", MacroKind::HasEnumerated, AssociationOptions::new())
            .build()
            .unwrap_err();
        assert_eq!(wrong_kind.association(), Some("status"));

        let duplicate = ModelDefinition::new(ModelInfo::new("Booking", "bookings"), resolver())
            .has_enumerated("status", EnumeratedOptions::new())
            .has_enumerated("status", EnumeratedOptions::new())
            .build()
            .unwrap_err();
        assert!(duplicate.is_declaration_error());
    }

    #[test]
    fn test_inherit_enumerated() {
        let parent = ModelDefinition::new(ModelInfo::new("Booking", "bookings"), resolver())
            .has_enumerated("status", EnumeratedOptions::new())
            .has_enumerated("priority", EnumeratedOptions::new().class_name("Status"))
            .build()
            .unwrap();

        let child = ModelDefinition::new(ModelInfo::new("GroupBooking", "bookings"), resolver())
            .config(ReflectionConfig::new().profile(ContractProfile::Legacy))
            .inherit(&parent)
            .has_enumerated("priority", EnumeratedOptions::new().foreign_key("rank_id"))
            .build()
            .unwrap();

        let status = child.reflect_on_enumerated("status").unwrap();
        assert_eq!(status.owner().name, "GroupBooking");
        assert_eq!(status.profile(), ContractProfile::Legacy);
        let back = status.parent_reflection().unwrap();
        assert!(Arc::ptr_eq(&back, parent.reflect_on_enumerated("status").unwrap()));

        let priority = child.reflect_on_enumerated("priority").unwrap();
        assert_eq!(priority.foreign_key(), "rank_id");
        assert!(priority.parent_reflection().is_none());
        assert_eq!(child.reflect_on_all_enumerated().len(), 2);
    }
}
