//! Reflection for enumeration-backed associations.
//!
//! An `EnumerationReflection` describes a reference from a record to a row of
//! a small lookup table. It answers the whole [`AssociationReflection`]
//! contract as the simplest possible to-one relation: a direct belongs-to with
//! no polymorphism, no multi-step chain and no implicit conditions. Join and
//! eager-load code written for native relations can use it unchanged.

use enumerated_core::error::ScopeError;
use enumerated_core::inflect;
use enumerated_core::{
    AssociationReflection, ContractProfile, LazyTarget, MacroKind, ModelInfo, Result, Scope,
    ScopeChain, TypeResolver,
};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

/// Declaration options of an enumerated association.
#[derive(Debug, Clone, Default)]
pub struct EnumeratedOptions {
    /// Target type name; defaults to the camel-cased singular of the name.
    pub class_name: Option<String>,
    /// Foreign key column; defaults to `<name>_id`.
    pub foreign_key: Option<String>,
    /// Local join key; defaults to the owning type's primary key.
    pub primary_key: Option<String>,
    /// Filter applied to the lookup rows.
    pub scope: Option<Scope>,
}

impl EnumeratedOptions {
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
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }
}

/// Reflection of one enumerated association.
///
/// Created once per (owning type, name) while the owning type is defined and
/// read-only afterwards. Derived facts are computed on first access and cached
/// for the reflection's lifetime; the only mutable state is the parent
/// back-reference used when a subtype inherits the association.
pub struct EnumerationReflection {
    name: String,
    options: EnumeratedOptions,
    owner: Arc<ModelInfo>,
    profile: ContractProfile,
    resolver: Arc<dyn TypeResolver>,
    target: OnceLock<LazyTarget>,
    foreign_key: OnceLock<String>,
    local_key: OnceLock<String>,
    parent: RwLock<Option<Arc<EnumerationReflection>>>,
}

impl EnumerationReflection {
    /// Create a reflection; nothing is resolved until first asked for.
    pub fn new(
        name: impl Into<String>,
        options: EnumeratedOptions,
        owner: Arc<ModelInfo>,
        profile: ContractProfile,
        resolver: Arc<dyn TypeResolver>,
    ) -> Self {
        Self {
            name: name.into(),
            options,
            owner,
            profile,
            resolver,
            target: OnceLock::new(),
            foreign_key: OnceLock::new(),
            local_key: OnceLock::new(),
            parent: RwLock::new(None),
        }
    }

    /// The declared options.
    pub fn options(&self) -> &EnumeratedOptions {
        &self.options
    }

    /// Contract profile this reflection was built for.
    pub fn profile(&self) -> ContractProfile {
        self.profile
    }

    /// The reflection this one was inherited from, if any.
    pub fn parent_reflection(&self) -> Option<Arc<EnumerationReflection>> {
        self.parent
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_parent_reflection(&self, parent: Option<Arc<EnumerationReflection>>) {
        *self.parent.write().unwrap_or_else(|e| e.into_inner()) = parent;
    }

    /// Copy of this reflection declared on `subtype` under `profile`, pointing
    /// back at `self`.
    pub fn inherited_by(
        self: &Arc<Self>,
        subtype: Arc<ModelInfo>,
        profile: ContractProfile,
    ) -> Self {
        let child = Self::new(
            self.name.clone(),
            self.options.clone(),
            subtype,
            profile,
            Arc::clone(&self.resolver),
        );
        child.set_parent_reflection(Some(Arc::clone(self)));
        child
    }

    fn target(&self) -> &LazyTarget {
        memoize(&self.target, "target", || {
            let class_name = self
                .options
                .class_name
                .clone()
                .unwrap_or_else(|| inflect::class_name_for(&self.name));
            LazyTarget::new(class_name, Arc::clone(&self.resolver))
        })
    }
}

/// Compute outside the cell, then store; a concurrent loser's value is dropped.
fn memoize<'a, T>(
    cell: &'a OnceLock<T>,
    field: &'static str,
    compute: impl FnOnce() -> T,
) -> &'a T {
    if let Some(value) = cell.get() {
        return value;
    }
    let value = compute();
    tracing::trace!(field, "Computed enumerated reflection field");
    cell.get_or_init(|| value)
}

impl AssociationReflection for EnumerationReflection {
    fn name(&self) -> &str {
        &self.name
    }

    fn macro_kind(&self) -> MacroKind {
        MacroKind::HasEnumerated
    }

    fn owner(&self) -> &Arc<ModelInfo> {
        &self.owner
    }

    fn target_type_name(&self) -> &str {
        self.target().type_name()
    }

    fn target_type(&self) -> Result<Arc<ModelInfo>> {
        self.target().model(&self.owner.name, &self.name).cloned()
    }

    fn target_table_name(&self) -> Result<&str> {
        self.target().table_name(&self.owner.name, &self.name)
    }

    fn foreign_key(&self) -> &str {
        memoize::<String>(&self.foreign_key, "foreign_key", || {
            self.options
                .foreign_key
                .clone()
                .unwrap_or_else(|| inflect::foreign_key_for(&self.name))
        })
    }

    fn local_key(&self) -> &str {
        memoize::<String>(&self.local_key, "local_key", || {
            self.options
                .primary_key
                .clone()
                .unwrap_or_else(|| self.owner.primary_key.clone())
        })
    }

    fn association_primary_key(&self) -> Result<&str> {
        Ok(&self.owner.primary_key)
    }

    fn is_polymorphic(&self) -> bool {
        false
    }

    fn source_macro(&self) -> MacroKind {
        MacroKind::BelongsTo
    }

    fn is_belongs_to(&self) -> bool {
        true
    }

    fn chain(&self) -> Vec<&dyn AssociationReflection> {
        vec![self as &dyn AssociationReflection]
    }

    fn scope(&self) -> Option<&Scope> {
        self.options.scope.as_ref()
    }

    fn scope_chain(&self) -> ScopeChain {
        match &self.options.scope {
            Some(scope) => vec![vec![scope.clone()]],
            None => vec![Vec::new()],
        }
    }

    fn source_reflection(&self) -> Option<&dyn AssociationReflection> {
        None
    }

    fn relation_type(&self) -> Option<&str> {
        None
    }

    fn check_validity(&self) -> Result<()> {
        Ok(())
    }

    fn conditions(&self) -> ScopeChain {
        vec![Vec::new()]
    }

    fn check_preloadable(&self) -> Result<()> {
        let Some(scope) = &self.options.scope else {
            return Ok(());
        };
        if !scope.is_instance_dependent() {
            return Ok(());
        }
        if self.profile.rejects_instance_scopes() {
            return Err(ScopeError {
                owner: self.owner.name.clone(),
                association: self.name.clone(),
                message: "the association scope is instance dependent and cannot be preloaded"
                    .to_string(),
            }
            .into());
        }
        tracing::warn!(
            owner = %self.owner.name,
            association = %self.name,
            "Association scope is instance dependent; preloading passes no instance \
             to the scope and is deprecated"
        );
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for EnumerationReflection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumerationReflection")
            .field("name", &self.name)
            .field("owner", &self.owner.name)
            .field("options", &self.options)
            .field("profile", &self.profile)
            .field("target", &self.target.get())
            .field("has_parent", &self.parent_reflection().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enumerated_core::{ModelCatalog, Row, Value};

    fn resolver() -> Arc<dyn TypeResolver> {
        Arc::new(
            ModelCatalog::new()
                .with(ModelInfo::new("Status", "booking_statuses"))
                .with(ModelInfo::new("ProductCategory", "product_categories")),
        )
    }

    fn booking() -> Arc<ModelInfo> {
        ModelInfo::new("Booking", "bookings").shared()
    }

    fn status(options: EnumeratedOptions) -> EnumerationReflection {
        EnumerationReflection::new(
            "status",
            options,
            booking(),
            ContractProfile::Current,
            resolver(),
        )
    }

    #[test]
    fn test_defaults_from_name() {
        let reflection = status(EnumeratedOptions::new());
        assert_eq!(reflection.name(), "status");
        assert_eq!(reflection.target_type_name(), "Status");
        assert_eq!(reflection.foreign_key(), "status_id");
        assert_eq!(reflection.local_key(), "id");
        assert_eq!(reflection.association_primary_key().unwrap(), "id");
        assert_eq!(reflection.target_table_name().unwrap(), "booking_statuses");
    }

    #[test]
    fn test_overrides() {
        let reflection = EnumerationReflection::new(
            "category",
            EnumeratedOptions::new()
                .class_name("ProductCategory")
                .foreign_key("cat_id")
                .primary_key("sku"),
            ModelInfo::new("Product", "products").shared(),
            ContractProfile::Current,
            resolver(),
        );
        assert_eq!(reflection.target_type_name(), "ProductCategory");
        assert_eq!(reflection.foreign_key(), "cat_id");
        assert_eq!(reflection.local_key(), "sku");
        assert_eq!(reflection.association_primary_key().unwrap(), "id");
        let keys = reflection.join_keys();
        assert_eq!(keys.key, "sku");
        assert_eq!(keys.foreign_key, "cat_id");
    }

    #[test]
    fn test_presents_as_plain_belongs_to() {
        let reflection = status(EnumeratedOptions::new());
        assert_eq!(reflection.macro_kind(), MacroKind::HasEnumerated);
        assert_eq!(reflection.source_macro(), MacroKind::BelongsTo);
        assert!(reflection.is_belongs_to());
        assert!(!reflection.is_polymorphic());
        assert!(reflection.source_reflection().is_none());
        assert!(reflection.relation_type().is_none());
        assert!(reflection.check_validity().is_ok());
        assert!(reflection.counter_cache_column().is_none());

        let conditions = reflection.conditions();
        assert_eq!(conditions.len(), 1);
        assert!(conditions[0].is_empty());
    }

    #[test]
    fn test_chain_is_self() {
        let reflection = status(EnumeratedOptions::new());
        let chain = reflection.chain();
        assert_eq!(chain.len(), 1);
        assert!(std::ptr::addr_eq(chain[0], &reflection));
    }

    #[test]
    fn test_scope_chain() {
        let plain = status(EnumeratedOptions::new());
        let chain = plain.scope_chain();
        assert_eq!(chain.len(), 1);
        assert!(chain[0].is_empty());

        let active = Scope::new(|row| row.get_named("active") == Some(&Value::Bool(true)));
        let scoped = status(EnumeratedOptions::new().scope(active.clone()));
        let chain = scoped.scope_chain();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].len(), 1);
        assert!(chain[0][0].same_as(&active));

        let row = Row::from_pairs([("active", Value::Bool(true))]);
        assert!(chain[0][0].matches(None, &row));
    }

    #[test]
    fn test_unresolved_target_is_lazy() {
        let reflection = EnumerationReflection::new(
            "priority",
            EnumeratedOptions::new(),
            booking(),
            ContractProfile::Current,
            resolver(),
        );
        // Name-only facts never need the target type.
        assert_eq!(reflection.target_type_name(), "Priority");
        assert_eq!(reflection.foreign_key(), "priority_id");

        let err = reflection.target_table_name().unwrap_err();
        assert!(err.is_unresolved_target());
        assert_eq!(
            err.to_string(),
            "Unresolved target type: Booking.priority refers to unknown type 'Priority'"
        );
        assert!(reflection.target_type().is_err());
    }

    #[test]
    fn test_check_preloadable_by_profile() {
        let instance_scope = Scope::instance(|owner, target| {
            owner.get_named("region") == target.get_named("region")
        });

        let current = status(EnumeratedOptions::new().scope(instance_scope.clone()));
        assert!(matches!(
            current.check_preloadable(),
            Err(enumerated_core::Error::Scope(_))
        ));
        assert!(current.check_eager_loadable().is_err());

        let legacy = EnumerationReflection::new(
            "status",
            EnumeratedOptions::new().scope(instance_scope),
            booking(),
            ContractProfile::Legacy,
            resolver(),
        );
        assert!(legacy.check_preloadable().is_ok());

        let static_scope = status(EnumeratedOptions::new().scope(Scope::new(|_| true)));
        assert!(static_scope.check_preloadable().is_ok());
        assert!(status(EnumeratedOptions::new()).check_preloadable().is_ok());
    }

    #[test]
    fn test_inherited_reflection_points_at_parent() {
        let parent = Arc::new(status(EnumeratedOptions::new().foreign_key("state_id")));
        let child = parent.inherited_by(
            ModelInfo::new("GroupBooking", "bookings").shared(),
            ContractProfile::Legacy,
        );

        assert_eq!(child.owner().name, "GroupBooking");
        assert_eq!(child.profile(), ContractProfile::Legacy);
        assert_eq!(parent.profile(), ContractProfile::Current);
        assert_eq!(child.foreign_key(), "state_id");
        let back = child.parent_reflection().unwrap();
        assert!(Arc::ptr_eq(&back, &parent));

        child.set_parent_reflection(None);
        assert!(child.parent_reflection().is_none());
    }

    #[test]
    fn test_downcast_through_contract() {
        let reflection = status(EnumeratedOptions::new());
        let as_dyn: &dyn AssociationReflection = &reflection;
        assert!(
            as_dyn
                .as_any()
                .downcast_ref::<EnumerationReflection>()
                .is_some()
        );
    }
}
