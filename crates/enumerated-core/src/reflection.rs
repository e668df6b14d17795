//! The association reflection contract.
//!
//! Generic join, eager-load and query-building code talks to associations
//! only through [`AssociationReflection`] and finds them only through a
//! [`ReflectionProvider`]. Anything implementing both can stand in for a
//! native relation without the consumer knowing.

use crate::error::{Result, UnresolvedTypeError, UnresolvedTypeKind};
use crate::model::ModelInfo;
use crate::resolver::TypeResolver;
use crate::row::Row;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// How an association was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroKind {
    /// To-one; the owner stores the foreign key.
    BelongsTo,
    /// To-one; the target stores the foreign key.
    HasOne,
    /// To-many; the targets store the foreign key.
    HasMany,
    /// To-many via a join table.
    HasAndBelongsToMany,
    /// To-one reference into a lookup table.
    HasEnumerated,
}

impl MacroKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            MacroKind::BelongsTo => "belongs_to",
            MacroKind::HasOne => "has_one",
            MacroKind::HasMany => "has_many",
            MacroKind::HasAndBelongsToMany => "has_and_belongs_to_many",
            MacroKind::HasEnumerated => "has_enumerated",
        }
    }

    /// Whether the association yields many records.
    pub const fn is_collection(self) -> bool {
        matches!(self, MacroKind::HasMany | MacroKind::HasAndBelongsToMany)
    }
}

impl fmt::Display for MacroKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns matching owning rows to target rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinKeys {
    /// Key on the owning type.
    pub key: String,
    /// Foreign key column on the owning table.
    pub foreign_key: String,
}

type StaticScopeFn = dyn Fn(&Row) -> bool + Send + Sync;
type InstanceScopeFn = dyn Fn(&Row, &Row) -> bool + Send + Sync;

/// A filter applied to an association's target rows.
#[derive(Clone)]
pub enum Scope {
    /// Takes no argument from the owner; receives only the target row.
    Static(Arc<StaticScopeFn>),
    /// Depends on the owning record: receives `(owner, target)`.
    Instance(Arc<InstanceScopeFn>),
}

impl Scope {
    /// Create an owner-independent scope.
    pub fn new(f: impl Fn(&Row) -> bool + Send + Sync + 'static) -> Self {
        Scope::Static(Arc::new(f))
    }

    /// Create a scope that depends on the owning record.
    pub fn instance(f: impl Fn(&Row, &Row) -> bool + Send + Sync + 'static) -> Self {
        Scope::Instance(Arc::new(f))
    }

    /// Number of owner arguments the scope takes (0 or 1).
    pub const fn arity(&self) -> usize {
        match self {
            Scope::Static(_) => 0,
            Scope::Instance(_) => 1,
        }
    }

    pub const fn is_instance_dependent(&self) -> bool {
        self.arity() > 0
    }

    /// Evaluate against a target row.
    ///
    /// Instance-dependent scopes never match without an owner.
    pub fn matches(&self, owner: Option<&Row>, target: &Row) -> bool {
        match self {
            Scope::Static(f) => f(target),
            Scope::Instance(f) => owner.is_some_and(|owner| f(owner, target)),
        }
    }

    /// Whether two handles refer to the same predicate.
    pub fn same_as(&self, other: &Scope) -> bool {
        match (self, other) {
            (Scope::Static(a), Scope::Static(b)) => Arc::ptr_eq(a, b),
            (Scope::Instance(a), Scope::Instance(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("arity", &self.arity())
            .finish_non_exhaustive()
    }
}

/// One inner sequence of scopes per reflection in the chain.
pub type ScopeChain = Vec<Vec<Scope>>;

/// Metadata describing one association of a record type.
pub trait AssociationReflection: Send + Sync + fmt::Debug {
    /// Association name, unique within the owning type.
    fn name(&self) -> &str;

    /// How the association was declared.
    fn macro_kind(&self) -> MacroKind;

    /// The declaring type.
    fn owner(&self) -> &Arc<ModelInfo>;

    /// Name of the target type.
    fn target_type_name(&self) -> &str;

    /// The resolved target type.
    fn target_type(&self) -> Result<Arc<ModelInfo>>;

    /// Table of the resolved target type.
    fn target_table_name(&self) -> Result<&str>;

    /// Foreign key column.
    fn foreign_key(&self) -> &str;

    /// Key on the owning type used for the join.
    fn local_key(&self) -> &str;

    /// Primary key reported to consumers asking for the association's key.
    fn association_primary_key(&self) -> Result<&str>;

    fn join_keys(&self) -> JoinKeys {
        JoinKeys {
            key: self.local_key().to_string(),
            foreign_key: self.foreign_key().to_string(),
        }
    }

    fn is_polymorphic(&self) -> bool;

    /// Kind that join-path compilers should treat this association as.
    fn source_macro(&self) -> MacroKind;

    fn is_belongs_to(&self) -> bool {
        self.source_macro() == MacroKind::BelongsTo
    }

    /// Reflections traversed to reach the target, starting with this one.
    fn chain(&self) -> Vec<&dyn AssociationReflection>;

    fn scope(&self) -> Option<&Scope>;

    fn scope_chain(&self) -> ScopeChain {
        vec![self.scope().cloned().into_iter().collect()]
    }

    /// Reflection this one is derived from, for through-style relations.
    fn source_reflection(&self) -> Option<&dyn AssociationReflection>;

    /// Type column of a polymorphic relation.
    fn relation_type(&self) -> Option<&str>;

    fn check_validity(&self) -> Result<()>;

    /// Implicit filters beyond the join, one inner sequence per chain entry.
    fn conditions(&self) -> ScopeChain {
        vec![Vec::new()]
    }

    /// Check the association can be preloaded without an owning instance.
    fn check_preloadable(&self) -> Result<()>;

    fn check_eager_loadable(&self) -> Result<()> {
        self.check_preloadable()
    }

    /// Counter cache column maintained on the target, if any.
    fn counter_cache_column(&self) -> Option<&str> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Source of a type's association reflections.
///
/// Reflections are handed out as shared handles so callers can keep them
/// after the provider itself is replaced.
pub trait ReflectionProvider: Send + Sync {
    /// The type whose associations this provider describes.
    fn owner(&self) -> &Arc<ModelInfo>;

    /// All associations, optionally only those declared with `kind`.
    fn reflect_on_all_associations(
        &self,
        kind: Option<MacroKind>,
    ) -> Vec<Arc<dyn AssociationReflection>>;

    /// The association named `name`, if any.
    fn reflect_on_association(&self, name: &str) -> Option<Arc<dyn AssociationReflection>>;
}

/// Lazily resolved target type of an association.
///
/// Both cells follow compute, store, return: concurrent first readers may
/// each resolve, the first store wins and every reader sees that value.
pub struct LazyTarget {
    type_name: String,
    resolver: Arc<dyn TypeResolver>,
    model: OnceLock<Arc<ModelInfo>>,
    table: OnceLock<String>,
}

impl LazyTarget {
    pub fn new(type_name: impl Into<String>, resolver: Arc<dyn TypeResolver>) -> Self {
        Self {
            type_name: type_name.into(),
            resolver,
            model: OnceLock::new(),
            table: OnceLock::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Whether the target has already been resolved.
    pub fn is_resolved(&self) -> bool {
        self.model.get().is_some()
    }

    /// Resolve the target type; `owner` and `association` label errors.
    pub fn model(&self, owner: &str, association: &str) -> Result<&Arc<ModelInfo>> {
        if let Some(model) = self.model.get() {
            return Ok(model);
        }
        let resolved = self
            .resolver
            .resolve_type(&self.type_name)
            .ok_or_else(|| self.unresolved(UnresolvedTypeKind::UnknownType, owner, association))?;
        tracing::trace!(
            owner = owner,
            association = association,
            target = %self.type_name,
            "Resolved association target type"
        );
        Ok(self.model.get_or_init(|| resolved))
    }

    /// Table of the target type.
    pub fn table_name(&self, owner: &str, association: &str) -> Result<&str> {
        if let Some(table) = self.table.get() {
            return Ok(table);
        }
        let model = self.model(owner, association)?;
        let table = self
            .resolver
            .table_name(model)
            .ok_or_else(|| self.unresolved(UnresolvedTypeKind::MissingTable, owner, association))?;
        Ok(self.table.get_or_init(|| table))
    }

    /// Primary key of the target type.
    pub fn primary_key(&self, owner: &str, association: &str) -> Result<&str> {
        Ok(&self.model(owner, association)?.primary_key)
    }

    fn unresolved(
        &self,
        kind: UnresolvedTypeKind,
        owner: &str,
        association: &str,
    ) -> crate::Error {
        UnresolvedTypeError {
            kind,
            owner: owner.to_string(),
            association: association.to_string(),
            target: self.type_name.clone(),
        }
        .into()
    }
}

impl fmt::Debug for LazyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyTarget")
            .field("type_name", &self.type_name)
            .field("model", &self.model.get())
            .field("table", &self.table.get())
            .finish_non_exhaustive()
    }
}
