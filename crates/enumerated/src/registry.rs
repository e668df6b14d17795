//! Registry interceptor merging enumerated reflections into a base provider.
//!
//! `EnumeratedReflections` decorates any [`ReflectionProvider`]: listing puts
//! the enumerated reflections first and hides ordinary associations they
//! shadow, and lookup by name prefers an enumerated reflection before
//! delegating to the base provider.

use crate::enumeration::EnumerationReflection;
use enumerated_core::inflect;
use enumerated_core::{
    AssociationReflection, CollisionPolicy, DeclarationError, DeclarationErrorKind, MacroKind,
    ModelInfo, ReflectionProvider, Result,
};
use std::sync::Arc;

/// A base reflection provider plus the enumerated reflections of its type.
#[derive(Debug)]
pub struct EnumeratedReflections<P> {
    base: P,
    enumerated: Vec<Arc<EnumerationReflection>>,
}

impl<P: ReflectionProvider> EnumeratedReflections<P> {
    /// Wrap `base` with no enumerated reflections.
    pub fn new(base: P) -> Self {
        Self {
            base,
            enumerated: Vec::new(),
        }
    }

    /// The decorated provider.
    pub fn base(&self) -> &P {
        &self.base
    }

    /// Add an enumerated reflection.
    ///
    /// A base association of the same name is shadowed under
    /// [`CollisionPolicy::Prefer`] and rejected under
    /// [`CollisionPolicy::Reject`].
    pub fn add(
        &mut self,
        reflection: EnumerationReflection,
        collisions: CollisionPolicy,
    ) -> Result<Arc<EnumerationReflection>> {
        let name = reflection.name().to_string();
        if !inflect::is_valid_identifier(&name) {
            return Err(self.declaration_error(
                DeclarationErrorKind::InvalidName,
                &name,
                "association name is not a valid identifier".to_string(),
            ));
        }
        if self.reflect_on_enumerated(&name).is_some() {
            return Err(self.declaration_error(
                DeclarationErrorKind::Duplicate,
                &name,
                "enumerated association is already declared".to_string(),
            ));
        }
        if let Some(shadowed) = self.base.reflect_on_association(&name) {
            match collisions {
                CollisionPolicy::Reject => {
                    return Err(self.declaration_error(
                        DeclarationErrorKind::Collision,
                        &name,
                        format!(
                            "enumerated association collides with {} association of the same name",
                            shadowed.macro_kind()
                        ),
                    ));
                }
                CollisionPolicy::Prefer => {
                    tracing::warn!(
                        owner = %self.owner().name,
                        association = %name,
                        shadowed = %shadowed.macro_kind(),
                        "Enumerated association shadows an ordinary association"
                    );
                }
            }
        }
        let reflection = Arc::new(reflection);
        self.enumerated.push(Arc::clone(&reflection));
        Ok(reflection)
    }

    /// All enumerated reflections declared on this type.
    pub fn reflect_on_all_enumerated(&self) -> &[Arc<EnumerationReflection>] {
        &self.enumerated
    }

    /// The reflection named `name` if it is enumeration-backed.
    pub fn reflect_on_enumerated(&self, name: &str) -> Option<&Arc<EnumerationReflection>> {
        self.enumerated.iter().find(|r| r.name() == name)
    }

    /// Number of visible associations, counting shadowed names once.
    pub fn len(&self) -> usize {
        self.reflect_on_all_associations(None).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerations are listed only under filters they present as, never
    /// under `HasOne`, `HasMany` or `HasAndBelongsToMany`.
    fn lists_enumerated(kind: Option<MacroKind>) -> bool {
        matches!(
            kind,
            None | Some(MacroKind::HasEnumerated | MacroKind::BelongsTo)
        )
    }

    fn declaration_error(
        &self,
        kind: DeclarationErrorKind,
        association: &str,
        message: String,
    ) -> enumerated_core::Error {
        DeclarationError {
            kind,
            owner: self.owner().name.clone(),
            association: association.to_string(),
            message,
        }
        .into()
    }
}

impl<P: ReflectionProvider> ReflectionProvider for EnumeratedReflections<P> {
    fn owner(&self) -> &Arc<ModelInfo> {
        self.base.owner()
    }

    fn reflect_on_all_associations(
        &self,
        kind: Option<MacroKind>,
    ) -> Vec<Arc<dyn AssociationReflection>> {
        let mut all: Vec<Arc<dyn AssociationReflection>> = if Self::lists_enumerated(kind) {
            self.enumerated
                .iter()
                .map(|r| Arc::clone(r) as Arc<dyn AssociationReflection>)
                .collect()
        } else {
            Vec::new()
        };
        all.extend(
            self.base
                .reflect_on_all_associations(kind)
                .into_iter()
                .filter(|r| self.reflect_on_enumerated(r.name()).is_none()),
        );
        all
    }

    fn reflect_on_association(&self, name: &str) -> Option<Arc<dyn AssociationReflection>> {
        match self.reflect_on_enumerated(name) {
            Some(reflection) => Some(Arc::clone(reflection) as Arc<dyn AssociationReflection>),
            None => self.base.reflect_on_association(name),
        }
    }
}
