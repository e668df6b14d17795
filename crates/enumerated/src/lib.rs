//! Lookup-table associations that reflect like native relations.
//!
//! An enumerated association points a record at one row of a small lookup
//! table (a status, a category, a priority). This crate lets such an
//! association take part in generic join and eager-load code written for
//! ordinary belongs-to relations:
//!
//! - [`EnumerationReflection`] answers the full [`AssociationReflection`]
//!   contract as a plain, direct belongs-to.
//! - [`EnumeratedReflections`] decorates a type's base registry so listing
//!   and lookup by name include enumerated associations, ahead of any
//!   ordinary association of the same name.
//! - [`ModelDefinition`] declares a type's associations and builds its
//!   registry; [`ReflectionCatalog`] holds the registries of all types.
//!
//! # Example
//!
//! ```
//! use enumerated::prelude::*;
//! use std::sync::Arc;
//!
//! let types = Arc::new(
//!     ModelCatalog::new()
//!         .with(ModelInfo::new("Status", "booking_statuses"))
//!         .with(ModelInfo::new("Author", "authors")),
//! );
//!
//! let catalog = ReflectionCatalog::new();
//! catalog
//!     .define(
//!         ModelDefinition::new(ModelInfo::new("Booking", "bookings"), types)
//!             .belongs_to("author", AssociationOptions::new())
//!             .has_enumerated("status", EnumeratedOptions::new()),
//!     )
//!     .unwrap();
//!
//! let status = catalog.reflect_on_association("Booking", "status").unwrap();
//! assert_eq!(status.foreign_key(), "status_id");
//! assert_eq!(status.target_table_name().unwrap(), "booking_statuses");
//! assert!(status.is_belongs_to());
//! ```

pub mod catalog;
pub mod definition;
pub mod enumeration;
pub mod registry;

pub use catalog::{AssociationSummary, ReflectionCatalog};
pub use definition::{ModelDefinition, Registry};
pub use enumeration::{EnumeratedOptions, EnumerationReflection};
pub use registry::EnumeratedReflections;

pub use enumerated_core::{
    AssociationInfo, AssociationOptions, AssociationReflection, CollisionPolicy, ContractProfile,
    Error, JoinKeys, MacroKind, Model, ModelCatalog, ModelInfo, ModelReflections,
    ReflectionConfig, ReflectionProvider, Result, Row, Scope, ScopeChain, TypeResolver, Value,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        AssociationOptions, AssociationReflection, CollisionPolicy, ContractProfile,
        EnumeratedOptions, EnumeratedReflections, EnumerationReflection, Error, MacroKind, Model,
        ModelCatalog, ModelDefinition, ModelInfo, ReflectionCatalog, ReflectionConfig,
        ReflectionProvider, Result, Row, Scope, TypeResolver, Value,
    };
}
