//! Core types and traits for enumerated associations.
//!
//! This crate provides the reflection contract that generic join and
//! eager-load code is written against:
//!
//! - `AssociationReflection` trait describing one association
//! - `ReflectionProvider` trait for a type's association registry
//! - `AssociationInfo` / `ModelReflections` for ordinary associations
//! - `TypeResolver` for resolving target types by name
//! - `ReflectionConfig` selecting the contract profile

pub mod config;
pub mod error;
pub mod inflect;
pub mod model;
pub mod reflection;
pub mod relationship;
pub mod resolver;
pub mod row;
pub mod value;

pub use config::{CollisionPolicy, ContractProfile, ReflectionConfig};
pub use error::{
    ConfigError, DeclarationError, DeclarationErrorKind, Error, Result, ScopeError,
    UnresolvedTypeError, UnresolvedTypeKind,
};
pub use model::{Model, ModelInfo};
pub use reflection::{
    AssociationReflection, JoinKeys, LazyTarget, MacroKind, ReflectionProvider, Scope,
    ScopeChain,
};
pub use relationship::{AssociationInfo, AssociationOptions, ModelReflections};
pub use resolver::{ModelCatalog, TypeResolver};
pub use row::{ColumnInfo, Row};
pub use value::Value;
