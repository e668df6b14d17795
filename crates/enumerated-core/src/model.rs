//! Record type metadata.
//!
//! `ModelInfo` is the runtime description of a record type: its name, the
//! table it is stored in and its primary key. Reflections hold it behind an
//! `Arc` as a back-reference to their owning type, and the type resolver hands
//! it out when an association's target type is resolved by name.

use std::sync::Arc;

/// Metadata describing one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    /// Type name, e.g. `"Booking"`.
    pub name: String,

    /// Storage table, `None` for abstract types that have no table.
    pub table_name: Option<String>,

    /// Primary key column.
    pub primary_key: String,
}

impl ModelInfo {
    /// Create metadata for a table-backed type with an `id` primary key.
    pub fn new(name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: Some(table_name.into()),
            primary_key: "id".to_string(),
        }
    }

    /// Create metadata for a type that is not backed by a table.
    pub fn abstract_type(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table_name: None,
            primary_key: "id".to_string(),
        }
    }

    /// Override the primary key column.
    #[must_use]
    pub fn primary_key(mut self, key: impl Into<String>) -> Self {
        self.primary_key = key.into();
        self
    }

    /// Wrap in an `Arc` for sharing between reflections.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

/// Trait for record types whose metadata is known at compile time.
///
/// # Example
///
/// ```ignore
/// struct Booking;
///
/// impl Model for Booking {
///     const TYPE_NAME: &'static str = "Booking";
///     const TABLE_NAME: &'static str = "bookings";
/// }
/// ```
pub trait Model {
    /// The record type's name.
    const TYPE_NAME: &'static str;

    /// The table this type is stored in.
    const TABLE_NAME: &'static str;

    /// Primary key column.
    const PRIMARY_KEY: &'static str = "id";

    /// Runtime metadata for this type.
    fn model_info() -> ModelInfo {
        ModelInfo::new(Self::TYPE_NAME, Self::TABLE_NAME).primary_key(Self::PRIMARY_KEY)
    }
}
