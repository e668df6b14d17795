//! Naming conventions for association metadata.
//!
//! Association names are snake_case identifiers (`status`, `order_states`).
//! The default target type name is the singular of the association name in
//! UpperCamelCase; the default foreign key is the association name with an
//! `_id` suffix.

use heck::ToUpperCamelCase;
use regex::Regex;
use std::sync::OnceLock;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is a valid regex")
    })
}

/// Check that `name` can be used as an association or column name.
///
/// # Examples
///
/// ```
/// use enumerated_core::inflect::is_valid_identifier;
///
/// assert!(is_valid_identifier("status"));
/// assert!(is_valid_identifier("_legacy_state2"));
/// assert!(!is_valid_identifier("2fast"));
/// assert!(!is_valid_identifier("status; DROP"));
/// assert!(!is_valid_identifier(""));
/// ```
pub fn is_valid_identifier(name: &str) -> bool {
    identifier_pattern().is_match(name)
}

/// Singular form of an English word.
///
/// ```
/// use enumerated_core::inflect::singularize;
///
/// assert_eq!(singularize("categories"), "category");
/// assert_eq!(singularize("status"), "status");
/// ```
pub fn singularize(word: &str) -> String {
    pluralizer::pluralize(word, 1, false)
}

/// UpperCamelCase form of a snake_case word.
///
/// ```
/// use enumerated_core::inflect::camelize;
///
/// assert_eq!(camelize("product_category"), "ProductCategory");
/// ```
pub fn camelize(word: &str) -> String {
    word.to_upper_camel_case()
}

/// Default target type name for an association.
pub fn class_name_for(association: &str) -> String {
    camelize(&singularize(association))
}

/// Default foreign key column for an association.
pub fn foreign_key_for(association: &str) -> String {
    format!("{association}_id")
}
