//! Record row representation handed to scopes.

use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Column layout shared by rows of the same shape.
#[derive(Debug, Clone, Default)]
pub struct ColumnInfo {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ColumnInfo {
    /// Layout for `names`, in order.
    pub fn new(names: Vec<String>) -> Self {
        let positions = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { names, positions }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// A single record: column values plus shared column metadata.
#[derive(Debug, Clone)]
pub struct Row {
    values: Vec<Value>,
    columns: Arc<ColumnInfo>,
}

impl Row {
    /// Create a row from shared column metadata and values in column order.
    pub fn with_columns(columns: Arc<ColumnInfo>, values: Vec<Value>) -> Self {
        Self { values, columns }
    }

    /// Create a row from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (names, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            values,
            columns: Arc::new(ColumnInfo::new(names)),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the column `name`, if the row has it.
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.columns
            .position(name)
            .and_then(|idx| self.values.get(idx))
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.position(name).is_some()
    }

    /// Iterate `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_lookup() {
        let row = Row::from_pairs([("id", Value::from(1)), ("name", Value::from("active"))]);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get_named("name"), Some(&Value::from("active")));
        assert!(row.get_named("missing").is_none());
        assert!(row.contains_column("id"));
    }

    #[test]
    fn test_shared_columns() {
        let columns = Arc::new(ColumnInfo::new(vec!["id".into(), "name".into()]));
        let a = Row::with_columns(Arc::clone(&columns), vec![1.into(), "a".into()]);
        let b = Row::with_columns(columns, vec![2.into(), "b".into()]);
        assert_eq!(a.get_named("id"), Some(&Value::BigInt(1)));
        assert_eq!(b.get_named("name"), Some(&Value::from("b")));
        let pairs: Vec<_> = b.iter().map(|(k, _)| k).collect();
        assert_eq!(pairs, vec!["id", "name"]);
    }
}
