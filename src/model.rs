use std::path::PathBuf;

use indexmap::IndexMap;
use indexmap::map::{IntoValues, Values};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::Value;

/// A parsed `KEY=VALUE` entry from a `.env` file or input buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub value: Value,
    /// Value text after the first `=`, trimmed, before coercion.
    pub raw: String,
    pub source: Option<PathBuf>,
    pub line: u32,
}

/// Ordered `.env` entries keyed by variable name.
///
/// Re-inserting a key replaces the earlier entry but keeps its position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnvTable {
    entries: IndexMap<String, Entry>,
}

impl EnvTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Typed value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Values<'_, String, Entry> {
        self.entries.values()
    }

    /// Insert `entry`, returning the entry it replaced.
    pub fn insert(&mut self, entry: Entry) -> Option<Entry> {
        self.entries.insert(entry.key.clone(), entry)
    }

    /// Merge `other` into `self`; entries from `other` win.
    pub fn extend(&mut self, other: EnvTable) {
        for entry in other {
            self.insert(entry);
        }
    }
}

impl IntoIterator for EnvTable {
    type Item = Entry;
    type IntoIter = IntoValues<String, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

impl<'a> IntoIterator for &'a EnvTable {
    type Item = &'a Entry;
    type IntoIter = Values<'a, String, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Entry> for EnvTable {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut table = Self::new();
        for entry in iter {
            table.insert(entry);
        }
        table
    }
}

/// Serializes as a flat `{KEY: value}` object.
impl Serialize for EnvTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, &entry.value)?;
        }
        map.end()
    }
}

/// Summary of the load operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped_existing: usize,
    /// Entries the environment cannot hold: an empty key, or a NUL byte or
    /// `=` in the key, or a NUL byte in the value.
    pub skipped_invalid: usize,
    pub files_read: usize,
    pub files_missing: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, value: Value, line: u32) -> Entry {
        Entry {
            key: key.to_owned(),
            raw: value.to_string(),
            value,
            source: None,
            line,
        }
    }

    #[test]
    fn reinsert_keeps_position_and_replaces_value() {
        let mut table = EnvTable::new();
        table.insert(entry("A", Value::from(1), 1));
        table.insert(entry("B", Value::from(2), 2));
        let replaced = table.insert(entry("A", Value::from("late"), 3));

        assert_eq!(replaced.map(|old| old.line), Some(1));
        assert_eq!(table.keys().collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(table.get("A"), Some(&Value::from("late")));
        assert_eq!(table.entry("A").map(|entry| entry.line), Some(3));
    }

    #[test]
    fn extend_prefers_incoming_entries() {
        let mut base: EnvTable = [entry("A", Value::from("base"), 1), entry("B", Value::from("base"), 2)]
            .into_iter()
            .collect();
        let local: EnvTable = [entry("B", Value::from("local"), 1), entry("C", Value::from("local"), 2)]
            .into_iter()
            .collect();

        base.extend(local);

        assert_eq!(base.len(), 3);
        assert_eq!(base.get("A"), Some(&Value::from("base")));
        assert_eq!(base.get("B"), Some(&Value::from("local")));
        assert_eq!(base.get("C"), Some(&Value::from("local")));
    }

    #[test]
    fn serializes_as_flat_object() {
        let table: EnvTable = [entry("PORT", Value::from(3000), 1), entry("DEBUG", Value::from(true), 2)]
            .into_iter()
            .collect();

        let json = serde_json::to_string(&table).expect("serialize should succeed");
        assert_eq!(json, r#"{"PORT":3000,"DEBUG":true}"#);
    }
}
