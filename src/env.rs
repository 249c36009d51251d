use std::collections::BTreeMap;

use tracing::debug;

use crate::model::{EnvTable, LoadReport};

/// Destination for loaded environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvStore {
    kind: EnvStoreKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EnvStoreKind {
    /// Apply entries to the current process environment.
    ///
    /// This writes through [`std::env::set_var`], which mutates global process
    /// state and is not thread-safe for concurrent environment access.
    Process,
    /// Apply entries to an in-memory map.
    Memory(BTreeMap<String, String>),
}

impl Default for EnvStore {
    fn default() -> Self {
        Self::memory()
    }
}

impl EnvStore {
    /// Create a process-environment store.
    ///
    /// # Safety
    ///
    /// The caller must ensure no other threads concurrently read or write the
    /// process environment for the duration of operations that may mutate this
    /// store.
    pub unsafe fn process() -> Self {
        Self {
            kind: EnvStoreKind::Process,
        }
    }

    /// Create an empty in-memory store.
    pub fn memory() -> Self {
        Self::from_memory(BTreeMap::new())
    }

    /// Create an in-memory store seeded with `map`.
    pub fn from_memory(map: BTreeMap<String, String>) -> Self {
        Self {
            kind: EnvStoreKind::Memory(map),
        }
    }

    pub fn is_process(&self) -> bool {
        matches!(self.kind, EnvStoreKind::Process)
    }

    pub fn as_memory(&self) -> Option<&BTreeMap<String, String>> {
        match &self.kind {
            EnvStoreKind::Memory(map) => Some(map),
            EnvStoreKind::Process => None,
        }
    }

    pub fn as_memory_mut(&mut self) -> Option<&mut BTreeMap<String, String>> {
        match &mut self.kind {
            EnvStoreKind::Memory(map) => Some(map),
            EnvStoreKind::Process => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        match &self.kind {
            EnvStoreKind::Process => std::env::var_os(key).is_some(),
            EnvStoreKind::Memory(map) => map.contains_key(key),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match &self.kind {
            EnvStoreKind::Process => {
                std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
            }
            EnvStoreKind::Memory(map) => map.get(key).cloned(),
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        match &mut self.kind {
            // SAFETY: callers of `EnvStore::process` promised exclusive access.
            EnvStoreKind::Process => unsafe { std::env::set_var(key, value) },
            EnvStoreKind::Memory(map) => {
                map.insert(key.to_owned(), value.to_owned());
            }
        }
    }

    /// Write every entry of `table` whose key is not already present.
    ///
    /// Values are stored in their display form (`3000`, `true`, `null`).
    /// A present key is never replaced, even when its value is empty.
    /// Entries the process environment cannot represent are skipped for
    /// every store kind, so memory and process stores load the same keys.
    pub fn merge(&mut self, table: &EnvTable) -> LoadReport {
        let mut report = LoadReport::default();
        for entry in table {
            let value = entry.value.to_string();
            if !is_valid_variable(&entry.key, &value) {
                debug!(key = ?entry.key, line = entry.line, "skipping invalid environment variable");
                report.skipped_invalid += 1;
                continue;
            }

            if self.contains_key(&entry.key) {
                debug!(key = %entry.key, "skipping existing environment variable");
                report.skipped_existing += 1;
                continue;
            }

            self.set(&entry.key, &value);
            report.loaded += 1;
        }
        report
    }
}

/// Merge `incoming` into a copy of `existing`, keeping existing values.
///
/// Entries that [`EnvStore::merge`] would skip as invalid are left out.
pub fn merge_first_wins(
    existing: &BTreeMap<String, String>,
    incoming: &EnvTable,
) -> BTreeMap<String, String> {
    let mut merged = existing.clone();
    for entry in incoming {
        let value = entry.value.to_string();
        if !is_valid_variable(&entry.key, &value) {
            debug!(key = ?entry.key, line = entry.line, "skipping invalid environment variable");
            continue;
        }
        merged.entry(entry.key.clone()).or_insert(value);
    }
    merged
}

// `set_var` panics on these.
fn is_valid_variable(key: &str, value: &str) -> bool {
    !key.is_empty() && !key.contains(['=', '\0']) && !value.contains('\0')
}
