use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::env::EnvStore;
use crate::error::Error;
use crate::model::{EnvTable, LoadReport};
use crate::parser::parse_env_with_source;
use crate::value::Mapping;
use crate::yaml::parse_yaml;

const DEFAULT_FILE: &str = ".env";

/// Load `.env` from the current working directory into the process
/// environment.
///
/// # Safety
///
/// Mutates the process environment; see [`EnvStore::process`].
pub unsafe fn dotenv() -> Result<LoadReport, Error> {
    // SAFETY: forwarded to the caller.
    unsafe { from_path(DEFAULT_FILE) }
}

/// Load a `.env` file from a specific path into the process environment.
///
/// # Safety
///
/// Mutates the process environment; see [`EnvStore::process`].
pub unsafe fn from_path(path: impl AsRef<Path>) -> Result<LoadReport, Error> {
    // SAFETY: forwarded to the caller.
    let mut loader = EnvLoader::new().path(path).target(unsafe { EnvStore::process() });
    loader.load()
}

/// Load multiple `.env` files into the process environment.
///
/// # Safety
///
/// Mutates the process environment; see [`EnvStore::process`].
pub unsafe fn from_paths<I, P>(paths: I) -> Result<LoadReport, Error>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    // SAFETY: forwarded to the caller.
    let mut loader = EnvLoader::new().paths(paths).target(unsafe { EnvStore::process() });
    loader.load()
}

/// Read and parse a YAML file.
///
/// A missing file is logged and yields `Ok(None)`.
pub fn load_yaml(path: impl AsRef<Path>) -> Result<Option<Mapping>, Error> {
    let path = path.as_ref();
    let Some(content) = read_optional(path)? else {
        warn!(path = %path.display(), "YAML file not found");
        return Ok(None);
    };

    let tree = parse_yaml(&content);
    debug!(path = %path.display(), keys = tree.len(), "loaded YAML file");
    Ok(Some(tree))
}

/// Builder-style `.env` loader.
///
/// Files are merged in order with later files winning, then written into the
/// target store without replacing variables that are already set.
#[derive(Debug, Clone, Default)]
pub struct EnvLoader {
    paths: Vec<PathBuf>,
    required: bool,
    target: EnvStore,
}

impl EnvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.paths
            .extend(paths.into_iter().map(|path| path.as_ref().to_path_buf()));
        self
    }

    /// Fail on missing files instead of skipping them.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn target(mut self, target: EnvStore) -> Self {
        self.target = target;
        self
    }

    pub fn target_env(&self) -> &EnvStore {
        &self.target
    }

    pub fn target_env_mut(&mut self) -> &mut EnvStore {
        &mut self.target
    }

    pub fn into_target(self) -> EnvStore {
        self.target
    }

    /// Parse and merge the configured files without touching the target.
    pub fn parse_only(&self) -> Result<EnvTable, Error> {
        let (table, _) = self.collect_entries()?;
        Ok(table)
    }

    pub fn load(&mut self) -> Result<LoadReport, Error> {
        let (table, files) = self.collect_entries()?;
        let merged = self.target.merge(&table);
        let report = LoadReport {
            files_read: files.files_read,
            files_missing: files.files_missing,
            ..merged
        };

        info!(
            loaded = report.loaded,
            skipped_existing = report.skipped_existing,
            skipped_invalid = report.skipped_invalid,
            files_read = report.files_read,
            "environment variables loaded"
        );
        Ok(report)
    }

    fn collect_entries(&self) -> Result<(EnvTable, LoadReport), Error> {
        let mut merged = EnvTable::new();
        let mut files = LoadReport::default();

        for path in self.effective_paths() {
            let content = if self.required {
                Some(read_required(&path)?)
            } else {
                read_optional(&path)?
            };
            let Some(content) = content else {
                warn!(path = %path.display(), "dotenv file not found, using existing environment");
                files.files_missing += 1;
                continue;
            };

            files.files_read += 1;
            let parsed = parse_env_with_source(&content, Some(&path));
            debug!(path = %path.display(), entries = parsed.len(), "parsed dotenv file");
            merged.extend(parsed);
        }

        Ok((merged, files))
    }

    fn effective_paths(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            vec![PathBuf::from(DEFAULT_FILE)]
        } else {
            self.paths.clone()
        }
    }
}

fn read_required(path: &Path) -> Result<String, Error> {
    let bytes = std::fs::read(path).map_err(|err| Error::file(path, err))?;
    let text = String::from_utf8(bytes).map_err(|err| err.utf8_error())?;
    Ok(text)
}

fn read_optional(path: &Path) -> Result<Option<String>, Error> {
    match read_required(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}
