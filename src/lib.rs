//! Parse `.env` files and block-style YAML into typed configuration values.
//!
//! [`parse_env`] and [`parse_yaml`] are pure and never fail on text input:
//! lines they cannot make sense of are skipped. Scalars go through
//! [`coerce`], which turns `true`, `false`, `null` and numeric text into typed
//! [`Value`]s and leaves quoted text alone.
//!
//! [`EnvLoader`] reads files and merges their entries into an [`EnvStore`]
//! without replacing variables that are already set. The store defaults to an
//! in-memory map; the process environment is opt-in through the `unsafe`
//! [`EnvStore::process`] and the convenience loaders (`dotenv`, `from_path`,
//! `from_paths`), because callers must guarantee no concurrent
//! process-environment access.

mod env;
mod error;
mod loader;
mod model;
mod parser;
mod scalar;
mod value;
mod yaml;

pub use env::{EnvStore, merge_first_wins};
pub use error::Error;
pub use loader::{EnvLoader, dotenv, from_path, from_paths, load_yaml};
pub use model::{EnvTable, Entry, LoadReport};
pub use parser::{parse_env, parse_env_bytes, parse_env_reader};
pub use scalar::{Coerce, coerce};
pub use value::{Mapping, Value};
pub use yaml::{parse_yaml, parse_yaml_bytes, parse_yaml_reader};
