//! Builder configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

use crate::consts::{DEFAULT_LOG_FILTER, DEFAULT_STORE_DIR, SAVED_LAYOUTS_KEY};
use crate::persistence::FileStorage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Directory of the file-backed layout storage.
    pub store_dir: PathBuf,
    /// Storage key holding the saved-layout array.
    pub storage_key: String,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            storage_key: SAVED_LAYOUTS_KEY.to_owned(),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl BuilderConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `PAGEBUILDER_STORE_DIR`: default `.pagebuilder`
    /// - `PAGEBUILDER_STORAGE_KEY`: default `savedLayouts`
    /// - `PAGEBUILDER_LOG`: default `pagebuilder=info`
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key))
    }

    /// Build config from any variable lookup. Unset or blank values fall back
    /// to the defaults.
    #[must_use]
    pub fn from_lookup<F, E>(lookup: F) -> Self
    where
        F: Fn(&str) -> Result<String, E>,
    {
        let defaults = Self::default();
        let var = |key: &str| match lookup(key) {
            Ok(value) if !value.trim().is_empty() => Some(value.trim().to_owned()),
            _ => None,
        };
        Self {
            store_dir: var("PAGEBUILDER_STORE_DIR").map_or(defaults.store_dir, PathBuf::from),
            storage_key: var("PAGEBUILDER_STORAGE_KEY").unwrap_or(defaults.storage_key),
            log_filter: var("PAGEBUILDER_LOG").unwrap_or(defaults.log_filter),
        }
    }

    /// File storage rooted at the configured directory.
    #[must_use]
    pub fn storage(&self) -> FileStorage {
        FileStorage::new(self.store_dir.clone())
    }
}
