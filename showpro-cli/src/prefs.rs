//! File-backed client-local preferences.
//!
//! Keys and values are plain strings kept in a flat TOML table:
//!
//! ```toml
//! "showpro.default_split_ratio" = "0.9"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use showpro_core::preferences::{PreferenceError, PreferenceStore};
use tracing::debug;

/// Preference store persisted to a TOML file.
///
/// The file is read once on open and rewritten on every `set`. A missing
/// file is an empty store.
#[derive(Debug)]
pub struct TomlPreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl TomlPreferenceStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferenceError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).map_err(|e| {
                PreferenceError::Read(format!("'{}' is not valid TOML: {e}", path.display()))
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(PreferenceError::Read(format!(
                    "cannot read '{}': {e}",
                    path.display()
                )));
            }
        };
        debug!(path = %path.display(), entries = values.len(), "opened preference file");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), PreferenceError> {
        let contents = toml::to_string(&self.values)
            .map_err(|e| PreferenceError::Write(e.to_string()))?;
        fs::write(&self.path, contents).map_err(|e| {
            PreferenceError::Write(format!("cannot write '{}': {e}", self.path.display()))
        })
    }
}

impl PreferenceStore for TomlPreferenceStore {
    fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, PreferenceError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(
        &mut self,
        key: &str,
        value: &str,
    ) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }
}
