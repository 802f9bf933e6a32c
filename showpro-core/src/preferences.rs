//! Client-local preferences.
//!
//! Preferences live next to the user, not in the booking database. The only
//! one the fee engine needs is the default split ratio applied to new
//! bookings, stored under [`DEFAULT_SPLIT_KEY`] as a decimal string.

use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::clamp_split_ratio;

/// Storage key of the default split ratio.
pub const DEFAULT_SPLIT_KEY: &str = "showpro.default_split_ratio";

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("preference storage unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read preferences: {0}")]
    Read(String),

    #[error("failed to write preferences: {0}")]
    Write(String),
}

/// String key/value storage owned by the local client.
pub trait PreferenceStore {
    fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, PreferenceError>;

    fn set(
        &mut self,
        key: &str,
        value: &str,
    ) -> Result<(), PreferenceError>;
}

/// In-process store, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: HashMap<String, String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
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
        Ok(())
    }
}

/// The user's preferred artist share for new bookings.
pub struct DefaultSplitPreference;

impl DefaultSplitPreference {
    /// Reads the stored default split.
    ///
    /// Returns `None` when nothing was saved, when the store cannot be read,
    /// or when the stored value does not parse. Parsed values are clamped
    /// into the valid split band.
    pub fn load(store: &dyn PreferenceStore) -> Option<Decimal> {
        let raw = match store.get(DEFAULT_SPLIT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                warn!(%error, "could not read default split preference");
                return None;
            }
        };

        match raw.trim().parse::<Decimal>() {
            Ok(ratio) => Some(clamp_split_ratio(ratio)),
            Err(error) => {
                warn!(value = %raw, %error, "ignoring unparsable default split preference");
                None
            }
        }
    }

    /// Writes `ratio` as the default split. The value is stored at full
    /// precision.
    pub fn save(
        store: &mut dyn PreferenceStore,
        ratio: Decimal,
    ) -> Result<(), PreferenceError> {
        let ratio = clamp_split_ratio(ratio);
        store.set(DEFAULT_SPLIT_KEY, &ratio.to_string())?;
        debug!(%ratio, "saved default split ratio");
        Ok(())
    }
}
