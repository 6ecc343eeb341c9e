//! Local storage API.
//!
//! Each key is one file under the store directory. Structured values are
//! JSON; the theme preference is stored as a bare string.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::{ApplianceEntry, PredictionRecord, Theme};
use crate::{StoreError, StoreResult};

/// Number of most-recent predictions kept in the local history.
pub const HISTORY_LIMIT: usize = 30;

pub mod keys {
    pub const APPLIANCES: &str = "aires_appliances_v1";
    pub const PREDICTION_HISTORY: &str = "prediction_history_v2";
    pub const THEME: &str = "enerpredict_theme";
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    root_dir: PathBuf,
}

impl LocalStore {
    pub fn new(root_dir: PathBuf) -> StoreResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn item_path(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root_dir.join(format!("{key}.json")))
    }

    pub fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.item_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    pub fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.item_path(key)?;
        fs::write(path, value)?;
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> StoreResult<()> {
        let path = self.item_path(key)?;
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get_item(key)? {
            Some(content) => Ok(Some(serde_json::from_str(&content)?)),
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let content = serde_json::to_string(value)?;
        self.set_item(key, &content)
    }

    pub fn load_appliances(&self) -> StoreResult<Vec<ApplianceEntry>> {
        Ok(self.read_json(keys::APPLIANCES)?.unwrap_or_default())
    }

    pub fn save_appliances(&self, appliances: &[ApplianceEntry]) -> StoreResult<()> {
        self.write_json(keys::APPLIANCES, appliances)
    }

    /// Local prediction history, newest first.
    pub fn load_history(&self) -> StoreResult<Vec<PredictionRecord>> {
        Ok(self.read_json(keys::PREDICTION_HISTORY)?.unwrap_or_default())
    }

    /// Prepend a record and keep only the newest `HISTORY_LIMIT` entries.
    pub fn push_history(&self, record: PredictionRecord) -> StoreResult<Vec<PredictionRecord>> {
        let mut history = self.load_history()?;
        history.insert(0, record);
        history.truncate(HISTORY_LIMIT);
        self.write_json(keys::PREDICTION_HISTORY, &history)?;
        Ok(history)
    }

    pub fn clear_history(&self) -> StoreResult<()> {
        self.remove_item(keys::PREDICTION_HISTORY)
    }

    pub fn theme(&self) -> StoreResult<Option<Theme>> {
        self.get_item(keys::THEME)?
            .map(|raw| raw.parse())
            .transpose()
    }

    pub fn set_theme(&self, theme: Theme) -> StoreResult<()> {
        self.set_item(keys::THEME, theme.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_like_keys() {
        let dir = std::env::temp_dir().join("ep_store_unit_keys");
        let store = LocalStore::new(dir).unwrap();
        assert!(matches!(
            store.get_item("../escape"),
            Err(StoreError::InvalidKey { .. })
        ));
        assert!(matches!(store.set_item("", "x"), Err(StoreError::InvalidKey { .. })));
    }
}
