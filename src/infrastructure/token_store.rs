use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::domain::errors::TokenStoreError;
use crate::domain::ports::{TokenStore, TRACKING_TOKEN_KEY};

/// Stores the tracking token in a small JSON key/value file, so other keys
/// written by the same client survive a save or clear.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, TokenStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), TokenStoreError> {
        let raw = serde_json::to_string_pretty(entries)?;
        // Replaced atomically via a sibling temp file.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(TRACKING_TOKEN_KEY)
            .filter(|token| !token.is_empty())
            .cloned())
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        let mut entries = self.read_entries()?;
        entries.insert(TRACKING_TOKEN_KEY.to_string(), token.to_string());
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        let mut entries = self.read_entries()?;
        if entries.remove(TRACKING_TOKEN_KEY).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// Token store that lives only as long as the process.
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::default();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(TRACKING_TOKEN_KEY.to_string(), token.to_string());
        }
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(TRACKING_TOKEN_KEY).cloned())
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(TRACKING_TOKEN_KEY.to_string(), token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(TRACKING_TOKEN_KEY);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("order-token-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn file_store_missing_file_loads_none() {
        let store = FileTokenStore::new(temp_path());
        assert!(store.load().expect("load failed").is_none());
    }

    #[test]
    fn file_store_save_replaces_previous_token() {
        let path = temp_path();
        let store = FileTokenStore::new(&path);

        store.save("first").expect("save failed");
        store.save("second").expect("save failed");
        let reopened = FileTokenStore::new(&path);
        let loaded = reopened.load().expect("load failed");
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.as_deref(), Some("second"));
    }

    #[test]
    fn file_store_clear_keeps_other_keys() {
        let path = temp_path();
        std::fs::write(&path, r#"{"theme":"dark","zitan_order_token":"abc"}"#)
            .expect("seed file");
        let store = FileTokenStore::new(&path);

        store.clear().expect("clear failed");
        let raw = std::fs::read_to_string(&path).expect("read file");
        std::fs::remove_file(&path).ok();

        assert!(!raw.contains(TRACKING_TOKEN_KEY));
        assert!(raw.contains("dark"));
    }

    #[test]
    fn file_store_reports_corruption() {
        let path = temp_path();
        std::fs::write(&path, "{not json").expect("seed file");
        let store = FileTokenStore::new(&path);

        let result = store.load();
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(TokenStoreError::Corrupt(_))));
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryTokenStore::with_token("abc");
        assert_eq!(store.load().expect("load").as_deref(), Some("abc"));
        store.clear().expect("clear");
        assert!(store.load().expect("load").is_none());
    }
}
