use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::Result;

/// String key/value store with the semantics of browser local storage.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// Volatile store, used by tests and one-off runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store persisted as a flat JSON object. Every write rewrites the file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file starts out empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let raw = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_overwrites() {
        let mut store = MemoryStore::new();
        store.set("k", "a".into()).unwrap();
        store.set("k", "b".into()).unwrap();
        assert_eq!(store.get("k").as_deref(), Some("b"));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("musicPlaying"), None);
        store.set("musicPlaying", "false".into()).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("musicPlaying").as_deref(), Some("false"));
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            JsonFileStore::open(&path).unwrap_err(),
            crate::FxError::Json(_)
        ));
    }
}
