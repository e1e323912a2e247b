//! Persisted usage state behind an injectable store.
//!
//! The store is passed in explicitly wherever usage is read or written, so
//! tests run against [`MemoryStore`] and the CLI against [`JsonFileStore`].

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Cumulative per-account usage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub seconds_transcribed: f64,
}

pub trait UsageStore: Send + Sync {
    fn load(&self) -> Result<UsageRecord, StoreError>;
    fn save(&self, record: &UsageRecord) -> Result<(), StoreError>;
}

/// Mutex-backed store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    record: Mutex<UsageRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UsageStore for MemoryStore {
    fn load(&self) -> Result<UsageRecord, StoreError> {
        Ok(self.record.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }

    fn save(&self, record: &UsageRecord) -> Result<(), StoreError> {
        *self.record.lock().unwrap_or_else(|p| p.into_inner()) = record.clone();
        Ok(())
    }
}

/// JSON-on-disk store. A missing file reads as a fresh record.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl UsageStore for JsonFileStore {
    fn load(&self) -> Result<UsageRecord, StoreError> {
        if !self.path.exists() {
            return Ok(UsageRecord::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, record: &UsageRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), UsageRecord::default());

        let record = UsageRecord {
            seconds_transcribed: 42.5,
        };
        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), record);
    }

    #[test]
    fn file_store_missing_file_reads_fresh() {
        let store = JsonFileStore::new(std::env::temp_dir().join("voicepad-usage-missing.json"));
        assert_eq!(store.load().unwrap(), UsageRecord::default());
    }

    #[test]
    fn file_store_round_trips() {
        let path = std::env::temp_dir().join("voicepad-usage-roundtrip.json");
        let _ = std::fs::remove_file(&path);

        let store = JsonFileStore::new(path.clone());
        let record = UsageRecord {
            seconds_transcribed: 301.25,
        };
        store.save(&record).unwrap();
        assert_eq!(store.load().unwrap(), record);

        let _ = std::fs::remove_file(&path);
    }
}
