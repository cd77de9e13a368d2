//! Prediction history model
//!
//! Optional JSON-file log of past predictions. Writes are best effort: a
//! failing disk never fails the prediction that triggered the write.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::InputRecord;
use crate::prediction::PredictionResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub input: BTreeMap<String, f64>,
    pub result: PredictionResult,
}

impl HistoryEntry {
    pub fn new(input: &InputRecord, result: &PredictionResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            input: input.fields().clone(),
            result: result.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteHistoryResponse {
    pub deleted: bool,
}

/// File-backed history. The mutex serializes read-modify-write cycles.
///
/// Every method does blocking file I/O; async callers go through
/// `tokio::task::spawn_blocking`.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry for a finished prediction
    pub fn record(&self, input: &InputRecord, result: &PredictionResult) -> Option<HistoryEntry> {
        let entry = HistoryEntry::new(input, result);

        let _guard = self.lock.lock();
        let mut entries = self.read_all();
        entries.push(entry.clone());

        match self.write_all(&entries) {
            Ok(()) => Some(entry),
            Err(e) => {
                tracing::warn!("Failed to persist history entry: {}", e);
                None
            }
        }
    }

    /// All entries, newest first
    pub fn list(&self) -> Vec<HistoryEntry> {
        let _guard = self.lock.lock();
        let mut entries = self.read_all();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    /// Remove an entry; `Ok(false)` when no entry has that id
    pub fn delete(&self, id: Uuid) -> std::io::Result<bool> {
        let _guard = self.lock.lock();
        let mut entries = self.read_all();
        let before = entries.len();
        entries.retain(|e| e.id != id);

        if entries.len() == before {
            return Ok(false);
        }

        self.write_all(&entries)?;
        Ok(true)
    }

    /// Missing or unreadable files read as an empty history
    fn read_all(&self) -> Vec<HistoryEntry> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read history {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!("Ignoring corrupt history {}: {}", self.path.display(), e);
            Vec::new()
        })
    }

    /// Write a sibling temp file, then rename it over the history so a
    /// crash mid-write leaves the previous file intact.
    fn write_all(&self, entries: &[HistoryEntry]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(entries)?;

        let tmp = self.tmp_path();
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(&json)?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&tmp, &self.path)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "history".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(age: f64) -> InputRecord {
        [("age", age), ("gender_Male", 1.0)].into_iter().collect()
    }

    #[test]
    fn test_record_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        assert!(store.list().is_empty());

        let first = store.record(&record(40.0), &PredictionResult::new(false, 0.2)).unwrap();
        let second = store.record(&record(70.0), &PredictionResult::new(true, 0.9)).unwrap();

        let entries = store.list();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].timestamp >= entries[1].timestamp);
        assert!(entries.iter().any(|e| e.id == first.id));
        assert!(entries.iter().any(|e| e.id == second.id && e.input["age"] == 70.0));
    }

    #[test]
    fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        let entry = store.record(&record(55.0), &PredictionResult::new(true, 0.7)).unwrap();

        assert!(!store.delete(Uuid::new_v4()).unwrap());
        assert!(store.delete(entry.id).unwrap());
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, b"not json").unwrap();

        let store = HistoryStore::new(&path);
        assert!(store.list().is_empty());

        // The next write replaces the corrupt file
        store.record(&record(33.0), &PredictionResult::new(false, 0.1)).unwrap();
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_write_replaces_file_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        store.record(&record(61.0), &PredictionResult::new(true, 0.8)).unwrap();
        store.record(&record(62.0), &PredictionResult::new(true, 0.8)).unwrap();

        assert!(!store.tmp_path().exists());
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("history.json")]);
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_concurrent_records_are_all_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));

        std::thread::scope(|s| {
            for i in 0..8 {
                let store = &store;
                s.spawn(move || {
                    store
                        .record(&record(40.0 + i as f64), &PredictionResult::new(false, 0.2))
                        .unwrap();
                });
            }
        });

        assert_eq!(store.list().len(), 8);
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("nested").join("history.json"));
        assert!(store.record(&record(48.0), &PredictionResult::new(false, 0.3)).is_some());
        assert!(store.path().exists());
    }
}
