//! Persisted client-side state.
//!
//! In-progress records survive restarts by being written as JSON into named slots of a
//! [`StateStore`], the local analogue of browser local storage. Every entry is stamped
//! with the time it was saved:
//!
//! ```text
//! <state_dir>/
//!   fcfCampsSelection.json        {"saved_at": "...", "value": {"city": "bogota", ...}}
//!   fcfCampsFormData.json         {"saved_at": "...", "value": {"step": 3, "record": {...}}}
//!   fcfCampsAdditionalData.json
//! ```
//!
//! Lifecycle rules: entries older than the configured TTL are discarded when read, a
//! slot is cleared when its form is submitted or reset, and unreadable entries are
//! logged and discarded so the caller starts from an empty form.

use crate::constants::{ALL_SLOTS, SLOT_FILE_EXTENSION};
use crate::error::{StorageError, StorageResult};
use crate::record::FormRecord;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Key-value storage over named slots.
pub trait StateStore: Send + Sync {
    fn get(&self, slot: &str) -> StorageResult<Option<String>>;
    fn set(&self, slot: &str, contents: &str) -> StorageResult<()>;
    fn remove(&self, slot: &str) -> StorageResult<()>;
}

fn validate_slot(slot: &str) -> StorageResult<()> {
    const MAX_SLOT_LEN: usize = 64;

    let ok = !slot.is_empty()
        && slot.len() <= MAX_SLOT_LEN
        && slot
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'-' | b'_'));
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidSlot(slot.to_string()))
    }
}

/// One JSON file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Opens (creating if needed) the state directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidDirectory`] if the path exists but is not a
    /// directory or cannot be created.
    pub fn open(dir: &Path) -> StorageResult<Self> {
        if dir.exists() && !dir.is_dir() {
            return Err(StorageError::InvalidDirectory(format!(
                "Path is not a directory: {}",
                dir.display()
            )));
        }
        fs::create_dir_all(dir).map_err(|e| {
            StorageError::InvalidDirectory(format!("Cannot create {}: {}", dir.display(), e))
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, slot: &str) -> StorageResult<PathBuf> {
        validate_slot(slot)?;
        Ok(self.dir.join(format!("{slot}.{SLOT_FILE_EXTENSION}")))
    }
}

impl StateStore for DirStore {
    fn get(&self, slot: &str) -> StorageResult<Option<String>> {
        let path = self.slot_path(slot)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read(e)),
        }
    }

    fn set(&self, slot: &str, contents: &str) -> StorageResult<()> {
        let path = self.slot_path(slot)?;
        // Write-then-rename so a crash never leaves a half-written slot behind.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, contents).map_err(StorageError::Write)?;
        fs::rename(&tmp, &path).map_err(StorageError::Write)
    }

    fn remove(&self, slot: &str) -> StorageResult<()> {
        let path = self.slot_path(slot)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Remove(e)),
        }
    }
}

/// In-memory store for tests and short-lived sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StateStore for MemoryStore {
    fn get(&self, slot: &str) -> StorageResult<Option<String>> {
        validate_slot(slot)?;
        Ok(self.slots().get(slot).cloned())
    }

    fn set(&self, slot: &str, contents: &str) -> StorageResult<()> {
        validate_slot(slot)?;
        self.slots().insert(slot.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, slot: &str) -> StorageResult<()> {
        validate_slot(slot)?;
        self.slots().remove(slot);
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Stamped<T> {
    saved_at: DateTime<Utc>,
    value: T,
}

/// Progress of a multi-step form as persisted between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub step: usize,
    pub record: FormRecord,
}

/// The landing page's preselected city, camp date and category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Selection {
    pub city: String,
    pub camp_date: String,
    pub category: String,
}

/// Typed access to a [`StateStore`] with TTL-based expiry.
#[derive(Clone)]
pub struct PersistedState {
    store: Arc<dyn StateStore>,
    ttl: Duration,
}

impl std::fmt::Debug for PersistedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedState")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl PersistedState {
    pub fn new(store: Arc<dyn StateStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stores `value` in `slot`, stamped with the current time.
    pub fn save<T: Serialize>(&self, slot: &str, value: &T) -> StorageResult<()> {
        self.save_at(slot, value, Utc::now())
    }

    pub(crate) fn save_at<T: Serialize>(
        &self,
        slot: &str,
        value: &T,
        saved_at: DateTime<Utc>,
    ) -> StorageResult<()> {
        let json = serde_json::to_string(&Stamped { saved_at, value })
            .map_err(StorageError::Serialization)?;
        self.store.set(slot, &json)
    }

    /// Reads `slot`, discarding entries that are expired or unreadable.
    ///
    /// Never fails: storage and parse problems are logged and reported as `None`.
    pub fn load<T: DeserializeOwned>(&self, slot: &str) -> Option<T> {
        self.load_at(slot, Utc::now())
    }

    pub(crate) fn load_at<T: DeserializeOwned>(&self, slot: &str, now: DateTime<Utc>) -> Option<T> {
        let raw = match self.store.get(slot) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Could not read persisted slot {}: {}", slot, e);
                return None;
            }
        };

        let stamped = match parse_stamped::<T>(&raw) {
            Ok(stamped) => stamped,
            Err(e) => {
                tracing::warn!("Discarding malformed persisted slot {}: {}", slot, e);
                self.discard(slot);
                return None;
            }
        };

        if now - stamped.saved_at > self.ttl {
            tracing::info!(
                "Discarding persisted slot {} saved at {} (older than {} days)",
                slot,
                stamped.saved_at,
                self.ttl.num_days()
            );
            self.discard(slot);
            return None;
        }

        Some(stamped.value)
    }

    pub fn clear(&self, slot: &str) -> StorageResult<()> {
        self.store.remove(slot)
    }

    /// Removes every slot the site writes.
    pub fn clear_all(&self) -> StorageResult<()> {
        ALL_SLOTS.iter().try_for_each(|slot| self.store.remove(slot))
    }

    fn discard(&self, slot: &str) {
        if let Err(e) = self.store.remove(slot) {
            tracing::warn!("Could not remove persisted slot {}: {}", slot, e);
        }
    }
}

fn parse_stamped<T: DeserializeOwned>(raw: &str) -> StorageResult<Stamped<T>> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        StorageError::Malformed {
            path: if path.is_empty() || path == "." {
                "<root>".into()
            } else {
                path
            },
            message: err.into_inner().to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{REGISTRATION_SLOT, SELECTION_SLOT};
    use crate::value::FieldValue;
    use tempfile::TempDir;

    fn state(store: Arc<dyn StateStore>) -> PersistedState {
        PersistedState::new(store, Duration::days(30))
    }

    #[test]
    fn test_dir_store_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = DirStore::open(&temp.path().join("state")).unwrap();

        assert_eq!(store.get(REGISTRATION_SLOT).unwrap(), None);
        store.set(REGISTRATION_SLOT, "{}").unwrap();
        assert_eq!(store.get(REGISTRATION_SLOT).unwrap().as_deref(), Some("{}"));
        assert!(temp.path().join("state/fcfCampsFormData.json").exists());

        store.remove(REGISTRATION_SLOT).unwrap();
        store.remove(REGISTRATION_SLOT).unwrap();
        assert_eq!(store.get(REGISTRATION_SLOT).unwrap(), None);
    }

    #[test]
    fn test_dir_store_rejects_file_path() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("not-a-dir");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            DirStore::open(&file),
            Err(StorageError::InvalidDirectory(_))
        ));
    }

    #[test]
    fn test_slot_names_are_validated() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StorageError::InvalidSlot(_))
        ));
        assert!(store.get("").is_err());
    }

    #[test]
    fn test_snapshot_round_trip_preserves_values() {
        let persisted = state(Arc::new(MemoryStore::new()));
        let record = FormRecord::new()
            .with("childName", "Ana María")
            .with("termsAccepted", true)
            .with("childDocFile", FieldValue::Null);
        let snapshot = FormSnapshot { step: 4, record };

        persisted.save(REGISTRATION_SLOT, &snapshot).unwrap();
        let loaded: FormSnapshot = persisted.load(REGISTRATION_SLOT).unwrap();

        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_expired_entry_is_discarded() {
        let store = Arc::new(MemoryStore::new());
        let persisted = state(store.clone());
        let selection = Selection {
            city: "bogota".into(),
            camp_date: "bog-1".into(),
            category: "infantil".into(),
        };
        let saved_at = Utc::now() - Duration::days(31);
        persisted.save_at(SELECTION_SLOT, &selection, saved_at).unwrap();

        assert_eq!(persisted.load::<Selection>(SELECTION_SLOT), None);
        assert_eq!(store.get(SELECTION_SLOT).unwrap(), None);
    }

    #[test]
    fn test_malformed_entry_falls_back_to_none() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                REGISTRATION_SLOT,
                r#"{"saved_at": "2025-01-01T00:00:00Z", "value": {"step": "three"}}"#,
            )
            .unwrap();
        let persisted = state(store.clone());

        assert_eq!(persisted.load::<FormSnapshot>(REGISTRATION_SLOT), None);
        assert_eq!(store.get(REGISTRATION_SLOT).unwrap(), None);
    }

    #[test]
    fn test_parse_error_reports_path() {
        let err = parse_stamped::<FormSnapshot>(
            r#"{"saved_at": "2025-01-01T00:00:00Z", "value": {"step": "three", "record": {}}}"#,
        )
        .unwrap_err();
        assert!(
            matches!(err, StorageError::Malformed { ref path, .. } if path == "value.step"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_selection_accepts_partial_json() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                SELECTION_SLOT,
                &format!(
                    r#"{{"saved_at": "{}", "value": {{"city": "barranquilla"}}}}"#,
                    Utc::now().to_rfc3339()
                ),
            )
            .unwrap();
        let loaded: Selection = state(store).load(SELECTION_SLOT).unwrap();
        assert_eq!(loaded.city, "barranquilla");
        assert_eq!(loaded.camp_date, "");
    }

    #[test]
    fn test_clear_all_removes_every_slot() {
        let store = Arc::new(MemoryStore::new());
        for slot in ALL_SLOTS {
            store.set(slot, "{}").unwrap();
        }
        state(store.clone()).clear_all().unwrap();
        for slot in ALL_SLOTS {
            assert_eq!(store.get(slot).unwrap(), None);
        }
    }
}
