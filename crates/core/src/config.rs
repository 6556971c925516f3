//! Persisted-state configuration.
//!
//! Resolved once at process startup and passed into controllers. The
//! `*_from_env_value` helpers take the raw variable value so callers decide when the
//! environment is read and tests never have to mutate it.

use crate::constants::{DEFAULT_STATE_DIR, DEFAULT_STATE_TTL_DAYS};
use crate::error::{StorageError, StorageResult};
use crate::storage::{DirStore, PersistedState};
use chrono::Duration;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where persisted form state lives and how long it is kept.
#[derive(Clone, Debug)]
pub struct StateConfig {
    state_dir: PathBuf,
    ttl: Duration,
}

impl StateConfig {
    pub fn new(state_dir: PathBuf, ttl: Duration) -> StorageResult<Self> {
        if ttl <= Duration::zero() {
            return Err(StorageError::InvalidConfig(
                "state TTL must be at least one day".into(),
            ));
        }
        Ok(Self { state_dir, ttl })
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Opens the directory store and wraps it with the configured TTL.
    pub fn open(&self) -> StorageResult<PersistedState> {
        let store = DirStore::open(&self.state_dir)?;
        Ok(PersistedState::new(Arc::new(store), self.ttl))
    }
}

/// Parses `CAMP_STATE_TTL_DAYS`; unset or blank means the 30-day default.
pub fn state_ttl_from_env_value(value: Option<String>) -> StorageResult<Duration> {
    let Some(raw) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(Duration::days(DEFAULT_STATE_TTL_DAYS));
    };
    match raw.trim().parse::<i64>() {
        Ok(days) if (1..=3650).contains(&days) => Ok(Duration::days(days)),
        _ => Err(StorageError::InvalidConfig(format!(
            "CAMP_STATE_TTL_DAYS must be a whole number of days between 1 and 3650, got {raw:?}"
        ))),
    }
}

/// Parses `CAMP_STATE_DIR`, defaulting to `.camp-state` in the working directory.
pub fn state_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ttl_defaults_to_thirty_days() {
        assert_eq!(state_ttl_from_env_value(None).unwrap(), Duration::days(30));
        assert_eq!(
            state_ttl_from_env_value(Some("  ".into())).unwrap(),
            Duration::days(30)
        );
    }

    #[test]
    fn test_ttl_parses_days() {
        assert_eq!(
            state_ttl_from_env_value(Some("7".into())).unwrap(),
            Duration::days(7)
        );
    }

    #[test]
    fn test_ttl_rejects_nonsense() {
        for raw in ["0", "-3", "week", "99999"] {
            assert!(
                matches!(
                    state_ttl_from_env_value(Some(raw.into())),
                    Err(StorageError::InvalidConfig(_))
                ),
                "accepted {raw}"
            );
        }
    }

    #[test]
    fn test_state_dir_default_and_override() {
        assert_eq!(state_dir_from_env_value(None), PathBuf::from(".camp-state"));
        assert_eq!(
            state_dir_from_env_value(Some("/tmp/camp".into())),
            PathBuf::from("/tmp/camp")
        );
    }

    #[test]
    fn test_open_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested/state");
        let config = StateConfig::new(dir.clone(), Duration::days(1)).unwrap();
        let state = config.open().unwrap();
        assert!(dir.is_dir());
        assert_eq!(state.ttl(), Duration::days(1));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        assert!(StateConfig::new(PathBuf::from("x"), Duration::zero()).is_err());
    }
}
