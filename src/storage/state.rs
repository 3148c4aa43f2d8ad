//! State file for resumable rotation
//!
//! The document holds exactly three keys:
//!
//! ```json
//! {
//!   "available": [["typescript", "02"], ["css_rendering", "00"]],
//!   "used": [["testing", "01"]],
//!   "last_theme": "testing"
//! }
//! ```
//!
//! Loading never fails. A missing, unreadable or malformed file yields a
//! freshly shuffled pool; pairs that no longer exist in the catalog are
//! dropped; a file recording an exhausted pool starts a new cycle.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::{StorageError, StorageResult};
use crate::scheduler::pair::{Pair, PairUniverse};
use crate::scheduler::pool::PoolState;

/// Default state file name, relative to the working directory
pub const DEFAULT_STATE_FILE: &str = "session_state.json";

// ============================================================================
// State Document
// ============================================================================

/// On-disk shape of the pool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Pairs not yet served, in shuffle order
    #[serde(default)]
    pub available: Vec<Pair>,

    /// Pairs served this cycle
    #[serde(default)]
    pub used: Vec<Pair>,

    /// Topic of the most recently served pair
    #[serde(default)]
    pub last_theme: Option<String>,
}

impl PersistedState {
    /// Snapshot a pool; `used` is written sorted so saves are stable
    pub fn from_pool(pool: &PoolState) -> Self {
        let mut used: Vec<Pair> = pool.used().iter().cloned().collect();
        used.sort();

        Self {
            available: pool.available().to_vec(),
            used,
            last_theme: pool.last_topic().map(str::to_string),
        }
    }

    /// Rebuild a pool, keeping only pairs present in `universe`
    ///
    /// The returned pool may have nothing available; callers decide whether
    /// that starts a new cycle.
    pub fn into_pool(self, universe: &PairUniverse) -> PoolState {
        let stored = self.available.len() + self.used.len();

        let used: HashSet<Pair> = self
            .used
            .into_iter()
            .filter(|pair| universe.contains(pair))
            .collect();
        let available = self
            .available
            .into_iter()
            .filter(|pair| universe.contains(pair));

        let pool = PoolState::from_parts(available, used, self.last_theme);

        let kept = pool.available().len() + pool.used().len();
        if kept < stored {
            tracing::debug!(
                stored,
                kept,
                dropped = stored - kept,
                "Dropped stale or duplicate pairs from saved state"
            );
        }

        pool
    }
}

// ============================================================================
// State Store
// ============================================================================

/// Reads and writes the pool state file
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Create a store for the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// State file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if a state file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read and parse the state file
    ///
    /// Returns `Ok(None)` when no file exists.
    pub fn read(&self) -> StorageResult<Option<PersistedState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| StorageError::io("read", &self.path, e))?;
        let state = serde_json::from_str(&content)?;

        tracing::debug!(path = %self.path.display(), "State file read");
        Ok(Some(state))
    }

    /// Load the pool for `universe`, falling back to a fresh shuffle
    pub fn load<R: Rng + ?Sized>(&self, universe: &PairUniverse, rng: &mut R) -> PoolState {
        let persisted = match self.read() {
            Ok(Some(persisted)) => persisted,
            Ok(None) => {
                let pool = PoolState::fresh(universe, rng);
                tracing::info!(
                    available = pool.available().len(),
                    "Starting fresh: {} questions available",
                    pool.available().len()
                );
                return pool;
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Could not read state file, starting fresh"
                );
                return PoolState::fresh(universe, rng);
            }
        };

        let last_theme = persisted.last_theme.clone();
        let pool = persisted.into_pool(universe);

        if pool.is_exhausted() {
            tracing::info!("All questions have been asked, resetting for a new cycle");
            let mut pool = PoolState::fresh(universe, rng);
            pool.set_last_topic(last_theme);
            return pool;
        }

        tracing::info!(
            used = pool.used().len(),
            total = universe.len(),
            remaining = pool.available().len(),
            "Restored state: {}/{} questions already asked ({} remaining)",
            pool.used().len(),
            universe.len(),
            pool.available().len()
        );
        pool
    }

    /// Write the pool, replacing the previous file as a whole
    ///
    /// The document is written to a sibling temporary file and renamed over
    /// the state file, so readers never observe a partial document.
    pub fn save(&self, pool: &PoolState) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| StorageError::io("create directory", parent, e))?;
            }
        }

        let document = serde_json::to_vec_pretty(&PersistedState::from_pool(pool))?;
        let temp_path = self.temp_path();

        fs::write(&temp_path, document).map_err(|e| StorageError::io("write", &temp_path, e))?;
        fs::rename(&temp_path, &self.path)
            .map_err(|e| StorageError::io("rename", &self.path, e))?;

        tracing::debug!(
            path = %self.path.display(),
            available = pool.available().len(),
            used = pool.used().len(),
            "State saved"
        );
        Ok(())
    }

    /// Delete the state file, returning whether one existed
    pub fn delete(&self) -> StorageResult<bool> {
        if !self.path.exists() {
            return Ok(false);
        }

        fs::remove_file(&self.path).map_err(|e| StorageError::io("delete", &self.path, e))?;
        tracing::debug!(path = %self.path.display(), "State file deleted");
        Ok(true)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_STATE_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_FILE)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tempfile::TempDir;

    fn universe() -> PairUniverse {
        PairUniverse::from_topics(vec![
            ("a".to_string(), vec!["00".to_string(), "01".to_string()]),
            ("b".to_string(), vec!["00".to_string(), "01".to_string()]),
        ])
    }

    fn store_in(dir: &TempDir) -> StateStore {
        StateStore::new(dir.path().join("session_state.json"))
    }

    #[test]
    fn test_missing_file_gives_fresh_pool() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert!(store.read().unwrap().is_none());

        let pool = store.load(&universe(), &mut rng);
        assert_eq!(pool.available().len(), 4);
        assert!(pool.used().is_empty());
        assert_eq!(pool.last_topic(), None);
    }

    #[test]
    fn test_save_writes_expected_document() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut pool = PoolState::from_parts(
            vec![Pair::new("a", "00"), Pair::new("b", "01")],
            vec![],
            None,
        );
        pool.mark(&Pair::new("b", "01"));
        store.save(&pool).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 3);
        assert_eq!(value["available"], serde_json::json!([["a", "00"]]));
        assert_eq!(value["used"], serde_json::json!([["b", "01"]]));
        assert_eq!(value["last_theme"], serde_json::json!("b"));
    }

    #[test]
    fn test_save_then_load_restores_pool() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let mut pool = PoolState::fresh(&universe(), &mut rng);
        pool.mark(&Pair::new("a", "01"));
        pool.mark(&Pair::new("b", "00"));
        store.save(&pool).unwrap();

        let loaded = store.load(&universe(), &mut rng);

        let available: HashSet<&Pair> = loaded.available().iter().collect();
        let expected: HashSet<&Pair> = pool.available().iter().collect();
        assert_eq!(available, expected);
        assert_eq!(loaded.available().len(), 2);
        assert_eq!(loaded.used(), pool.used());
        assert_eq!(loaded.last_topic(), Some("b"));
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        store.save(&PoolState::fresh(&universe(), &mut rng)).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("nested/deeper/state.json"));
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        store.save(&PoolState::fresh(&universe(), &mut rng)).unwrap();
        assert!(store.exists());
    }

    #[test]
    fn test_null_last_theme_and_missing_keys() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"{"available": [["a", "00"]], "last_theme": null}"#).unwrap();

        let state = store.read().unwrap().unwrap();
        assert_eq!(state.available, vec![Pair::new("a", "00")]);
        assert!(state.used.is_empty());
        assert_eq!(state.last_theme, None);
    }

    #[test]
    fn test_read_malformed_is_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.read(), Err(StorageError::Malformed(_))));
    }

    #[test]
    fn test_wrong_shape_falls_back_to_fresh() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"{"available": [["a", "00", "extra"]], "used": 5}"#).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let pool = store.load(&universe(), &mut rng);
        assert_eq!(pool.available().len(), 4);
        assert!(pool.used().is_empty());
    }

    #[test]
    fn test_exhausted_file_starts_new_cycle_with_last_theme() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{"available": [], "used": [["a","00"],["a","01"],["b","00"],["b","01"]], "last_theme": "b"}"#,
        )
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let pool = store.load(&universe(), &mut rng);
        assert_eq!(pool.available().len(), 4);
        assert!(pool.used().is_empty());
        assert_eq!(pool.last_topic(), Some("b"));
    }

    #[test]
    fn test_stale_available_only_starts_new_cycle() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{"available": [["gone","00"]], "used": [["a","00"]], "last_theme": "a"}"#,
        )
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let pool = store.load(&universe(), &mut rng);
        assert_eq!(pool.available().len(), 4);
        assert!(pool.used().is_empty());
    }

    #[test]
    fn test_into_pool_filters_and_dedupes() {
        let state = PersistedState {
            available: vec![
                Pair::new("a", "01"),
                Pair::new("a", "01"),
                Pair::new("b", "07"),
                Pair::new("b", "00"),
            ],
            used: vec![Pair::new("a", "00"), Pair::new("b", "00"), Pair::new("x", "00")],
            last_theme: Some("b".to_string()),
        };

        let pool = state.into_pool(&universe());

        assert_eq!(pool.available(), &[Pair::new("a", "01")]);
        assert_eq!(pool.used().len(), 2);
        assert!(pool.used().contains(&Pair::new("b", "00")));
        assert_eq!(pool.last_topic(), Some("b"));
    }

    #[test]
    fn test_delete() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert!(!store.delete().unwrap());
        store.save(&PoolState::fresh(&universe(), &mut rng)).unwrap();
        assert!(store.delete().unwrap());
        assert!(!store.exists());
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let store = StateStore::new("/var/lib/askloop/state.json");
        assert_eq!(
            store.temp_path(),
            PathBuf::from("/var/lib/askloop/state.json.tmp")
        );
    }
}
