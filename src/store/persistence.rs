use crate::error::StorageError;
use crate::model::{Camera, Device};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Entry name the dashboard state is stored under
pub const DEFAULT_STORAGE_KEY: &str = "smart-home-storage";

/// Serialized part of the store: the two collections, nothing else
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub devices: Vec<Device>,
    pub cameras: Vec<Camera>,
}

/// On-disk wrapper around a snapshot. The version is written but never
/// checked on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedEnvelope {
    pub state: StoreSnapshot,
    #[serde(default)]
    pub version: u32,
}

/// Load-on-init, save-on-mutation storage for the store snapshot
pub trait StatePersistence: Send + Sync {
    /// Read the stored snapshot; `Ok(None)` when nothing was stored yet
    fn load(&self) -> Result<Option<StoreSnapshot>, StorageError>;

    /// Overwrite the stored snapshot
    fn save(&self, snapshot: &StoreSnapshot) -> Result<(), StorageError>;

    /// Human-readable location for logs
    fn describe(&self) -> String;

    /// Make sure the backing location can be written before the first save
    fn prepare(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

pub type SharedPersistence = Arc<dyn StatePersistence>;

/// Local key-value storage: one JSON file per key under a base directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
    key: String,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(base_path: P, key: &str) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            key: key.to_string(),
        }
    }

    pub fn entry_path(&self) -> PathBuf {
        self.base_path.join(format!("{}.json", self.key))
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl StatePersistence for FileStorage {
    fn load(&self) -> Result<Option<StoreSnapshot>, StorageError> {
        let path = self.entry_path();
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored snapshot at {}", path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(StorageError::Read {
                    key: self.key.clone(),
                    source,
                })
            }
        };

        let envelope: PersistedEnvelope =
            serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
                key: self.key.clone(),
                details: e.to_string(),
            })?;

        info!(
            "Loaded snapshot {} ({} devices, {} cameras)",
            path.display(),
            envelope.state.devices.len(),
            envelope.state.cameras.len()
        );
        Ok(Some(envelope.state))
    }

    fn prepare(&self) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.base_path).map_err(|source| StorageError::Write {
            key: self.key.clone(),
            source,
        })
    }

    fn save(&self, snapshot: &StoreSnapshot) -> Result<(), StorageError> {
        let write_err = |source: std::io::Error| StorageError::Write {
            key: self.key.clone(),
            source,
        };

        std::fs::create_dir_all(&self.base_path).map_err(write_err)?;

        let envelope = PersistedEnvelope {
            state: snapshot.clone(),
            version: 0,
        };
        let json = serde_json::to_vec_pretty(&envelope).map_err(StorageError::Encode)?;

        // Replace the entry in one rename
        let path = self.entry_path();
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json).map_err(write_err)?;
        std::fs::rename(&tmp_path, &path).map_err(write_err)?;

        debug!("Saved snapshot to {}", path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.entry_path().display().to_string()
    }
}

/// In-process storage for tests and ephemeral runs
#[derive(Debug, Default)]
pub struct MemoryStorage {
    snapshot: Mutex<Option<StoreSnapshot>>,
    saves: Mutex<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            saves: Mutex::new(0),
        }
    }

    /// Last snapshot written
    pub fn stored(&self) -> Option<StoreSnapshot> {
        self.snapshot.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl StatePersistence for MemoryStorage {
    fn load(&self) -> Result<Option<StoreSnapshot>, StorageError> {
        Ok(self.snapshot.lock().clone())
    }

    fn save(&self, snapshot: &StoreSnapshot) -> Result<(), StorageError> {
        *self.snapshot.lock() = Some(snapshot.clone());
        *self.saves.lock() += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
