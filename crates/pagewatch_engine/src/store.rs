use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;
use pagewatch_core::{Fingerprint, FingerprintParseError, MonitorKey};
use pagewatch_logging::{watch_debug, watch_info};
use sha2::{Digest, Sha256};

use crate::persist::{ensure_state_dir, replace_file, PersistError};

pub const DEFAULT_STATE_FILE: &str = "state/last_hash.txt";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read state at {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("state at {path} is not a fingerprint: {source}")]
    Corrupt {
        path: PathBuf,
        source: FingerprintParseError,
    },
    #[error("could not write state: {0}")]
    Write(#[from] PersistError),
    #[error("state at {0} is locked by another run")]
    Busy(PathBuf),
    #[error("could not lock state at {path}: {source}")]
    Lock { path: PathBuf, source: io::Error },
}

/// Durable slot holding the last committed fingerprint per target.
pub trait StateStore: Send + Sync {
    /// `Ok(None)` means no baseline exists; any other failure is an error.
    fn load(&self, key: &MonitorKey) -> Result<Option<Fingerprint>, StoreError>;
    fn save(&self, key: &MonitorKey, fingerprint: &Fingerprint) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateLayout {
    /// One file, whatever the key.
    SingleFile(PathBuf),
    /// One file per key inside a directory.
    PerTarget(PathBuf),
}

/// Plain-text state files: one lowercase hex fingerprint per file.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    layout: StateLayout,
}

impl FileStateStore {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    pub fn single_file(path: impl Into<PathBuf>) -> Self {
        Self::new(StateLayout::SingleFile(path.into()))
    }

    pub fn per_target(dir: impl Into<PathBuf>) -> Self {
        Self::new(StateLayout::PerTarget(dir.into()))
    }

    pub fn path_for(&self, key: &MonitorKey) -> PathBuf {
        match &self.layout {
            StateLayout::SingleFile(path) => path.clone(),
            StateLayout::PerTarget(dir) => dir.join(state_filename(key)),
        }
    }

    /// Take the single-writer lock for `key` without waiting.
    ///
    /// The lock lives in a sibling `.lock` file and is released when the guard drops.
    pub fn try_lock(&self, key: &MonitorKey) -> Result<StateLock, StoreError> {
        let path = self.path_for(key).with_extension("lock");
        if let Some(parent) = parent_dir(&path) {
            ensure_state_dir(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| StoreError::Lock {
                path: path.clone(),
                source,
            })?;
        match file.try_lock_exclusive() {
            Ok(()) => {
                watch_debug!("Acquired state lock {:?}", path);
                Ok(StateLock { file, path })
            }
            Err(err) if err.kind() == fs2::lock_contended_error().kind() => Err(StoreError::Busy(path)),
            Err(source) => Err(StoreError::Lock { path, source }),
        }
    }
}

impl StateStore for FileStateStore {
    fn load(&self, key: &MonitorKey) -> Result<Option<Fingerprint>, StoreError> {
        let path = self.path_for(key);
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        content
            .parse::<Fingerprint>()
            .map(Some)
            .map_err(|source| StoreError::Corrupt { path, source })
    }

    fn save(&self, key: &MonitorKey, fingerprint: &Fingerprint) -> Result<(), StoreError> {
        let path = self.path_for(key);
        replace_file(&path, &fingerprint.to_hex())?;
        watch_info!("Fingerprint {} saved to {:?}", fingerprint, path);
        Ok(())
    }
}

/// Exclusive hold on a state slot for the duration of a run.
#[derive(Debug)]
pub struct StateLock {
    file: File,
    path: PathBuf,
}

impl StateLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Keeps state in memory; for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    slots: Mutex<HashMap<MonitorKey, Fingerprint>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: MonitorKey, fingerprint: Fingerprint) -> Self {
        let store = Self::default();
        store.insert(key, fingerprint);
        store
    }

    pub fn insert(&self, key: MonitorKey, fingerprint: Fingerprint) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.insert(key, fingerprint);
        }
    }

    pub fn get(&self, key: &MonitorKey) -> Option<Fingerprint> {
        self.slots.lock().ok().and_then(|slots| slots.get(key).copied())
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self, key: &MonitorKey) -> Result<Option<Fingerprint>, StoreError> {
        Ok(self.get(key))
    }

    fn save(&self, key: &MonitorKey, fingerprint: &Fingerprint) -> Result<(), StoreError> {
        self.insert(key.clone(), *fingerprint);
        Ok(())
    }
}

/// `last_hash--{first 8 hex of sha256(key)}.txt`
pub fn state_filename(key: &MonitorKey) -> String {
    let digest = Sha256::digest(key.as_str().as_bytes());
    let mut name = String::from("last_hash--");
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut name, "{byte:02x}");
    }
    name.push_str(".txt");
    name
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}
