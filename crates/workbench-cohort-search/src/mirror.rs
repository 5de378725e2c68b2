//! Session mirror
//!
//! The editor mirrors its in-progress search request under a fixed key so a
//! reload does not lose edits. It is a last-write-wins snapshot store; there
//! is no conflict resolution.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use workbench_cohort_diagnostics::CohortError;

use crate::request::SearchRequest;

/// What gets mirrored: the tree plus where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorSnapshot {
    pub workspace_id: String,
    /// `None` for a cohort that has never been saved
    pub cohort_id: Option<i64>,
    pub search_request: SearchRequest,
}

/// Snapshot storage keyed by a fixed string
pub trait SessionMirror: Send + Sync {
    /// Read the snapshot under `key`, if there is one
    fn load(&self, key: &str) -> Result<Option<MirrorSnapshot>, CohortError>;

    /// Replace the snapshot under `key`
    fn store(&self, key: &str, snapshot: &MirrorSnapshot) -> Result<(), CohortError>;

    /// Drop the snapshot under `key`; clearing a missing key is not an error
    fn clear(&self, key: &str) -> Result<(), CohortError>;
}

/// Mirror held in process memory
#[derive(Debug, Default)]
pub struct MemoryMirror {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionMirror for MemoryMirror {
    fn load(&self, key: &str) -> Result<Option<MirrorSnapshot>, CohortError> {
        let entries = self.entries.lock();
        Ok(entries.get(key).and_then(|raw| decode(key, raw)))
    }

    fn store(&self, key: &str, snapshot: &MirrorSnapshot) -> Result<(), CohortError> {
        let raw = serde_json::to_string(snapshot).map_err(|e| CohortError::from_json(&e))?;
        self.entries.lock().insert(key.to_string(), raw);
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), CohortError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Mirror persisted as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileMirror {
    dir: PathBuf,
}

impl FileMirror {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SessionMirror for FileMirror {
    fn load(&self, key: &str) -> Result<Option<MirrorSnapshot>, CohortError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(decode(key, &raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CohortError::from(e).with_context(path.display().to_string())),
        }
    }

    fn store(&self, key: &str, snapshot: &MirrorSnapshot) -> Result<(), CohortError> {
        fs::create_dir_all(&self.dir)?;
        let raw = serde_json::to_string(snapshot).map_err(|e| CohortError::from_json(&e))?;
        let path = self.path_for(key);
        fs::write(&path, raw)?;
        debug!("mirrored search request to {}", path.display());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), CohortError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// A snapshot that no longer decodes is treated as absent
fn decode(key: &str, raw: &str) -> Option<MirrorSnapshot> {
    match serde_json::from_str(raw) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!("ignoring unreadable mirror snapshot `{}`: {}", key, e);
            None
        }
    }
}
