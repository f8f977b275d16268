use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{error, warn};

/// Durable key-value slot for the whole sheet. Failures are logged and
/// reported as `false`/`None`; they never propagate.
pub trait Persistence {
    fn save(&mut self, state: &Value) -> bool;
    fn load(&self) -> Option<Value>;
    fn clear(&mut self) -> bool;
}

/// In-process storage, mainly for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Option<String>,
    /// How many successful saves have happened.
    pub saves: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot with raw text, which need not be valid JSON.
    pub fn with_raw(text: impl Into<String>) -> Self {
        Self {
            slot: Some(text.into()),
            saves: 0,
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.slot.as_deref()
    }
}

impl Persistence for MemoryStorage {
    fn save(&mut self, state: &Value) -> bool {
        match serde_json::to_string(state) {
            Ok(text) => {
                self.slot = Some(text);
                self.saves += 1;
                true
            }
            Err(err) => {
                error!(%err, "error saving to memory storage");
                false
            }
        }
    }

    fn load(&self) -> Option<Value> {
        let text = self.slot.as_deref()?;
        match serde_json::from_str(text) {
            Ok(v) => Some(v),
            Err(err) => {
                error!(%err, "error loading from memory storage");
                None
            }
        }
    }

    fn clear(&mut self) -> bool {
        self.slot = None;
        true
    }
}

/// One JSON file per storage key, `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", key)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for JsonFileStorage {
    fn save(&mut self, state: &Value) -> bool {
        let text = match serde_json::to_string_pretty(state) {
            Ok(t) => t,
            Err(err) => {
                error!(%err, "error serializing sheet");
                return false;
            }
        };
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                error!(%err, path = %parent.display(), "error creating storage directory");
                return false;
            }
        }
        match fs::write(&self.path, text) {
            Ok(()) => true,
            Err(err) => {
                error!(%err, path = %self.path.display(), "error saving sheet");
                false
            }
        }
    }

    fn load(&self) -> Option<Value> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                error!(%err, path = %self.path.display(), "error reading sheet");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(v) => Some(v),
            Err(err) => {
                warn!(%err, path = %self.path.display(), "stored sheet is not valid JSON");
                None
            }
        }
    }

    fn clear(&mut self) -> bool {
        match fs::remove_file(&self.path) {
            Ok(()) => true,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => true,
            Err(err) => {
                error!(%err, path = %self.path.display(), "error clearing sheet");
                false
            }
        }
    }
}
