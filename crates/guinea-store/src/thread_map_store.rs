//! Thread id -> origin message id mapping, persisted as a JSON object.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::write_text_atomic;

/// In-memory form of the mapping file.
pub type ThreadMap = BTreeMap<u64, u64>;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredMessageId {
    Number(u64),
    Text(String),
}

impl StoredMessageId {
    fn into_u64(self) -> Result<u64> {
        match self {
            Self::Number(value) => Ok(value),
            Self::Text(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|error| anyhow!("invalid message id '{raw}': {error}")),
        }
    }
}

/// Reads the mapping file.
///
/// Returns `Ok(None)` when the file does not exist and an error when it exists
/// but cannot be read or decoded.
pub fn read_thread_map(path: &Path) -> Result<Option<ThreadMap>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read thread map {}", path.display()))?;
    let decoded = serde_json::from_str::<BTreeMap<String, StoredMessageId>>(&raw)
        .with_context(|| format!("failed to parse thread map {}", path.display()))?;

    let mut map = ThreadMap::new();
    for (key, value) in decoded {
        let thread_id = key
            .trim()
            .parse::<u64>()
            .map_err(|error| anyhow!("invalid thread id key '{key}': {error}"))?;
        map.insert(thread_id, value.into_u64()?);
    }
    Ok(Some(map))
}

/// Writes the full mapping, replacing whatever was on disk.
pub fn write_thread_map(path: &Path, map: &ThreadMap) -> Result<()> {
    let keyed = map
        .iter()
        .map(|(thread_id, message_id)| (thread_id.to_string(), *message_id))
        .collect::<BTreeMap<_, _>>();
    let mut payload =
        serde_json::to_string_pretty(&keyed).context("failed to serialize thread map")?;
    payload.push('\n');
    write_text_atomic(path, &payload)
        .with_context(|| format!("failed to write thread map {}", path.display()))
}

/// Process-wide mapping store shared by the provisioner and the participant query.
///
/// A single mutex covers the read-modify-write of every insertion so that the
/// full-file rewrite never races another writer.
#[derive(Debug)]
pub struct ThreadMapStore {
    path: PathBuf,
    entries: Mutex<ThreadMap>,
}

impl ThreadMapStore {
    /// Loads the store, falling back to an empty mapping when the file is
    /// missing or unreadable.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_thread_map(&path) {
            Ok(Some(map)) => {
                info!(path = %path.display(), entries = map.len(), "loaded thread map");
                map
            }
            Ok(None) => {
                info!(path = %path.display(), "thread map not found; starting empty");
                ThreadMap::new()
            }
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %format!("{error:#}"),
                    "thread map is unreadable; starting empty"
                );
                ThreadMap::new()
            }
        };
        Self::with_entries(path, entries)
    }

    /// Builds a store around an existing mapping without touching disk.
    pub fn with_entries(path: impl Into<PathBuf>, entries: ThreadMap) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin_for(&self, thread_id: u64) -> Option<u64> {
        self.lock().get(&thread_id).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn snapshot(&self) -> ThreadMap {
        self.lock().clone()
    }

    /// Inserts an entry and persists the whole mapping.
    ///
    /// The in-memory entry is kept even when persistence fails; the write is
    /// attempted twice before the error is returned.
    pub fn record(&self, thread_id: u64, origin_message_id: u64) -> Result<()> {
        let mut entries = self.lock();
        entries.insert(thread_id, origin_message_id);
        self.persist(&entries)
    }

    /// Rewrites the mapping file from the current in-memory state.
    pub fn save(&self) -> Result<()> {
        let entries = self.lock();
        self.persist(&entries)
    }

    fn persist(&self, entries: &ThreadMap) -> Result<()> {
        let first_error = match write_thread_map(&self.path, entries) {
            Ok(()) => return Ok(()),
            Err(error) => error,
        };
        warn!(
            path = %self.path.display(),
            error = %format!("{first_error:#}"),
            "thread map write failed; retrying once"
        );
        write_thread_map(&self.path, entries).map_err(|retry_error| {
            error!(
                path = %self.path.display(),
                error = %format!("{retry_error:#}"),
                "thread map write failed after retry; mapping kept in memory only"
            );
            retry_error.context(format!("first attempt: {first_error:#}"))
        })
    }

    fn lock(&self) -> MutexGuard<'_, ThreadMap> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
