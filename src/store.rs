//! Snapshot persistence - schema documents as files in a snapshot directory.
//!
//! Each schema lives as `<name>.schema.json`. The store remembers which
//! names were touched during its lifetime so that leftover files from
//! renamed or deleted snapshots can be pruned.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::StoreError;

/// File suffix for stored schema snapshots.
pub const SNAPSHOT_SUFFIX: &str = ".schema.json";

/// Reads and writes schema documents under a snapshot directory.
#[derive(Debug)]
pub struct SnapshotStore {
    dir: PathBuf,
    used: BTreeSet<String>,
}

impl SnapshotStore {
    /// Open a store, creating the snapshot directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CreateDir`] when the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            used: BTreeSet::new(),
        })
    }

    /// The snapshot directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for a named snapshot.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}{SNAPSHOT_SUFFIX}"))
    }

    /// True when a snapshot with this name exists on disk.
    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).exists()
    }

    /// Load a named snapshot, marking the name as used.
    ///
    /// Returns `Ok(None)` when no snapshot exists yet.
    pub fn load(&mut self, name: &str) -> Result<Option<Value>, StoreError> {
        self.mark_used(name);
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        let value = serde_json::from_str(&text)
            .map_err(|source| StoreError::InvalidJson { path, source })?;
        Ok(Some(value))
    }

    /// Write a named snapshot, marking the name as used.
    pub fn save(&mut self, name: &str, schema: &Value) -> Result<(), StoreError> {
        self.mark_used(name);
        let path = self.path_for(name);
        let existed = path.exists();
        let mut text = serde_json::to_string_pretty(schema).unwrap_or_default();
        text.push('\n');
        fs::write(&path, text).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;
        if existed {
            info!(name, "schema snapshot updated");
        } else {
            info!(name, "schema snapshot created");
        }
        Ok(())
    }

    /// Record a name as touched without reading or writing it.
    pub fn mark_used(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    /// Snapshot files on disk that no call has touched, sorted by path.
    pub fn unused(&self) -> Result<Vec<PathBuf>, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| StoreError::Read {
            path: self.dir.clone(),
            source,
        })?;

        let mut stale = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Read {
                path: self.dir.clone(),
                source,
            })?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if let Some(name) = file_name.strip_suffix(SNAPSHOT_SUFFIX) {
                if !self.used.contains(name) {
                    stale.push(entry.path());
                }
            }
        }
        stale.sort();
        Ok(stale)
    }

    /// Delete all unused snapshot files, returning the removed paths.
    pub fn prune_unused(&mut self) -> Result<Vec<PathBuf>, StoreError> {
        let stale = self.unused()?;
        for path in &stale {
            fs::remove_file(path).map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "removed unused snapshot");
        }
        Ok(stale)
    }
}
