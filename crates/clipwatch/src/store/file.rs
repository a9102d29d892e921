//! # JSON File Store
//!
//! Keeps posted clip ids in a JSON array on disk, rewritten on every insert.

use std::collections::HashSet;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::DedupStore;
use crate::error::StoreError;

/// Default location of the state file, relative to the working directory.
pub const DEFAULT_STATE_FILE: &str = "posted_clips.json";

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // insertion order, as written to disk
    ids: Vec<String>,
    index: HashSet<String>,
}

impl JsonFileStore {
    /// Load the store from `path`.
    ///
    /// A missing or unreadable file yields an empty store; this never fails.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let loaded = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Vec<String>>(&bytes) {
                Ok(ids) => {
                    info!(count = ids.len(), "Loaded previously posted clips");
                    ids
                }
                Err(e) => {
                    warn!(
                        path = ?path,
                        error = %e,
                        "Could not parse posted clips file, starting fresh"
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = ?path, "No posted clips file found, starting fresh");
                Vec::new()
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "Could not read posted clips file, starting fresh");
                Vec::new()
            }
        };

        let mut store = Self {
            path,
            ids: Vec::with_capacity(loaded.len()),
            index: HashSet::with_capacity(loaded.len()),
        };
        for id in loaded {
            if store.index.insert(id.clone()) {
                store.ids.push(id);
            }
        }
        store
    }

    /// Ids in the order they were recorded.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Write the whole set next to the target and rename it into place, so an
    /// interrupted write leaves the previous file intact.
    fn persist(&self) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut file, &self.ids)?;
        file.flush()?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;

        debug!(path = ?self.path, count = self.ids.len(), "Saved posted clips");
        Ok(())
    }
}

impl DedupStore for JsonFileStore {
    fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    fn add(&mut self, id: &str) -> Result<(), StoreError> {
        if !self.index.insert(id.to_string()) {
            return Ok(());
        }
        self.ids.push(id.to_string());

        if let Err(e) = self.persist() {
            // keep memory in line with disk so a retry attempts the write again
            self.index.remove(id);
            self.ids.pop();
            return Err(e);
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}
