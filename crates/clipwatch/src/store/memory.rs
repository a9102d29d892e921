//! # Memory Store
//!
//! Non-durable store, used when nothing should touch the disk.

use std::collections::HashSet;

use super::DedupStore;
use crate::error::StoreError;

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    ids: Vec<String>,
    index: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids in the order they were recorded.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

impl<S: Into<String>> FromIterator<S> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut store = Self::new();
        for id in iter {
            let id = id.into();
            if store.index.insert(id.clone()) {
                store.ids.push(id);
            }
        }
        store
    }
}

impl DedupStore for MemoryStore {
    fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    fn add(&mut self, id: &str) -> Result<(), StoreError> {
        if self.index.insert(id.to_string()) {
            self.ids.push(id.to_string());
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}
