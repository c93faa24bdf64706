//! Path index: bidirectional id ↔ path mapping over cached Records.
//!
//! Single source of truth for what the local process currently believes
//! exists remotely, and where. Never talks to the remote store.
//!
//! Both mappings always reference the same set of live (non-trashed) Records.
//! The root is seeded at construction and cannot be removed.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use super::errors::FsError;
use super::newtypes::{RemoteId, RemotePath};
use super::record::Record;

/// Dual id/path keyed cache of Records
///
/// Owned by a single filesystem session; there is no internal locking.
#[derive(Debug)]
pub struct PathIndex {
    /// id -> record
    by_id: HashMap<RemoteId, Arc<Record>>,
    /// path -> record
    by_path: HashMap<RemotePath, Arc<Record>>,
}

impl PathIndex {
    /// Create an index holding only the root Record.
    pub fn new() -> Self {
        let mut index = Self {
            by_id: HashMap::new(),
            by_path: HashMap::new(),
        };
        index.insert(Record::root());
        index
    }

    /// Insert a Record into both mappings.
    ///
    /// Trashed Records are never indexed; `None` is returned for them.
    /// Neither is a Record carrying the root id at any path but `/`.
    ///
    /// Last write wins: a Record already at the same path under another id
    /// (a same-named sibling) is evicted from both mappings, and a Record
    /// already known under the same id at another path is evicted as well.
    pub fn insert(&mut self, record: Record) -> Option<Arc<Record>> {
        if record.is_trashed() {
            return None;
        }
        if *record.id() == RemoteId::root() && !record.is_root() {
            warn!(path = %record.path(), "Refusing non-root record carrying the root id");
            return None;
        }

        let record = Arc::new(record);

        if let Some(previous) = self.by_id.get(record.id()) {
            if previous.path() != record.path() {
                self.by_path.remove(previous.path());
            }
        }

        if let Some(occupant) = self.by_path.get(record.path()) {
            if occupant.id() != record.id() {
                self.by_id.remove(occupant.id());
            }
        }

        self.by_id.insert(record.id().clone(), Arc::clone(&record));
        self.by_path
            .insert(record.path().clone(), Arc::clone(&record));
        Some(record)
    }

    /// Remove a previously indexed Record from both mappings.
    ///
    /// # Errors
    /// - [`FsError::NotFound`] if this Record (same id at the same path) is not indexed
    /// - [`FsError::PreconditionFailed`] for the root
    pub fn remove(&mut self, record: &Record) -> Result<Arc<Record>, FsError> {
        if record.is_root() {
            return Err(FsError::PreconditionFailed(
                "the root cannot be removed from the index".to_string(),
            ));
        }

        match self.by_id.get(record.id()) {
            Some(indexed) if indexed.path() == record.path() => {}
            _ => return Err(FsError::NotFound(record.path().to_string())),
        }

        self.by_path.remove(record.path());
        self.by_id
            .remove(record.id())
            .ok_or_else(|| FsError::NotFound(record.path().to_string()))
    }

    /// Check whether anything is indexed at `path`.
    pub fn contains(&self, path: &RemotePath) -> bool {
        self.by_path.contains_key(path)
    }

    /// Look up the Record at `path`.
    ///
    /// # Errors
    /// [`FsError::NotFound`] if nothing is indexed there
    pub fn get_by_path(&self, path: &RemotePath) -> Result<Arc<Record>, FsError> {
        self.by_path
            .get(path)
            .map(Arc::clone)
            .ok_or_else(|| FsError::NotFound(path.to_string()))
    }

    /// Look up a Record by its remote id.
    pub fn get_by_id(&self, id: &RemoteId) -> Option<Arc<Record>> {
        self.by_id.get(id).map(Arc::clone)
    }

    /// Number of indexed Records, root included.
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// Always false: the root is never removed.
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// All indexed paths, sorted.
    pub fn paths(&self) -> Vec<RemotePath> {
        let mut paths: Vec<RemotePath> = self.by_path.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Iterate over all indexed Records in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Record>> {
        self.by_path.values()
    }
}

impl Default for PathIndex {
    fn default() -> Self {
        Self::new()
    }
}
