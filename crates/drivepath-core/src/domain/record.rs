//! Record entity: what we know about one remote object
//!
//! A [`Record`] is built once from remote metadata and never mutated
//! afterwards. When the remote object changes (moved, renamed, trashed) the
//! cache replaces the whole Record, because a changed id or path requires a
//! consistent removal and re-insertion in both index mappings.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::DomainError;
use super::newtypes::{RemoteId, RemotePath};

/// Kind of remote object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Regular file with downloadable content
    File,
    /// Folder that can hold children
    Directory,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::File => write!(f, "file"),
            RecordKind::Directory => write!(f, "directory"),
        }
    }
}

/// Cached metadata snapshot of one remote object
///
/// `path` is derived from the base path the Record was discovered under and
/// its `name`; it is the primary cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    id: RemoteId,
    name: String,
    parent_ids: Vec<RemoteId>,
    kind: RecordKind,
    trashed: bool,
    modified_time: Option<DateTime<Utc>>,
    path: RemotePath,
}

impl Record {
    /// Build a Record for an object named `name` found under `base_path`
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidName`] if `name` cannot be a path component
    pub fn new(
        base_path: &RemotePath,
        id: RemoteId,
        name: impl Into<String>,
        kind: RecordKind,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        let path = base_path.join(&name)?;
        Ok(Self {
            id,
            name,
            parent_ids: Vec::new(),
            kind,
            trashed: false,
            modified_time: None,
            path,
        })
    }

    /// The root folder: id `root`, empty name, no parents, directory
    #[must_use]
    pub fn root() -> Self {
        Self {
            id: RemoteId::root(),
            name: String::new(),
            parent_ids: Vec::new(),
            kind: RecordKind::Directory,
            trashed: false,
            modified_time: None,
            path: RemotePath::root(),
        }
    }

    /// Set the parent ids reported by the remote store
    #[must_use]
    pub fn with_parents(mut self, parent_ids: Vec<RemoteId>) -> Self {
        self.parent_ids = parent_ids;
        self
    }

    /// Set the trashed flag
    #[must_use]
    pub fn with_trashed(mut self, trashed: bool) -> Self {
        self.trashed = trashed;
        self
    }

    /// Set the last modification time
    #[must_use]
    pub fn with_modified_time(mut self, modified_time: Option<DateTime<Utc>>) -> Self {
        self.modified_time = modified_time;
        self
    }

    pub fn id(&self) -> &RemoteId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_ids(&self) -> &[RemoteId] {
        &self.parent_ids
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == RecordKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == RecordKind::File
    }

    pub fn is_trashed(&self) -> bool {
        self.trashed
    }

    pub fn modified_time(&self) -> Option<&DateTime<Utc>> {
        self.modified_time.as_ref()
    }

    pub fn path(&self) -> &RemotePath {
        &self.path
    }

    /// The directory this Record was discovered under
    pub fn base_path(&self) -> RemotePath {
        self.path.dirname()
    }

    /// Returns true if this is the seeded root Record
    pub fn is_root(&self) -> bool {
        self.path.is_root()
    }
}
