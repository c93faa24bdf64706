//! Remote store port (driven/secondary port)
//!
//! This module defines the interface to a hierarchical object store that is
//! addressed only by opaque ids and parent-id relationships. The primary
//! implementation targets Google Drive v3, but nothing here depends on it.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are adapter-specific;
//!   the use case layer wraps them as `FsError::Remote`.
//! - Uses `#[async_trait]` for async trait methods.
//! - [`RemoteRecord`] is a port-level DTO, not a domain entity; the filesystem
//!   use case maps it to a `Record` once it knows the base path.

use std::pin::Pin;

use chrono::{DateTime, Utc};
use futures_util::Stream;
use serde::{Deserialize, Serialize};

use crate::domain::newtypes::RemoteId;
use crate::domain::record::RecordKind;

// ============================================================================
// DTOs
// ============================================================================

/// Metadata of one remote object as reported by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    /// Provider-specific object identifier
    pub id: String,
    /// Leaf name
    pub name: String,
    /// Ids of the folders holding this object (empty for the root)
    pub parents: Vec<String>,
    /// Whether this object is a folder
    pub is_directory: bool,
    /// Whether this object sits in the trash
    pub trashed: bool,
    /// Last modification time, when the store reports a parsable one
    pub modified: Option<DateTime<Utc>>,
}

impl RemoteRecord {
    /// Kind of the object in domain terms
    pub fn kind(&self) -> RecordKind {
        if self.is_directory {
            RecordKind::Directory
        } else {
            RecordKind::File
        }
    }
}

/// One page of a children listing
#[derive(Debug, Clone, Default)]
pub struct ChildPage {
    /// Direct children of the listed folder, trashed ones included
    pub items: Vec<RemoteRecord>,
    /// Continuation token; `None` on the last page
    pub next_page_token: Option<String>,
}

/// Metadata for a new remote object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    /// Leaf name of the new object
    pub name: String,
    /// File or folder
    pub kind: RecordKind,
    /// Folders the object is created in
    pub parent_ids: Vec<RemoteId>,
}

/// Partial update applied to an existing object
///
/// Fields left empty or `None` are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePatch {
    /// Folders to add the object to
    pub add_parents: Vec<RemoteId>,
    /// Folders to remove the object from
    pub remove_parents: Vec<RemoteId>,
    /// New trashed flag
    pub trashed: Option<bool>,
}

impl UpdatePatch {
    /// Patch that moves an object into the trash
    pub fn trash() -> Self {
        Self {
            trashed: Some(true),
            ..Self::default()
        }
    }

    /// Patch that reparents an object from `previous` to `destination`
    ///
    /// `destination` is never removed, even when it is already a parent.
    pub fn reparent(destination: RemoteId, previous: Vec<RemoteId>) -> Self {
        let remove_parents = previous
            .into_iter()
            .filter(|p| *p != destination)
            .collect();
        Self {
            add_parents: vec![destination],
            remove_parents,
            trashed: None,
        }
    }
}

/// Chunked content of a remote file
///
/// Each item is the next chunk in order; an `Err` ends the transfer.
pub type MediaStream = Pin<Box<dyn Stream<Item = anyhow::Result<Vec<u8>>> + Send>>;

// ============================================================================
// IRemoteStore trait
// ============================================================================

/// Port trait for the id-addressed remote object store
///
/// ## Implementation Notes
///
/// - Implementations must not retry; failures propagate to the caller.
/// - All methods assume valid credentials are available; token refresh is
///   handled by the implementation before it is handed to the use case.
/// - Listings return trashed children too; filtering is the caller's job.
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Lists one page of the direct children of a folder
    ///
    /// # Arguments
    /// * `parent_id` - Folder whose children are listed
    /// * `page_size` - Upper bound on the number of items returned
    /// * `page_token` - Continuation token from a previous page (None for the first)
    async fn list_children(
        &self,
        parent_id: &RemoteId,
        page_size: u32,
        page_token: Option<&str>,
    ) -> anyhow::Result<ChildPage>;

    /// Fetches the current metadata of one object
    async fn get(&self, id: &RemoteId) -> anyhow::Result<RemoteRecord>;

    /// Creates a new object, with content for files
    ///
    /// # Arguments
    /// * `request` - Name, kind and parents of the new object
    /// * `content` - File bytes; `None` for folders
    ///
    /// # Returns
    /// Metadata of the created object
    async fn create(
        &self,
        request: &CreateRequest,
        content: Option<Vec<u8>>,
    ) -> anyhow::Result<RemoteRecord>;

    /// Applies a partial update to an object
    ///
    /// # Returns
    /// Metadata of the object after the update
    async fn update(&self, id: &RemoteId, patch: &UpdatePatch) -> anyhow::Result<RemoteRecord>;

    /// Opens the content of a file as a chunk stream
    async fn get_media(&self, id: &RemoteId) -> anyhow::Result<MediaStream>;
}
