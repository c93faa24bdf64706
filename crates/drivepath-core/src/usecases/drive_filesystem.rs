//! Path-based filesystem over the id-addressed remote store
//!
//! [`DriveFilesystem`] owns the [`PathIndex`] and the remote store handle.
//! Every operation first resolves the paths it needs, checks its
//! preconditions, performs the remote call and only then updates the index
//! to mirror the new remote state. Precondition failures never reach the
//! store and leave the index untouched.
//!
//! Operations take `&mut self` and run strictly one at a time. Callers that
//! need sharing wrap the whole filesystem in a single mutex.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

use super::resolver::record_from_remote;
use crate::config::Config;
use crate::domain::{FsError, PathIndex, Record, RecordKind, RemoteId, RemotePath};
use crate::ports::{CreateRequest, IRemoteStore, RemoteRecord, UpdatePatch};

/// Tunables for listing and transfers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesystemOptions {
    /// Maximum children requested per listing call
    pub page_size: u32,
    /// Follow continuation tokens instead of stopping after one page
    pub follow_next_page: bool,
    /// Local write buffer size for downloads, in bytes
    pub download_chunk_bytes: usize,
}

impl Default for FilesystemOptions {
    fn default() -> Self {
        Self {
            page_size: 500,
            follow_next_page: false,
            download_chunk_bytes: 1024 * 1024,
        }
    }
}

impl From<&Config> for FilesystemOptions {
    fn from(config: &Config) -> Self {
        Self {
            page_size: config.remote.page_size,
            follow_next_page: config.remote.follow_next_page,
            download_chunk_bytes: config.download_chunk_bytes().max(1),
        }
    }
}

/// Path-indexed view of the remote store
pub struct DriveFilesystem {
    pub(super) store: Arc<dyn IRemoteStore + Send + Sync>,
    pub(super) index: PathIndex,
    pub(super) options: FilesystemOptions,
}

fn remote_error(context: String) -> impl FnOnce(anyhow::Error) -> FsError {
    move |e| FsError::Remote(e.context(context))
}

fn precondition(message: String) -> FsError {
    warn!("{}", message);
    FsError::PreconditionFailed(message)
}

impl DriveFilesystem {
    /// Creates a filesystem with a fresh cache holding only the root
    ///
    /// # Arguments
    ///
    /// * `store` - Remote store used for every listing and mutation
    pub fn new(store: Arc<dyn IRemoteStore + Send + Sync>) -> Self {
        Self {
            store,
            index: PathIndex::new(),
            options: FilesystemOptions::default(),
        }
    }

    /// Replace the listing and transfer options
    #[must_use]
    pub fn with_options(mut self, options: FilesystemOptions) -> Self {
        self.options = options;
        self
    }

    /// Read access to the cache
    pub fn index(&self) -> &PathIndex {
        &self.index
    }

    pub fn options(&self) -> &FilesystemOptions {
        &self.options
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Lists one level below `path`, freshly reconciled with the store
    ///
    /// Always re-lists, even when the directory is already cached, so two
    /// consecutive calls with no remote changes return the same set.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::Remote`] if a listing call fails
    pub async fn ls(&mut self, path: &RemotePath) -> Result<Vec<Arc<Record>>, FsError> {
        self.list_children(path).await
    }

    /// Populates the cache with the whole tree, breadth-first from the root
    ///
    /// Issues one listing call per directory.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::Remote`] on the first failed listing; directories
    /// listed so far stay cached
    pub async fn ls_all(&mut self) -> Result<(), FsError> {
        let mut queue = VecDeque::from([RemotePath::root()]);
        let mut listed = 0usize;

        while let Some(dir) = queue.pop_front() {
            for child in self.ls(&dir).await? {
                if child.is_dir() {
                    queue.push_back(child.path().clone());
                }
            }
            listed += 1;
        }

        info!(directories = listed, records = self.index.len(), "Indexed remote tree");
        Ok(())
    }

    // ========================================================================
    // Transfers
    // ========================================================================

    /// Streams the file at `remote_path` into `local_target`
    ///
    /// The source must already be indexed; no resolution happens. Existing
    /// local content is overwritten. The cache is not touched.
    ///
    /// # Returns
    ///
    /// Number of bytes written
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `remote_path` is not indexed
    /// - [`FsError::PreconditionFailed`] if it is a directory
    /// - [`FsError::PartialTransfer`] if the stream fails part-way; the
    ///   partial file is left in place
    pub async fn download(
        &self,
        remote_path: &RemotePath,
        local_target: &Path,
    ) -> Result<u64, FsError> {
        let record = self.index.get_by_path(remote_path).map_err(|e| {
            warn!(path = %remote_path, "Download source is not indexed");
            e
        })?;
        if !record.is_file() {
            return Err(precondition(format!(
                "cannot download a directory: {remote_path}"
            )));
        }

        debug!(id = %record.id(), path = %remote_path, "Opening media stream");
        let mut stream = self
            .store
            .get_media(record.id())
            .await
            .map_err(remote_error(format!("Failed to download {remote_path}")))?;

        let local_io = |source: std::io::Error| FsError::LocalIo {
            path: local_target.to_path_buf(),
            source,
        };

        let file = tokio::fs::File::create(local_target)
            .await
            .map_err(local_io)?;
        let mut writer = BufWriter::with_capacity(self.options.download_chunk_bytes, file);
        let mut bytes_written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(source) => {
                    if let Err(e) = writer.flush().await {
                        warn!(path = %local_target.display(), "Failed to flush partial download: {}", e);
                    }
                    warn!(
                        path = %remote_path,
                        bytes_written,
                        "Download interrupted"
                    );
                    return Err(FsError::PartialTransfer {
                        path: local_target.to_path_buf(),
                        bytes_written,
                        source,
                    });
                }
            };

            writer.write_all(&chunk).await.map_err(local_io)?;
            bytes_written += chunk.len() as u64;
        }

        writer.flush().await.map_err(local_io)?;

        info!(
            path = %remote_path,
            target = %local_target.display(),
            bytes = bytes_written,
            "Downloaded file"
        );
        Ok(bytes_written)
    }

    /// Uploads `local_source` as a new file at `remote_path`
    ///
    /// # Returns
    ///
    /// The indexed Record of the new file
    ///
    /// # Errors
    ///
    /// - [`FsError::PreconditionFailed`] if something already exists at
    ///   `remote_path` or its parent directory does not exist
    /// - [`FsError::LocalIo`] if the local file cannot be read
    pub async fn upload(
        &mut self,
        local_source: &Path,
        remote_path: &RemotePath,
    ) -> Result<Arc<Record>, FsError> {
        let (parent_path, name) = split_target(remote_path)?;

        if self.locate(remote_path).await? {
            return Err(precondition(format!("already exists: {remote_path}")));
        }
        if !self.locate(&parent_path).await? {
            return Err(precondition(format!(
                "parent directory does not exist: {parent_path}"
            )));
        }
        let parent = self.directory_at(&parent_path)?;

        let content = tokio::fs::read(local_source)
            .await
            .map_err(|source| FsError::LocalIo {
                path: local_source.to_path_buf(),
                source,
            })?;
        let size = content.len();

        let request = CreateRequest {
            name,
            kind: RecordKind::File,
            parent_ids: vec![parent.id().clone()],
        };
        debug!(path = %remote_path, size, "Creating file");
        let created = self
            .store
            .create(&request, Some(content))
            .await
            .map_err(remote_error(format!("Failed to upload {remote_path}")))?;

        let record = self.index_returned(&parent_path, created)?;
        info!(path = %record.path(), id = %record.id(), size, "Uploaded file");
        Ok(record)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Creates a directory at `remote_path`
    ///
    /// The parent is listed first so an existing entry is detected.
    ///
    /// # Errors
    ///
    /// Returns [`FsError::PreconditionFailed`] if something already exists
    /// at the path or the parent is missing or not a directory
    pub async fn mkdir(&mut self, remote_path: &RemotePath) -> Result<Arc<Record>, FsError> {
        let (parent_path, name) = split_target(remote_path)?;

        self.ls(&parent_path).await?;

        if self.index.contains(remote_path) {
            return Err(precondition(format!("already exists: {remote_path}")));
        }
        if !self.index.contains(&parent_path) {
            return Err(precondition(format!(
                "parent directory does not exist: {parent_path}"
            )));
        }
        let parent = self.directory_at(&parent_path)?;

        let request = CreateRequest {
            name,
            kind: RecordKind::Directory,
            parent_ids: vec![parent.id().clone()],
        };
        debug!(path = %remote_path, "Creating directory");
        let created = self
            .store
            .create(&request, None)
            .await
            .map_err(remote_error(format!("Failed to create {remote_path}")))?;

        let record = self.index_returned(&parent_path, created)?;
        info!(path = %record.path(), id = %record.id(), "Created directory");
        Ok(record)
    }

    /// Moves the object at `path` into the directory `to_folder`
    ///
    /// Both paths must already be indexed. Every current parent is replaced
    /// by `to_folder`; moving into the folder that already holds the object
    /// still issues the update. Cached descendants of a moved directory keep their old
    /// paths until the new location is listed.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if either path is not indexed
    /// - [`FsError::PreconditionFailed`] if `to_folder` is not a directory,
    ///   the destination is occupied, or a directory would move into itself
    pub async fn mv(
        &mut self,
        path: &RemotePath,
        to_folder: &RemotePath,
    ) -> Result<Arc<Record>, FsError> {
        if path.is_root() {
            return Err(precondition("cannot move the root".to_string()));
        }

        let source = self.index.get_by_path(path)?;
        let folder = self.index.get_by_path(to_folder)?;
        if !folder.is_dir() {
            return Err(precondition(format!("not a directory: {to_folder}")));
        }
        if to_folder == path || path.is_ancestor_of(to_folder) {
            return Err(precondition(format!(
                "cannot move {path} into its own subtree {to_folder}"
            )));
        }

        let destination = to_folder.join(source.name())?;
        if destination != *path && self.index.contains(&destination) {
            return Err(precondition(format!("already exists: {destination}")));
        }

        debug!(id = %source.id(), "Fetching current parents");
        let current = self
            .store
            .get(source.id())
            .await
            .map_err(remote_error(format!("Failed to fetch metadata of {path}")))?;
        let previous = current
            .parents
            .into_iter()
            .map(RemoteId::new)
            .collect::<Result<Vec<_>, _>>()?;

        let patch = UpdatePatch::reparent(folder.id().clone(), previous);
        debug!(id = %source.id(), to = %to_folder, "Updating parents");
        let updated = self
            .store
            .update(source.id(), &patch)
            .await
            .map_err(remote_error(format!("Failed to move {path} to {to_folder}")))?;

        let moved = record_from_remote(to_folder, updated)?;
        self.index.remove(&source)?;
        let moved_path = moved.path().clone();
        let record = self
            .index
            .insert(moved)
            .ok_or_else(|| FsError::NotFound(moved_path.to_string()))?;

        info!(from = %path, to = %record.path(), "Moved");
        Ok(record)
    }

    /// Moves the object at `remote_path` to the trash
    ///
    /// # Returns
    ///
    /// The Record that was removed from the cache
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if nothing exists at the path
    /// - [`FsError::PreconditionFailed`] for the root
    pub async fn rm(&mut self, remote_path: &RemotePath) -> Result<Arc<Record>, FsError> {
        if remote_path.is_root() {
            return Err(precondition("cannot remove the root".to_string()));
        }
        if !self.locate(remote_path).await? {
            warn!(path = %remote_path, "Nothing to remove");
            return Err(FsError::NotFound(remote_path.to_string()));
        }

        let record = self.index.get_by_path(remote_path)?;
        debug!(id = %record.id(), path = %remote_path, "Trashing");
        self.store
            .update(record.id(), &UpdatePatch::trash())
            .await
            .map_err(remote_error(format!("Failed to remove {remote_path}")))?;

        let removed = self.index.remove(&record)?;
        info!(path = %remote_path, "Moved to trash");
        Ok(removed)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Indexed directory at `path`, or a precondition failure.
    fn directory_at(&self, path: &RemotePath) -> Result<Arc<Record>, FsError> {
        let record = self
            .index
            .get_by_path(path)
            .map_err(|_| precondition(format!("parent directory does not exist: {path}")))?;
        if !record.is_dir() {
            return Err(precondition(format!("not a directory: {path}")));
        }
        Ok(record)
    }

    /// Index a Record the store just returned for a create call.
    fn index_returned(
        &mut self,
        base: &RemotePath,
        remote: RemoteRecord,
    ) -> Result<Arc<Record>, FsError> {
        let record = record_from_remote(base, remote)?;
        let path = record.path().clone();
        self.index
            .insert(record)
            .ok_or_else(|| FsError::NotFound(path.to_string()))
    }
}

/// Split a creation target into its parent path and leaf name.
fn split_target(path: &RemotePath) -> Result<(RemotePath, String), FsError> {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => Ok((parent, name.to_string())),
        _ => Err(precondition(format!("cannot create {path}"))),
    }
}
