//! Lazy path resolution
//!
//! The remote store only lists the direct children of a folder id, so a path
//! is resolved by walking up to the nearest indexed ancestor and listing each
//! directory on the way back down. The root is always indexed, which ends the
//! recursion.
//!
//! Every listing is both a query and a cache refresh for that directory.
//! Children that disappeared remotely are not purged.

use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use tracing::{debug, trace, warn};

use super::drive_filesystem::DriveFilesystem;
use crate::domain::{DomainError, FsError, Record, RemoteId, RemotePath};
use crate::ports::RemoteRecord;

/// Map a store DTO to a Record discovered under `base`.
pub(super) fn record_from_remote(
    base: &RemotePath,
    remote: RemoteRecord,
) -> Result<Record, DomainError> {
    let kind = remote.kind();
    let id = RemoteId::new(remote.id)?;
    let parents = remote
        .parents
        .into_iter()
        .map(RemoteId::new)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Record::new(base, id, remote.name, kind)?
        .with_parents(parents)
        .with_trashed(remote.trashed)
        .with_modified_time(remote.modified))
}

impl DriveFilesystem {
    /// List the children of the directory at `path`, resolving it first.
    ///
    /// If `path` is not indexed, its parent is resolved recursively. A path
    /// that is still unknown afterwards does not exist remotely and yields an
    /// empty list. Files have no children and are never sent to the store.
    ///
    /// # Errors
    /// [`FsError::Remote`] if a listing call fails
    pub fn list_children<'a>(
        &'a mut self,
        path: &'a RemotePath,
    ) -> BoxFuture<'a, Result<Vec<Arc<Record>>, FsError>> {
        async move {
            debug_assert!(
                self.index.contains(&RemotePath::root()),
                "root must always be indexed"
            );

            if !self.index.contains(path) {
                if path.is_root() {
                    // Unreachable while the root invariant holds
                    return Ok(Vec::new());
                }

                let parent = path.dirname();
                trace!(path = %path, parent = %parent, "Resolving parent directory");
                self.list_children(&parent).await?;

                if !self.index.contains(path) {
                    debug!(path = %path, "Path does not exist remotely");
                    return Ok(Vec::new());
                }
            }

            let dir = self.index.get_by_path(path)?;
            if !dir.is_dir() {
                trace!(path = %path, "Not a directory, nothing to list");
                return Ok(Vec::new());
            }

            let items = self.fetch_children(dir.id(), path).await?;

            let mut children = Vec::with_capacity(items.len());
            for item in items {
                if let Some(child) = self.index_listed(path, item) {
                    children.push(child);
                }
            }

            debug!(path = %path, count = children.len(), "Listed directory");
            Ok(children)
        }
        .boxed()
    }

    /// Check whether `path` exists, listing its parent once if it is not cached.
    ///
    /// # Errors
    /// [`FsError::Remote`] if the listing call fails
    pub async fn locate(&mut self, path: &RemotePath) -> Result<bool, FsError> {
        if self.index.contains(path) {
            return Ok(true);
        }

        self.list_children(&path.dirname()).await?;
        Ok(self.index.contains(path))
    }

    /// Fetch the raw children of a folder, one page unless configured otherwise.
    async fn fetch_children(
        &self,
        parent_id: &RemoteId,
        path: &RemotePath,
    ) -> Result<Vec<RemoteRecord>, FsError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            debug!(parent_id = %parent_id, path = %path, "Listing children");
            let page = self
                .store
                .list_children(parent_id, self.options.page_size, page_token.as_deref())
                .await
                .map_err(|e| FsError::Remote(e.context(format!("Failed to list {path}"))))?;

            items.extend(page.items);

            match page.next_page_token {
                Some(next) if self.options.follow_next_page => page_token = Some(next),
                Some(_) => {
                    warn!(
                        path = %path,
                        page_size = self.options.page_size,
                        "Listing truncated to the first page"
                    );
                    break;
                }
                None => break,
            }
        }

        Ok(items)
    }

    /// Insert one listed child under `base`; skips trashed and malformed entries.
    fn index_listed(&mut self, base: &RemotePath, item: RemoteRecord) -> Option<Arc<Record>> {
        let id = item.id.clone();
        match record_from_remote(base, item) {
            Ok(record) => self.index.insert(record),
            Err(e) => {
                warn!(id = %id, base = %base, "Skipping child with invalid metadata: {}", e);
                None
            }
        }
    }
}
