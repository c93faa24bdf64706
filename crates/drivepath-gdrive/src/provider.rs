//! GoogleDriveStore - IRemoteStore implementation for Google Drive v3
//!
//! Wraps the [`DriveClient`] and maps the remote store port onto Drive
//! endpoints:
//!
//! | port call       | Drive call                                                   |
//! |-----------------|--------------------------------------------------------------|
//! | `list_children` | `GET /files?q='<id>' in parents`                             |
//! | `get`           | `GET /files/<id>`                                            |
//! | `create`        | `POST /files` (folders), `POST upload/files?uploadType=multipart` |
//! | `update`        | `PATCH /files/<id>?addParents=..&removeParents=..`            |
//! | `get_media`     | `GET /files/<id>?alt=media`, streamed                         |
//!
//! ## Design Notes
//!
//! - Uses `tokio::sync::Mutex` because port methods take `&self` while the
//!   access token is replaced through `&mut DriveClient`.
//! - Listings do not filter trashed children; the caller does.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures_util::{StreamExt, TryStreamExt};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use drivepath_core::domain::{RecordKind, RemoteId};
use drivepath_core::ports::{
    ChildPage, CreateRequest, IRemoteStore, MediaStream, RemoteRecord, UpdatePatch,
};

use crate::client::DriveClient;
use crate::{DriveError, FOLDER_MIME_TYPE};

/// Fields requested for every file resource
pub const FILE_FIELDS: &str = "id, name, parents, mimeType, trashed, modifiedTime";

// ============================================================================
// Drive API resource types
// ============================================================================

/// File resource as returned by Drive v3
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    parents: Vec<String>,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    trashed: bool,
    modified_time: Option<String>,
}

/// Response of `files.list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

/// Metadata body of a create call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewFile<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'a str>,
    parents: Vec<&'a str>,
}

/// Body of a patch call
#[derive(Debug, Default, Serialize)]
struct FilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    trashed: Option<bool>,
}

/// Converts a [`DriveFile`] into a port-level [`RemoteRecord`]
fn to_remote_record(file: DriveFile) -> RemoteRecord {
    let modified = file.modified_time.as_deref().and_then(|raw| {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(t) => Some(t.with_timezone(&Utc)),
            Err(e) => {
                warn!(id = %file.id, value = raw, "Ignoring unparsable modifiedTime: {}", e);
                None
            }
        }
    });

    RemoteRecord {
        is_directory: file.mime_type == FOLDER_MIME_TYPE,
        id: file.id,
        name: file.name,
        parents: file.parents,
        trashed: file.trashed,
        modified,
    }
}

/// Builds a `multipart/related` body carrying JSON metadata and raw content
///
/// # Returns
/// The boundary used and the encoded body
fn multipart_related(metadata: &[u8], content: &[u8]) -> (String, Vec<u8>) {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let boundary = format!("drivepath-{nanos:x}-{:x}", content.len());

    let mut body = Vec::with_capacity(metadata.len() + content.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata);
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    (boundary, body)
}

fn join_ids(ids: &[RemoteId]) -> String {
    ids.iter()
        .map(RemoteId::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

async fn parse_file(response: reqwest::Response) -> Result<DriveFile, DriveError> {
    response
        .json::<DriveFile>()
        .await
        .map_err(|e| DriveError::InvalidResponse(e.to_string()))
}

// ============================================================================
// GoogleDriveStore
// ============================================================================

/// Remote store backed by the Google Drive v3 API
pub struct GoogleDriveStore {
    /// The underlying Drive client, protected by a mutex
    client: Mutex<DriveClient>,
}

impl GoogleDriveStore {
    /// Creates a new `GoogleDriveStore` wrapping the given [`DriveClient`]
    pub fn new(client: DriveClient) -> Self {
        Self {
            client: Mutex::new(client),
        }
    }

    /// Replaces the access token used for subsequent calls
    pub async fn set_access_token(&self, token: impl Into<String>) {
        self.client.lock().await.set_access_token(token);
    }
}

#[async_trait::async_trait]
impl IRemoteStore for GoogleDriveStore {
    /// Lists one page of children with `'<id>' in parents`
    async fn list_children(
        &self,
        parent_id: &RemoteId,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ChildPage> {
        let client = self.client.lock().await;
        debug!(parent_id = %parent_id, page_size, "GoogleDriveStore::list_children");

        let query = format!("'{}' in parents", parent_id.as_str());
        let fields = format!("nextPageToken, files({FILE_FIELDS})");
        let page_size = page_size.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("q", query.as_str()),
            ("pageSize", page_size.as_str()),
            ("fields", fields.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = client
            .send(client.request(Method::GET, "/files").query(&params))
            .await
            .with_context(|| format!("Failed to list children of {parent_id}"))?;
        let list: FileList = response
            .json()
            .await
            .map_err(|e| DriveError::InvalidResponse(e.to_string()))
            .context("Failed to parse file list")?;

        debug!(
            count = list.files.len(),
            has_more = list.next_page_token.is_some(),
            "Listed children"
        );
        Ok(ChildPage {
            items: list.files.into_iter().map(to_remote_record).collect(),
            next_page_token: list.next_page_token,
        })
    }

    /// Fetches file metadata with `GET /files/<id>`
    async fn get(&self, id: &RemoteId) -> Result<RemoteRecord> {
        let client = self.client.lock().await;
        debug!(id = %id, "GoogleDriveStore::get");

        let path = format!("/files/{}", id.as_str());
        let response = client
            .send(
                client
                    .request(Method::GET, &path)
                    .query(&[("fields", FILE_FIELDS)]),
            )
            .await
            .with_context(|| format!("Failed to fetch metadata of {id}"))?;

        let file = parse_file(response)
            .await
            .context("Failed to parse file metadata")?;
        Ok(to_remote_record(file))
    }

    /// Creates a folder or uploads a file
    ///
    /// Folders are created with a metadata-only request; files go through a
    /// single multipart upload.
    async fn create(
        &self,
        request: &CreateRequest,
        content: Option<Vec<u8>>,
    ) -> Result<RemoteRecord> {
        let client = self.client.lock().await;
        let metadata = NewFile {
            name: &request.name,
            mime_type: match request.kind {
                RecordKind::Directory => Some(FOLDER_MIME_TYPE),
                RecordKind::File => None,
            },
            parents: request.parent_ids.iter().map(RemoteId::as_str).collect(),
        };

        let builder = match (request.kind, content) {
            (RecordKind::File, Some(bytes)) => {
                debug!(name = %request.name, size = bytes.len(), "GoogleDriveStore::create (upload)");
                let json = serde_json::to_vec(&metadata).context("Failed to encode metadata")?;
                let (boundary, body) = multipart_related(&json, &bytes);
                client
                    .upload_request(Method::POST, "/files")
                    .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
                    .header(
                        reqwest::header::CONTENT_TYPE,
                        format!("multipart/related; boundary={boundary}"),
                    )
                    .body(body)
            }
            (_, _) => {
                debug!(name = %request.name, kind = %request.kind, "GoogleDriveStore::create");
                client
                    .request(Method::POST, "/files")
                    .query(&[("fields", FILE_FIELDS)])
                    .json(&metadata)
            }
        };

        let response = client
            .send(builder)
            .await
            .with_context(|| format!("Failed to create {}", request.name))?;
        let file = parse_file(response)
            .await
            .context("Failed to parse created file")?;
        Ok(to_remote_record(file))
    }

    /// Applies parent changes and the trashed flag with one `PATCH`
    async fn update(&self, id: &RemoteId, patch: &UpdatePatch) -> Result<RemoteRecord> {
        let client = self.client.lock().await;
        debug!(
            id = %id,
            add = patch.add_parents.len(),
            remove = patch.remove_parents.len(),
            trashed = ?patch.trashed,
            "GoogleDriveStore::update"
        );

        let add = join_ids(&patch.add_parents);
        let remove = join_ids(&patch.remove_parents);
        let mut params: Vec<(&str, &str)> = vec![("fields", FILE_FIELDS)];
        if !add.is_empty() {
            params.push(("addParents", add.as_str()));
        }
        if !remove.is_empty() {
            params.push(("removeParents", remove.as_str()));
        }

        let body = FilePatch {
            trashed: patch.trashed,
        };
        let path = format!("/files/{}", id.as_str());
        let response = client
            .send(
                client
                    .request(Method::PATCH, &path)
                    .query(&params)
                    .json(&body),
            )
            .await
            .with_context(|| format!("Failed to update {id}"))?;

        let file = parse_file(response)
            .await
            .context("Failed to parse updated file")?;
        Ok(to_remote_record(file))
    }

    /// Opens `GET /files/<id>?alt=media` as a chunk stream
    async fn get_media(&self, id: &RemoteId) -> Result<MediaStream> {
        let client = self.client.lock().await;
        debug!(id = %id, "GoogleDriveStore::get_media");

        let path = format!("/files/{}", id.as_str());
        let response = client
            .send(client.request(Method::GET, &path).query(&[("alt", "media")]))
            .await
            .with_context(|| format!("Failed to download {id}"))?;

        let stream = response
            .bytes_stream()
            .map_err(|e| anyhow::Error::new(DriveError::Network(e)).context("Media stream failed"))
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()));

        Ok(Box::pin(stream))
    }
}

// ============================================================================
// Tests
// ============================================================================
