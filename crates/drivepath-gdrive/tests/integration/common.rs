//! Shared test helpers for Drive API integration tests
//!
//! Each helper mounts the endpoints a test needs and returns a store
//! pointing at the mock server.

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use drivepath_core::domain::RemoteId;
use drivepath_gdrive::client::DriveClient;
use drivepath_gdrive::provider::GoogleDriveStore;
use drivepath_gdrive::FOLDER_MIME_TYPE;

pub const TEST_TOKEN: &str = "test-access-token";

/// Starts a mock server and returns a (MockServer, GoogleDriveStore) pair.
///
/// No endpoints are mounted.
pub async fn setup_drive_mock() -> (MockServer, GoogleDriveStore) {
    let server = MockServer::start().await;
    let client = DriveClient::with_base_url(TEST_TOKEN, server.uri());
    (server, GoogleDriveStore::new(client))
}

pub fn remote_id(id: &str) -> RemoteId {
    RemoteId::new(id.to_string()).unwrap()
}

/// Drive file resource for a folder
pub fn folder_json(id: &str, name: &str, parent: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "mimeType": FOLDER_MIME_TYPE,
        "parents": [parent],
        "trashed": false,
        "modifiedTime": "2024-03-01T12:00:00.000Z"
    })
}

/// Drive file resource for a plain file
pub fn file_json(id: &str, name: &str, parent: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "mimeType": "text/plain",
        "parents": [parent],
        "trashed": false,
        "modifiedTime": "2024-03-01T12:00:00.000Z"
    })
}

/// Mounts `GET /files/<id>` returning the given resource
pub async fn mount_metadata(server: &MockServer, id: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/files/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Google's JSON error envelope
pub fn error_body(code: u16, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message,
            "errors": [{"message": message, "domain": "global", "reason": "notFound"}]
        }
    })
}
