//! Create, move and trash tests

use wiremock::matchers::{
    body_json, body_string_contains, header_regex, method, path, query_param,
    query_param_is_missing,
};
use wiremock::{Mock, ResponseTemplate};

use drivepath_core::domain::RecordKind;
use drivepath_core::ports::{CreateRequest, IRemoteStore, UpdatePatch};
use drivepath_gdrive::FOLDER_MIME_TYPE;

use crate::common::{error_body, file_json, folder_json, remote_id, setup_drive_mock};

#[tokio::test]
async fn test_create_folder_posts_metadata() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(body_json(serde_json::json!({
            "name": "archive",
            "mimeType": FOLDER_MIME_TYPE,
            "parents": ["root"]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(folder_json("d-new", "archive", "root")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = CreateRequest {
        name: "archive".to_string(),
        kind: RecordKind::Directory,
        parent_ids: vec![remote_id("root")],
    };
    let created = store.create(&request, None).await.unwrap();

    assert_eq!(created.id, "d-new");
    assert!(created.is_directory);
    assert_eq!(created.parents, vec!["root".to_string()]);
}

#[tokio::test]
async fn test_create_file_uses_multipart_upload() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .and(query_param("uploadType", "multipart"))
        .and(header_regex("content-type", "^multipart/related; boundary=.+$"))
        .and(body_string_contains(r#""name":"report.csv""#))
        .and(body_string_contains("a,b,c\n1,2,3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(file_json("f-new", "report.csv", "d1")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = CreateRequest {
        name: "report.csv".to_string(),
        kind: RecordKind::File,
        parent_ids: vec![remote_id("d1")],
    };
    let created = store
        .create(&request, Some(b"a,b,c\n1,2,3".to_vec()))
        .await
        .unwrap();

    assert_eq!(created.id, "f-new");
    assert!(!created.is_directory);
}

#[tokio::test]
async fn test_create_quota_exceeded() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(error_body(403, "The user's Drive storage quota has been exceeded.")),
        )
        .mount(&server)
        .await;

    let request = CreateRequest {
        name: "big.bin".to_string(),
        kind: RecordKind::File,
        parent_ids: vec![remote_id("root")],
    };
    let err = store.create(&request, Some(vec![0; 64])).await.unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Forbidden"), "{message}");
    assert!(message.contains("quota"), "{message}");
}

#[tokio::test]
async fn test_reparent_patch() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("PATCH"))
        .and(path("/files/f1"))
        .and(query_param("addParents", "d2"))
        .and(query_param("removeParents", "root,d7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json("f1", "notes.txt", "d2")))
        .expect(1)
        .mount(&server)
        .await;

    let patch = UpdatePatch::reparent(remote_id("d2"), vec![remote_id("root"), remote_id("d7")]);
    let updated = store.update(&remote_id("f1"), &patch).await.unwrap();

    assert_eq!(updated.parents, vec!["d2".to_string()]);
}

#[tokio::test]
async fn test_trash_patch_body() {
    let (server, store) = setup_drive_mock().await;

    let mut trashed = file_json("f1", "notes.txt", "root");
    trashed["trashed"] = serde_json::json!(true);
    Mock::given(method("PATCH"))
        .and(path("/files/f1"))
        .and(query_param_is_missing("addParents"))
        .and(query_param_is_missing("removeParents"))
        .and(body_json(serde_json::json!({ "trashed": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(trashed))
        .expect(1)
        .mount(&server)
        .await;

    let updated = store
        .update(&remote_id("f1"), &UpdatePatch::trash())
        .await
        .unwrap();
    assert!(updated.trashed);
}

#[tokio::test]
async fn test_update_server_error() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("PATCH"))
        .and(path("/files/f1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
        .mount(&server)
        .await;

    let err = store
        .update(&remote_id("f1"), &UpdatePatch::trash())
        .await
        .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Failed to update f1"), "{message}");
    assert!(message.contains("Server error"), "{message}");
}
