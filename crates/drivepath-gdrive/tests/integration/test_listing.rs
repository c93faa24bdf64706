//! Children listing and metadata tests

use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, ResponseTemplate};

use drivepath_core::ports::IRemoteStore;

use crate::common::{
    error_body, file_json, folder_json, mount_metadata, remote_id, setup_drive_mock, TEST_TOKEN,
};

#[tokio::test]
async fn test_list_children_sends_parent_query() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", "'root' in parents"))
        .and(query_param("pageSize", "500"))
        .and(query_param_is_missing("pageToken"))
        .and(header("authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [
                folder_json("d1", "archive", "root"),
                file_json("f1", "notes.txt", "root"),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = store
        .list_children(&remote_id("root"), 500, None)
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert!(page.next_page_token.is_none());
    assert_eq!(page.items[0].id, "d1");
    assert!(page.items[0].is_directory);
    assert_eq!(page.items[1].name, "notes.txt");
    assert!(!page.items[1].is_directory);
    assert!(page.items[1].modified.is_some());
}

#[tokio::test]
async fn test_list_children_forwards_page_token() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("pageToken", "tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "nextPageToken": "tok-3",
            "files": [file_json("f9", "late.txt", "d1")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = store
        .list_children(&remote_id("d1"), 2, Some("tok-2"))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.next_page_token.as_deref(), Some("tok-3"));
}

#[tokio::test]
async fn test_list_children_keeps_trashed_flag() {
    let (server, store) = setup_drive_mock().await;

    let mut trashed = file_json("f2", "old.txt", "root");
    trashed["trashed"] = serde_json::json!(true);
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "files": [trashed] })),
        )
        .mount(&server)
        .await;

    let page = store
        .list_children(&remote_id("root"), 10, None)
        .await
        .unwrap();
    assert!(page.items[0].trashed);
}

#[tokio::test]
async fn test_list_children_empty_response() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let page = store
        .list_children(&remote_id("empty"), 10, None)
        .await
        .unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_list_children_unauthorized() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_body(401, "Invalid Credentials")))
        .mount(&server)
        .await;

    let err = store
        .list_children(&remote_id("root"), 10, None)
        .await
        .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Unauthorized"), "{message}");
    assert!(message.contains("Invalid Credentials"), "{message}");
}

#[tokio::test]
async fn test_list_children_malformed_body() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = store
        .list_children(&remote_id("root"), 10, None)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("Invalid response"));
}

#[tokio::test]
async fn test_get_metadata() {
    let (server, store) = setup_drive_mock().await;
    let mut body = file_json("f1", "notes.txt", "root");
    body["parents"] = serde_json::json!(["root", "d7"]);
    mount_metadata(&server, "f1", body).await;

    let record = store.get(&remote_id("f1")).await.unwrap();
    assert_eq!(record.name, "notes.txt");
    assert_eq!(record.parents, vec!["root".to_string(), "d7".to_string()]);
}

#[tokio::test]
async fn test_get_missing_file() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/files/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_body(404, "File not found: gone.")))
        .mount(&server)
        .await;

    let err = store.get(&remote_id("gone")).await.unwrap_err();
    assert!(format!("{err:#}").contains("File not found: gone."));
}

#[tokio::test]
async fn test_rate_limited_listing_is_not_retried() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "3"))
        .expect(1)
        .mount(&server)
        .await;

    let err = store
        .list_children(&remote_id("root"), 10, None)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("Too many requests"));
}
