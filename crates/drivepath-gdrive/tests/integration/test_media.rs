//! Media download tests

use futures_util::TryStreamExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use drivepath_core::ports::IRemoteStore;

use crate::common::{error_body, remote_id, setup_drive_mock};

#[tokio::test]
async fn test_get_media_streams_content() {
    let (server, store) = setup_drive_mock().await;
    let content: Vec<u8> = (0..=255u8).cycle().take(200_000).collect();

    Mock::given(method("GET"))
        .and(path("/files/f1"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let stream = store.get_media(&remote_id("f1")).await.unwrap();
    let chunks: Vec<Vec<u8>> = stream.try_collect().await.unwrap();

    assert_eq!(chunks.concat(), content);
}

#[tokio::test]
async fn test_get_media_empty_file() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/files/empty"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let stream = store.get_media(&remote_id("empty")).await.unwrap();
    let chunks: Vec<Vec<u8>> = stream.try_collect().await.unwrap();
    assert!(chunks.concat().is_empty());
}

#[tokio::test]
async fn test_get_media_not_found_fails_before_streaming() {
    let (server, store) = setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/files/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_body(404, "File not found: gone.")))
        .mount(&server)
        .await;

    let result = store.get_media(&remote_id("gone")).await;
    let err = match result {
        Ok(_) => panic!("expected the download to fail"),
        Err(e) => e,
    };
    let message = format!("{err:#}");
    assert!(message.contains("Failed to download gone"), "{message}");
    assert!(message.contains("Not found"), "{message}");
}
