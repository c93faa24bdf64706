//! Token refresh tests against a mock OAuth token endpoint

use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use drivepath_gdrive::auth::{ensure_fresh_token, TokenFile};

async fn mount_token_endpoint(server: &MockServer, response: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=1%2F%2Frefresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(1)
        .mount(server)
        .await;
}

fn expired_token_json(token_uri: &str) -> String {
    serde_json::json!({
        "token": "expired-access",
        "refresh_token": "1//refresh",
        "token_uri": token_uri,
        "client_id": "client.apps.googleusercontent.com",
        "client_secret": "secret",
        "expiry": "2000-01-01T00:00:00Z"
    })
    .to_string()
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_saved() {
    let server = MockServer::start().await;
    mount_token_endpoint(
        &server,
        serde_json::json!({
            "access_token": "fresh-access",
            "expires_in": 3599,
            "token_type": "Bearer"
        }),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");
    std::fs::write(&token_path, expired_token_json(&format!("{}/token", server.uri()))).unwrap();

    let token = ensure_fresh_token(&dir.path().join("credentials.json"), &token_path, None)
        .await
        .unwrap();
    assert_eq!(token, "fresh-access");

    let saved = TokenFile::load(&token_path).unwrap();
    assert_eq!(saved.access_token, "fresh-access");
    assert_eq!(saved.refresh_token.as_deref(), Some("1//refresh"));
    assert!(!saved.is_expired(chrono::Utc::now()));
    assert_eq!(saved.client_id.as_deref(), Some("client.apps.googleusercontent.com"));
}

#[tokio::test]
async fn test_rotated_refresh_token_is_kept() {
    let server = MockServer::start().await;
    mount_token_endpoint(
        &server,
        serde_json::json!({
            "access_token": "fresh-access",
            "refresh_token": "1//rotated",
            "expires_in": 3599,
            "token_type": "Bearer"
        }),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");
    std::fs::write(&token_path, expired_token_json(&format!("{}/token", server.uri()))).unwrap();

    ensure_fresh_token(&dir.path().join("credentials.json"), &token_path, None)
        .await
        .unwrap();

    let saved = TokenFile::load(&token_path).unwrap();
    assert_eq!(saved.refresh_token.as_deref(), Some("1//rotated"));
}

#[tokio::test]
async fn test_credentials_file_is_used_when_token_has_no_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("client_id=installed-client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "from-installed",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");
    let creds_path = dir.path().join("credentials.json");
    std::fs::write(
        &token_path,
        r#"{"access_token": "old", "refresh_token": "1//refresh", "expires_at": "2000-01-01T00:00:00Z"}"#,
    )
    .unwrap();
    std::fs::write(
        &creds_path,
        serde_json::json!({
            "installed": {
                "client_id": "installed-client",
                "client_secret": "installed-secret",
                "token_uri": format!("{}/token", server.uri())
            }
        })
        .to_string(),
    )
    .unwrap();

    let token = ensure_fresh_token(&creds_path, &token_path, None).await.unwrap();
    assert_eq!(token, "from-installed");
}

#[tokio::test]
async fn test_rejected_refresh_leaves_token_file_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked."
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");
    let original = expired_token_json(&format!("{}/token", server.uri()));
    std::fs::write(&token_path, &original).unwrap();

    let err = ensure_fresh_token(&dir.path().join("credentials.json"), &token_path, None)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("Failed to refresh token"));
    assert_eq!(std::fs::read_to_string(&token_path).unwrap(), original);
}

#[tokio::test]
async fn test_refresh_without_scope_keeps_granted_scopes() {
    let server = MockServer::start().await;
    mount_token_endpoint(
        &server,
        serde_json::json!({
            "access_token": "fresh-access",
            "expires_in": 3599,
            "token_type": "Bearer"
        }),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");
    std::fs::write(&token_path, expired_token_json(&format!("{}/token", server.uri()))).unwrap();

    ensure_fresh_token(&dir.path().join("credentials.json"), &token_path, None)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(!body.contains("scope="), "unexpected scope in {body}");
}

#[tokio::test]
async fn test_configured_scope_is_sent_with_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains(
            "scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fdrive.file",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "narrowed",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");
    std::fs::write(&token_path, expired_token_json(&format!("{}/token", server.uri()))).unwrap();

    let token = ensure_fresh_token(
        &dir.path().join("credentials.json"),
        &token_path,
        Some("https://www.googleapis.com/auth/drive.file"),
    )
    .await
    .unwrap();
    assert_eq!(token, "narrowed");
}
