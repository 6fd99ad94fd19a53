//! Request client tests: headers, query strings and response classification

use follower_crawl::api::{fetch_follower_page, ApiClient, ApiFailure, PlatformApi};
use follower_crawl::config::ApiSettings;
use follower_crawl::session::SessionContext;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a client pointed at the given server
fn create_test_client(base_url: &str) -> ApiClient {
    let session = SessionContext::new("sess-123", "csrf-456", "42", None);
    let settings = ApiSettings {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        ..Default::default()
    };
    ApiClient::new(&session, &settings).expect("Failed to build client")
}

async fn respond(status: u16, body: &str) -> (MockServer, Result<serde_json::Value, ApiFailure>) {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/probe/"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let result = client.call("probe/", &[]).await;
    (mock_server, result)
}

#[tokio::test]
async fn test_requests_carry_session_identity() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts/current_user/"))
        .and(query_param("edit", "true"))
        .and(header("x-ig-app-id", "936619743392459"))
        .and(header("x-csrftoken", "csrf-456"))
        .and(header_exists("user-agent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"user": {"username": "me"}}"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let value = client
        .call("accounts/current_user/", &[("edit", "true")])
        .await
        .expect("Probe should succeed");

    assert_eq!(value["user"]["username"], "me");
}

#[tokio::test]
async fn test_follower_page_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/friendships/77/followers/"))
        .and(query_param("count", "50"))
        .and(query_param("search_surface", "follow_list_page"))
        .and(query_param("max_id", "QVFD"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"users": [{"pk": 5, "username": "e", "full_name": "Eve"}], "next_max_id": null}"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let page = fetch_follower_page(&client, "77", Some("QVFD"), 50)
        .await
        .expect("Page should be fetched");

    assert_eq!(page.users.len(), 1);
    assert_eq!(page.users[0].id, "5");
    assert_eq!(page.users[0].display_name, "Eve");
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn test_rate_limit_status() {
    let (_server, result) = respond(429, "Please wait a few minutes").await;
    assert_eq!(result, Err(ApiFailure::RateLimited));
}

#[tokio::test]
async fn test_unauthorized_status() {
    let (_server, result) = respond(401, "").await;
    assert!(matches!(result, Err(ApiFailure::SessionExpired(_))));
}

#[tokio::test]
async fn test_challenge_is_session_expiry() {
    let (_server, result) =
        respond(400, r#"{"message": "challenge_required", "status": "fail"}"#).await;

    match result {
        Err(ApiFailure::SessionExpired(message)) => {
            assert!(message.contains("challenge_required"));
        }
        other => panic!("Expected session expiry, got {:?}", other),
    }
}

#[tokio::test]
async fn test_plain_bad_request() {
    let (_server, result) = respond(400, r#"{"message": "Invalid target"}"#).await;
    assert_eq!(
        result,
        Err(ApiFailure::ApiError {
            status: 400,
            detail: "Invalid target".to_string(),
        })
    );
}

#[tokio::test]
async fn test_not_found_reports_path() {
    let (_server, result) = respond(404, "").await;
    assert_eq!(
        result,
        Err(ApiFailure::NotFound {
            path: "probe/".to_string(),
        })
    );
}

#[tokio::test]
async fn test_server_error_truncates_detail() {
    let body = "x".repeat(500);
    let (_server, result) = respond(502, &body).await;

    match result {
        Err(ApiFailure::ApiError { status, detail }) => {
            assert_eq!(status, 502);
            assert_eq!(detail.chars().count(), 200);
        }
        other => panic!("Expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_html_success_is_an_error() {
    let (_server, result) = respond(200, "<html><body>Login</body></html>").await;
    assert_eq!(
        result,
        Err(ApiFailure::ApiError {
            status: 200,
            detail: "non-JSON response".to_string(),
        })
    );
}

#[tokio::test]
async fn test_connection_failure_is_transport() {
    // Nothing listens on the discard port
    let client = create_test_client("http://127.0.0.1:9");
    let result = client.call("probe/", &[]).await;

    assert!(matches!(result, Err(ApiFailure::Transport(_))));
}
