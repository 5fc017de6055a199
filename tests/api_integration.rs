// ABOUTME: Integration tests for the GitHub client against a mock server
// ABOUTME: Exercises headers, pagination, PR filtering, and error paths

use octomirror::api::GithubClient;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn issue(number: u64, title: &str) -> serde_json::Value {
    json!({
        "number": number,
        "title": title,
        "state": "open",
        "created_at": "2026-08-01T12:00:00Z",
        "html_url": format!("https://github.com/octo/widgets/issues/{}", number),
        "user": {"login": "octocat"}
    })
}

#[tokio::test]
async fn test_list_issues_drops_pull_requests() {
    let mock_server = MockServer::start().await;

    let mut pr_in_listing = issue(9, "Actually a PR");
    pr_in_listing["pull_request"] =
        json!({"url": "https://api.github.com/repos/octo/widgets/pulls/9"});

    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/issues"))
        .and(header("Authorization", "Bearer test_token"))
        .and(header("Accept", "application/vnd.github+json"))
        .and(header("X-GitHub-Api-Version", "2022-11-28"))
        .and(query_param("state", "open"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([issue(42, "Real issue"), pr_in_listing])),
        )
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();

    // Run blocking client in a blocking context
    let result = tokio::task::spawn_blocking(move || {
        let client = GithubClient::new("test_token".into(), Some(uri))
            .unwrap()
            .disable_throttle();
        client.list_open_issues("octo", "widgets")
    })
    .await
    .unwrap();

    let issues = result.unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].number, 42);
}

#[tokio::test]
async fn test_pagination_follows_full_pages() {
    let mock_server = MockServer::start().await;

    let first_page: Vec<serde_json::Value> =
        (1..=100).map(|n| issue(n, "Bulk issue")).collect();
    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/issues"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(first_page))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/issues"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([issue(101, "Last one")])))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let client = GithubClient::new("test_token".into(), Some(uri))
            .unwrap()
            .disable_throttle();
        client.list_open_issues("octo", "widgets")
    })
    .await
    .unwrap();

    let issues = result.unwrap();
    assert_eq!(issues.len(), 101);
    assert_eq!(issues[100].number, 101);
}

#[tokio::test]
async fn test_api_error_handling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/issues"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();

    // Run blocking client in a blocking context
    let result = tokio::task::spawn_blocking(move || {
        let client = GithubClient::new("bad_token".into(), Some(uri))
            .unwrap()
            .disable_throttle();
        client.list_open_issues("octo", "widgets")
    })
    .await
    .unwrap();

    assert!(result.is_err());

    if let Err(octomirror::Error::Api { status, .. }) = result {
        assert_eq!(status, 403);
    } else {
        panic!("Expected API error");
    }
}

#[tokio::test]
async fn test_pull_request_comments_merged_and_tagged() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/issues/7/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "user": {"login": "ron"},
                "body": "Looks good overall",
                "created_at": "2026-08-02T09:30:00Z"
            }
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/widgets/pulls/7/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "user": {"login": "hermione"},
                "body": "This loop never terminates",
                "created_at": "2026-08-02T10:00:00Z",
                "path": "src/engine.rs",
                "line": 88
            }
        ])))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let client = GithubClient::new("test_token".into(), Some(uri))
            .unwrap()
            .disable_throttle();
        client.list_pull_request_comments("octo", "widgets", 7)
    })
    .await
    .unwrap();

    let comments = result.unwrap();
    assert_eq!(comments.len(), 2);
    assert!(!comments[0].is_review);
    assert!(comments[1].is_review);
    assert_eq!(comments[1].path.as_deref(), Some("src/engine.rs"));
    assert_eq!(comments[1].line, Some(88));
}
