use gh_issue_pdf::config::Config;
use gh_issue_pdf::github::{GitHubSource, RestGitHub};
use gh_issue_pdf::paginate;
use gh_issue_pdf::types::{AccountType, IssueSummary, PageCursor, RepoRef};
use httpmock::{Method::GET, MockServer};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn client(server: &MockServer) -> RestGitHub {
    let cfg = Config {
        api_url: server.base_url(),
        ..Config::default()
    };
    RestGitHub::new(Arc::new(cfg), "ghp_test").unwrap()
}

fn issue_json(number: u64, created: &str) -> serde_json::Value {
    serde_json::json!({
        "number": number,
        "title": format!("Issue {}", number),
        "body": "Steps to reproduce",
        "labels": [{"name": "bug"}],
        "user": {"login": "octocat"},
        "created_at": created,
        "closed_at": null
    })
}

fn next_link(server: &MockServer, path: &str, page: u32) -> String {
    format!(
        "<{}{}?page={}>; rel=\"next\", <{}{}?page=3>; rel=\"last\"",
        server.base_url(),
        path,
        page,
        server.base_url(),
        path
    )
}

#[tokio::test]
async fn issue_walk_follows_link_headers_to_the_last_page() {
    let server = MockServer::start_async().await;
    let path = "/repos/o/r/issues";
    let p1 = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(path)
                .query_param("state", "all")
                .query_param("page", "1")
                .query_param("per_page", "2");
            then.status(200)
                .header("link", next_link(&server, path, 2).as_str())
                .header("x-ratelimit-remaining", "4999")
                .json_body(serde_json::json!([
                    issue_json(5, "2021-01-01T00:00:00Z"),
                    issue_json(4, "2021-02-01T00:00:00Z")
                ]));
        })
        .await;
    let p2 = server
        .mock_async(|when, then| {
            when.method(GET).path(path).query_param("page", "2");
            then.status(200)
                .header("link", next_link(&server, path, 3).as_str())
                .json_body(serde_json::json!([
                    issue_json(3, "2021-03-01T00:00:00Z"),
                    issue_json(2, "2021-04-01T00:00:00Z")
                ]));
        })
        .await;
    let p3 = server
        .mock_async(|when, then| {
            when.method(GET).path(path).query_param("page", "3");
            then.status(200)
                .json_body(serde_json::json!([issue_json(1, "2021-05-01T00:00:00Z")]));
        })
        .await;

    let gh = client(&server);
    let issues = paginate::fetch_issues(
        &gh,
        &RepoRef::new("o", "r"),
        false,
        2,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let numbers: Vec<u64> = issues.iter().map(|i| i.number).collect();
    assert_eq!(numbers, vec![5, 4, 3, 2, 1]);
    p1.assert_hits_async(1).await;
    p2.assert_hits_async(1).await;
    p3.assert_hits_async(1).await;

    let first: &IssueSummary = &issues[0];
    assert_eq!(first.owner, "o");
    assert_eq!(first.repo, "r");
    assert_eq!(first.labels, vec!["bug".to_string()]);
    assert_eq!(first.author.as_deref(), Some("octocat"));
    assert!(!first.private);
}

#[tokio::test]
async fn single_page_without_link_header_makes_one_request() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/o/tiny/issues");
            then.status(200)
                .json_body(serde_json::json!([issue_json(1, "2020-01-01T00:00:00Z")]));
        })
        .await;

    let gh = client(&server);
    let issues = paginate::fetch_issues(
        &gh,
        &RepoRef::new("o", "tiny"),
        true,
        100,
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(issues.len(), 1);
    assert!(issues[0].private);
    m.assert_hits_async(1).await;
}

#[tokio::test]
async fn org_and_user_listings_use_their_own_endpoints() {
    let server = MockServer::start_async().await;
    let org = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/orgs/acme/repos")
                .query_param("type", "public");
            then.status(200).json_body(serde_json::json!([
                {"name": "api", "owner": {"login": "acme"}, "private": false}
            ]));
        })
        .await;
    let user = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/users/alice/repos")
                .query_param("type", "owner");
            then.status(200).json_body(serde_json::json!([
                {"name": "dots", "owner": {"login": "alice"}, "private": true}
            ]));
        })
        .await;

    let gh = client(&server);
    let cancel = CancellationToken::new();
    let org_repos = paginate::fetch_repos(&gh, "acme", AccountType::Organization, 100, &cancel)
        .await
        .unwrap();
    let user_repos = paginate::fetch_repos(&gh, "alice", AccountType::User, 100, &cancel)
        .await
        .unwrap();

    assert_eq!(
        org_repos,
        vec![RepoRef {
            owner: "acme".into(),
            name: "api".into(),
            private: Some(false)
        }]
    );
    assert_eq!(user_repos[0].private, Some(true));
    org.assert_hits_async(1).await;
    user.assert_hits_async(1).await;
}

#[tokio::test]
async fn missing_repo_maps_to_not_found() {
    let server = MockServer::start_async().await;
    let _m = server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/o/nope/issues");
            then.status(404)
                .json_body(serde_json::json!({"message": "Not Found"}));
        })
        .await;

    let gh = client(&server);
    let err = gh
        .list_issues(&RepoRef::new("o", "nope"), false, PageCursor::first(100))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "not_found");
    assert!(err.to_string().contains("o/nope"));
}

#[tokio::test]
async fn repo_visibility_lookup() {
    let server = MockServer::start_async().await;
    let _m = server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/o/secret");
            then.status(200).json_body(serde_json::json!({
                "name": "secret", "owner": {"login": "o"}, "private": true
            }));
        })
        .await;
    let gh = client(&server);
    assert!(gh.repo_is_private(&RepoRef::new("o", "secret")).await.unwrap());
}

#[tokio::test]
async fn private_issue_comments_are_paginated() {
    let server = MockServer::start_async().await;
    let path = "/repos/o/r/issues/9/comments";
    let _p1 = server
        .mock_async(|when, then| {
            when.method(GET).path(path).query_param("page", "1");
            then.status(200)
                .header("link", next_link(&server, path, 2).as_str())
                .json_body(serde_json::json!([
                    {"user": {"login": "a"}, "body": "first", "created_at": "2022-01-01T00:00:00Z"}
                ]));
        })
        .await;
    let _p2 = server
        .mock_async(|when, then| {
            when.method(GET).path(path).query_param("page", "2");
            then.status(200).json_body(serde_json::json!([
                {"user": null, "body": "second", "created_at": "2022-01-02T00:00:00Z"}
            ]));
        })
        .await;

    let gh = client(&server);
    let issue = IssueSummary {
        owner: "o".into(),
        repo: "r".into(),
        number: 9,
        title: "t".into(),
        body: None,
        labels: vec![],
        author: None,
        created_at: "2022-01-01T00:00:00Z".parse().unwrap(),
        closed_at: None,
        private: true,
    };
    let comments = paginate::fetch_comments(&gh, &issue, 1, &CancellationToken::new())
        .await
        .unwrap();
    let bodies: Vec<&str> = comments.iter().filter_map(|c| c.body.as_deref()).collect();
    assert_eq!(bodies, vec!["first", "second"]);
    assert_eq!(comments[1].author, None);
}

#[tokio::test]
async fn persistent_server_error_is_sent_five_times_then_reported() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/o/flaky/issues");
            then.status(503)
                .header("retry-after", "0")
                .body("unavailable");
        })
        .await;

    let gh = client(&server);
    let err = gh
        .list_issues(&RepoRef::new("o", "flaky"), false, PageCursor::first(100))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "upstream_error");
    m.assert_hits_async(5).await;
}

#[tokio::test]
async fn rate_limited_lookup_gives_up_after_five_sends() {
    let server = MockServer::start_async().await;
    let limited = server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/o/busy");
            then.status(429).header("retry-after", "0");
        })
        .await;

    let gh = client(&server);
    let err = gh
        .repo_is_private(&RepoRef::new("o", "busy"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "rate_limited");
    limited.assert_hits_async(5).await;
}
