//! Tests for the per-request GitHub error store

use reqwest::StatusCode;

use github_mcp_server::error_store::{
    ErrorStore, ErrorStoreError, GitHubApiError, GitHubGraphQLError, current_store,
    github_api_errors, github_graphql_errors, record_github_api_error,
    record_github_graphql_error, with_github_errors,
};
use github_mcp_server::github::UserAgent;
use github_mcp_server::github::error::{GitHubRequestError, GraphQLRequestError};
use github_mcp_server::github::graphql::GraphQLError;
use github_mcp_server::hooks::LifecycleHooks;

fn api_error(message: &str, status: StatusCode) -> GitHubApiError {
    GitHubApiError::new(
        message,
        GitHubRequestError::Status {
            status,
            url: "https://api.github.com/repos/octo/hello".to_string(),
            message: status.canonical_reason().unwrap_or_default().to_string(),
        },
    )
}

fn graphql_error(message: &str) -> GitHubGraphQLError {
    GitHubGraphQLError::new(
        message,
        GraphQLRequestError::Query(vec![GraphQLError {
            message: "Could not resolve to a Repository".to_string(),
            error_type: Some("NOT_FOUND".to_string()),
            path: Vec::new(),
        }]),
    )
}

fn test_hooks() -> LifecycleHooks {
    LifecycleHooks::new("1.0.0", UserAgent::new("github-mcp-server/1.0.0").unwrap())
}

/// Recorded errors come back in insertion order, REST and GraphQL kept apart
#[tokio::test]
async fn test_errors_are_returned_in_order_per_kind() {
    let store = ErrorStore::new();

    let (api, graphql) = with_github_errors(store.clone(), async {
        record_github_api_error(api_error("failed to get issue", StatusCode::NOT_FOUND));
        record_github_graphql_error(graphql_error("failed to get repository"));
        record_github_api_error(api_error("failed to get user", StatusCode::UNAUTHORIZED));

        (github_api_errors().unwrap(), github_graphql_errors().unwrap())
    })
    .await;

    let api_messages: Vec<&str> = api.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(api_messages, vec!["failed to get issue", "failed to get user"]);
    assert_eq!(graphql.len(), 1);
    assert_eq!(graphql[0].message, "failed to get repository");

    // the caller's handle sees the same entries after the scope ends
    assert_eq!(store.api_errors().len(), 2);
    assert_eq!(store.graphql_errors().len(), 1);
}

#[tokio::test]
async fn test_api_error_keeps_response_details() {
    let error = api_error("failed to get issue", StatusCode::NOT_FOUND);

    let response = error.response.as_ref().unwrap();
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.url, "https://api.github.com/repos/octo/hello");
    assert!(error.to_string().starts_with("failed to get issue: "));
}

/// Each request gets a fresh store, even back-to-back on the same hooks
#[tokio::test]
async fn test_each_request_gets_a_fresh_store() {
    let hooks = test_hooks();

    let first = hooks.on_before_any("tools/call");
    with_github_errors(first.clone(), async {
        record_github_api_error(api_error("failed to get user", StatusCode::UNAUTHORIZED));
    })
    .await;

    let second = hooks.on_before_any("tools/call");
    let seen = with_github_errors(second.clone(), async { github_api_errors().unwrap() }).await;

    assert_eq!(first.api_errors().len(), 1);
    assert!(seen.is_empty());
    assert!(second.is_empty());
}

/// Recording without a store in scope is silently dropped
#[tokio::test]
async fn test_record_without_store_does_not_fail() {
    record_github_api_error(api_error("failed to get user", StatusCode::UNAUTHORIZED));
    record_github_graphql_error(graphql_error("failed to get repository"));

    assert!(current_store().is_none());
    assert_eq!(github_api_errors().unwrap_err(), ErrorStoreError::Missing);
    assert_eq!(github_graphql_errors().unwrap_err(), ErrorStoreError::Missing);
}

/// A store in scope around a task is not inherited by tasks it spawns
#[tokio::test]
async fn test_store_is_not_inherited_by_spawned_tasks() {
    let store = ErrorStore::new();

    let spawned = with_github_errors(store.clone(), async {
        tokio::spawn(async { github_api_errors() }).await.unwrap()
    })
    .await;

    assert_eq!(spawned.unwrap_err(), ErrorStoreError::Missing);
}

/// A nested scope shadows the outer one for its duration only
#[tokio::test]
async fn test_nested_scope_shadows_outer_store() {
    let outer = ErrorStore::new();
    let inner = ErrorStore::new();

    with_github_errors(outer.clone(), async {
        with_github_errors(inner.clone(), async {
            record_github_api_error(api_error("inner", StatusCode::FORBIDDEN));
        })
        .await;
        record_github_api_error(api_error("outer", StatusCode::FORBIDDEN));
    })
    .await;

    assert_eq!(inner.api_errors()[0].message, "inner");
    assert_eq!(outer.api_errors().len(), 1);
    assert_eq!(outer.api_errors()[0].message, "outer");
}
