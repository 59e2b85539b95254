//! Tests for toolset selection and tool dispatch through the MCP server
//!
//! GitHub failures must reach the client as failed tool results and be recorded
//! in the request's error store; internal failures must not.

use rmcp::model::{CallToolResult, JsonObject};
use serde_json::{Value, json};

use github_mcp_server::error_store::{
    ErrorStore, GitHubApiError, current_store, record_github_api_error, with_github_errors,
};
use github_mcp_server::github::error::GitHubRequestError;
use github_mcp_server::tools::GitHubMcpServer;
use github_mcp_server::tools::toolsets::ToolsetError;
use test_util::{create_test_clients, create_test_server, test_config};

fn tool_names(server: &GitHubMcpServer) -> Vec<String> {
    server
        .available_tools()
        .into_iter()
        .map(|tool| tool.name.to_string())
        .collect()
}

fn arguments(value: Value) -> Option<JsonObject> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn result_text(result: &CallToolResult) -> String {
    let value = serde_json::to_value(result).unwrap();
    value["content"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_all_toolsets_are_enabled_by_default() {
    let server = create_test_server("http://127.0.0.1:1", &test_config());

    assert_eq!(
        tool_names(&server),
        vec![
            "get_me",
            "get_file_contents",
            "get_repository",
            "get_issue",
            "create_issue",
            "add_issue_comment"
        ]
    );
}

/// Read-only mode hides write tools and refuses to call them
#[tokio::test]
async fn test_read_only_mode_hides_write_tools() {
    let mut config = test_config();
    config.read_only = true;
    let server = create_test_server("http://127.0.0.1:1", &config);

    let names = tool_names(&server);
    assert!(names.contains(&"get_issue".to_string()));
    assert!(!names.contains(&"create_issue".to_string()));
    assert!(!names.contains(&"add_issue_comment".to_string()));

    let result = server
        .dispatch(
            "create_issue",
            arguments(json!({"owner": "octo", "repo": "hello", "title": "x"})),
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_only_selected_toolsets_are_enabled() {
    let mut config = test_config();
    config.enabled_toolsets = vec!["repos".to_string()];
    let server = create_test_server("http://127.0.0.1:1", &config);

    assert_eq!(tool_names(&server), vec!["get_file_contents", "get_repository"]);
    assert!(server.dispatch("get_me", None).await.is_err());
}

#[tokio::test]
async fn test_unknown_toolset_fails_startup() {
    let mut config = test_config();
    config.enabled_toolsets = vec!["repos".to_string(), "wiki".to_string()];

    let result = GitHubMcpServer::new(&config, create_test_clients("http://127.0.0.1:1"));

    assert_eq!(
        result.err().map(|e| e.to_string()),
        Some(ToolsetError::UnknownToolset("wiki".to_string()).to_string())
    );
}

/// Dynamic mode starts with the context toolset and enables others on request
#[tokio::test]
async fn test_dynamic_toolsets_can_be_enabled_at_runtime() {
    let mut config = test_config();
    config.dynamic_toolsets = true;
    let server = create_test_server("http://127.0.0.1:1", &config);

    assert_eq!(
        tool_names(&server),
        vec![
            "list_available_toolsets",
            "get_toolset_tools",
            "enable_toolset",
            "get_me"
        ]
    );

    let listed = server.dispatch("list_available_toolsets", None).await.unwrap();
    let toolsets: Value = serde_json::from_str(&result_text(&listed)).unwrap();
    assert_eq!(toolsets[0]["name"], "context");
    assert_eq!(toolsets[0]["currently_enabled"], true);
    assert_eq!(toolsets[2]["name"], "issues");
    assert_eq!(toolsets[2]["currently_enabled"], false);

    let tools = server
        .dispatch("get_toolset_tools", arguments(json!({"toolset": "issues"})))
        .await
        .unwrap();
    assert!(result_text(&tools).contains("create_issue"));

    let enabled = server
        .dispatch("enable_toolset", arguments(json!({"toolset": "issues"})))
        .await
        .unwrap();
    assert_eq!(enabled.is_error, Some(false));
    assert!(tool_names(&server).contains(&"get_issue".to_string()));

    let unknown = server
        .dispatch("enable_toolset", arguments(json!({"toolset": "wiki"})))
        .await
        .unwrap();
    assert_eq!(unknown.is_error, Some(true));
}

/// A rejected credential is a failed tool result plus one recorded API error
#[tokio::test]
async fn test_api_failure_is_recorded_and_reported() {
    let mut mock = mockito::Server::new_async().await;
    let _user = mock
        .mock("GET", "/api/v3/user")
        .with_status(401)
        .with_body(r#"{"message":"Bad credentials"}"#)
        .create_async()
        .await;
    let server = create_test_server(&mock.url(), &test_config());

    let store = ErrorStore::new();
    let result = with_github_errors(store.clone(), server.dispatch("get_me", None))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert!(result_text(&result).contains("Bad credentials"));

    let api_errors = store.api_errors();
    assert_eq!(api_errors.len(), 1);
    assert_eq!(api_errors[0].message, "failed to get user");
    assert_eq!(
        api_errors[0].response.as_ref().map(|r| r.status.as_u16()),
        Some(401)
    );
    assert!(store.graphql_errors().is_empty());
}

#[tokio::test]
async fn test_graphql_failure_is_recorded_and_reported() {
    let mut mock = mockito::Server::new_async().await;
    let _graphql = mock
        .mock("POST", "/api/graphql")
        .with_status(200)
        .with_body(
            r#"{"data":{"repository":null},"errors":[{"type":"NOT_FOUND","message":"Could not resolve to a Repository with the name 'octo/missing'."}]}"#,
        )
        .create_async()
        .await;
    let server = create_test_server(&mock.url(), &test_config());

    let store = ErrorStore::new();
    let result = with_github_errors(
        store.clone(),
        server.dispatch(
            "get_repository",
            arguments(json!({"owner": "octo", "repo": "missing"})),
        ),
    )
    .await
    .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert!(store.api_errors().is_empty());
    assert_eq!(store.graphql_errors().len(), 1);
    assert_eq!(store.graphql_errors()[0].message, "failed to get repository");
}

/// A malformed GitHub response is a protocol error and stays out of the store
#[tokio::test]
async fn test_internal_failure_bypasses_error_store() {
    let mut mock = mockito::Server::new_async().await;
    let _user = mock
        .mock("GET", "/api/v3/user")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;
    let server = create_test_server(&mock.url(), &test_config());

    let store = ErrorStore::new();
    let result = with_github_errors(store.clone(), server.dispatch("get_me", None)).await;

    assert!(result.is_err());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_successful_calls_return_json() {
    let mut mock = mockito::Server::new_async().await;
    let _issue = mock
        .mock("GET", "/api/v3/repos/octo/hello/issues/42")
        .with_status(200)
        .with_body(r#"{"number":42,"title":"Broken build"}"#)
        .create_async()
        .await;
    let _repository = mock
        .mock("POST", "/api/graphql")
        .with_status(200)
        .with_body(
            r#"{"data":{"repository":{"nameWithOwner":"octo/hello","description":null,"url":"https://github.com/octo/hello","isPrivate":false,"isArchived":false,"stargazerCount":3,"forkCount":1,"primaryLanguage":{"name":"Rust"},"defaultBranchRef":{"name":"main"},"createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-02-01T00:00:00Z"}}}"#,
        )
        .create_async()
        .await;
    let server = create_test_server(&mock.url(), &test_config());

    let issue = server
        .handle_tool_call(
            "get_issue",
            arguments(json!({"owner": "octo", "repo": "hello", "issue_number": 42})),
        )
        .await
        .unwrap();
    let issue: Value = serde_json::from_str(&result_text(&issue)).unwrap();
    assert_eq!(issue["title"], "Broken build");

    let repository = server
        .handle_tool_call(
            "get_repository",
            arguments(json!({"owner": "octo", "repo": "hello"})),
        )
        .await
        .unwrap();
    let repository: Value = serde_json::from_str(&result_text(&repository)).unwrap();
    assert_eq!(repository["nameWithOwner"], "octo/hello");
    assert_eq!(repository["defaultBranchRef"]["name"], "main");
}

#[tokio::test]
async fn test_create_issue_posts_fields() {
    let mut mock = mockito::Server::new_async().await;
    let created = mock
        .mock("POST", "/api/v3/repos/octo/hello/issues")
        .match_body(mockito::Matcher::Json(
            json!({"title": "Broken build", "labels": ["bug"]}),
        ))
        .with_status(201)
        .with_body(r#"{"number":43}"#)
        .create_async()
        .await;
    let server = create_test_server(&mock.url(), &test_config());

    let result = server
        .handle_tool_call(
            "create_issue",
            arguments(json!({
                "owner": "octo",
                "repo": "hello",
                "title": "Broken build",
                "labels": ["bug"]
            })),
        )
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(false));
    created.assert_async().await;
}

#[tokio::test]
async fn test_file_contents_are_returned_as_text() {
    let mut mock = mockito::Server::new_async().await;
    let _raw = mock
        .mock("GET", "/raw/octo/hello/main/Cargo.toml")
        .with_status(200)
        .with_body("[package]\nname = \"hello\"\n")
        .create_async()
        .await;
    let server = create_test_server(&mock.url(), &test_config());

    let result = server
        .handle_tool_call(
            "get_file_contents",
            arguments(json!({"owner": "octo", "repo": "hello", "path": "Cargo.toml", "ref": "main"})),
        )
        .await
        .unwrap();

    assert_eq!(result_text(&result), "[package]\nname = \"hello\"\n");
}

#[tokio::test]
async fn test_invalid_arguments_are_rejected() {
    let server = create_test_server("http://127.0.0.1:1", &test_config());

    let result = server
        .handle_tool_call("get_issue", arguments(json!({"owner": "octo", "repo": "hello"})))
        .await;

    assert!(result.is_err());
}

/// Handling a call without any outer store still works; the per-request store is used
#[tokio::test]
async fn test_handle_tool_call_installs_its_own_store() {
    let mut mock = mockito::Server::new_async().await;
    let _user = mock
        .mock("GET", "/api/v3/user")
        .with_status(403)
        .with_body(r#"{"message":"API rate limit exceeded"}"#)
        .create_async()
        .await;
    let server = create_test_server(&mock.url(), &test_config());

    let result = server.handle_tool_call("get_me", None).await.unwrap();

    assert_eq!(result.is_error, Some(true));
    assert!(result_text(&result).contains("rate limit"));
}

/// Hostile file arguments never reach another host and are not GitHub failures
#[tokio::test]
async fn test_file_contents_rejects_escaping_arguments() {
    let mock = mockito::Server::new_async().await;
    let mut other = mockito::Server::new_async().await;
    let foreign = other
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let server = create_test_server(&mock.url(), &test_config());

    for args in [
        json!({"owner": "..", "repo": "hello", "path": "README.md"}),
        json!({"owner": "octo", "repo": "hello", "path": "../../../user"}),
        json!({"owner": "octo", "repo": "hello", "path": "README.md", "ref": "../.."}),
    ] {
        let store = ErrorStore::new();
        let result = with_github_errors(
            store.clone(),
            server.dispatch("get_file_contents", arguments(args.clone())),
        )
        .await
        .unwrap();

        assert_eq!(result.is_error, Some(true), "{}", args);
        assert!(result_text(&result).contains("invalid request path"), "{}", args);
        assert!(store.is_empty());
    }

    let _ = server
        .handle_tool_call(
            "get_file_contents",
            arguments(json!({"owner": other.url(), "repo": "hello", "path": "README.md"})),
        )
        .await;
    foreign.assert_async().await;
}

/// Every request method, not only tool calls, runs with its own store in scope
#[tokio::test]
async fn test_every_request_gets_its_own_store() {
    let server = create_test_server("http://127.0.0.1:1", &test_config());

    for method in ["initialize", "tools/list", "ping"] {
        let (in_scope, store) = server
            .with_request_scope(method, async {
                record_github_api_error(GitHubApiError::new(
                    "failed to get user",
                    GitHubRequestError::Status {
                        status: reqwest::StatusCode::UNAUTHORIZED,
                        url: "https://api.github.com/user".to_string(),
                        message: "Bad credentials".to_string(),
                    },
                ));
                current_store().is_some()
            })
            .await;

        assert!(in_scope, "no store in scope for {}", method);
        assert_eq!(store.api_errors().len(), 1, "{}", method);
    }

    let (seen, _) = server
        .with_request_scope("tools/list", async { current_store().map(|s| s.is_empty()) })
        .await;
    assert_eq!(seen, Some(true));
    assert!(current_store().is_none());
}

#[tokio::test]
async fn test_list_tools_request_returns_available_tools() {
    let mut config = test_config();
    config.enabled_toolsets = vec!["context".to_string()];
    let server = create_test_server("http://127.0.0.1:1", &config);

    let listed = server.handle_list_tools().await;

    assert_eq!(listed.next_cursor, None);
    let names: Vec<String> = listed.tools.iter().map(|t| t.name.to_string()).collect();
    assert_eq!(names, vec!["get_me"]);
}
