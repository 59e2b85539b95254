//! Conversions from GitHub failures to tool results
//!
//! User-actionable failures (bad credentials, rate limits, missing resources)
//! are recorded in the request's error store and reported to the client as a
//! failed tool result, so the session carries on. Everything else is a bug in
//! this server and becomes a protocol-level error instead.

use rmcp::Error as McpError;
use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use crate::error_store::{
    GitHubApiError, GitHubGraphQLError, record_github_api_error, record_github_graphql_error,
};
use crate::github::error::{GitHubRequestError, GraphQLRequestError};

/// Failed tool result the client can read and react to
pub fn tool_error_result(message: impl Into<String>) -> CallToolResult {
    CallToolResult {
        content: vec![Content::text(message.into())],
        is_error: Some(true),
    }
}

pub fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult {
        content: vec![Content::text(text.into())],
        is_error: Some(false),
    }
}

/// Serializes `value` as pretty JSON text
pub fn json_result<T: Serialize + ?Sized>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("Failed to serialize response: {}", e), None)
    })?;
    Ok(text_result(json))
}

pub fn api_error_result(
    message: &str,
    error: GitHubRequestError,
) -> Result<CallToolResult, McpError> {
    // Rejected before any request was sent; nothing to record
    if let GitHubRequestError::InvalidPath(_) = &error {
        return Ok(tool_error_result(format!("{}: {}", message, error)));
    }
    if !error.is_user_actionable() {
        return Err(McpError::internal_error(
            format!("{}: {}", message, error),
            None,
        ));
    }

    let text = format!("{}: {}", message, error);
    record_github_api_error(GitHubApiError::new(message, error));
    Ok(tool_error_result(text))
}

pub fn graphql_error_result(
    message: &str,
    error: GraphQLRequestError,
) -> Result<CallToolResult, McpError> {
    if !error.is_user_actionable() {
        return Err(McpError::internal_error(
            format!("{}: {}", message, error),
            None,
        ));
    }

    let text = format!("{}: {}", message, error);
    record_github_graphql_error(GitHubGraphQLError::new(message, error));
    Ok(tool_error_result(text))
}
