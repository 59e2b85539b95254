use rmcp::Error as McpError;
use rmcp::model::{CallToolResult, Tool};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::github::graphql::GraphQLPayload;
use crate::github::graphql::GraphQLQuery;
use crate::github::graphql::repository::{RepositoryResponse, RepositoryVariable, repository_query};
use crate::github::{GraphQLClient, RawClient};
use crate::tools::error::{
    api_error_result, graphql_error_result, json_result, text_result, tool_error_result,
};
use crate::tools::tool_definition;
use crate::translations::Translator;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetFileContentsParams {
    #[schemars(description = "Repository owner (username or organization)")]
    pub owner: String,
    #[schemars(description = "Repository name")]
    pub repo: String,
    #[schemars(description = "Path to the file, relative to the repository root")]
    pub path: String,
    #[serde(rename = "ref", default)]
    #[schemars(description = "Optional git ref (branch, tag or commit SHA). Defaults to HEAD")]
    pub git_ref: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetRepositoryParams {
    #[schemars(description = "Repository owner (username or organization)")]
    pub owner: String,
    #[schemars(description = "Repository name")]
    pub repo: String,
}

pub fn get_file_contents_tool(translator: &Translator) -> Tool {
    tool_definition::<GetFileContentsParams>(
        "get_file_contents",
        translator.translate(
            "TOOL_GET_FILE_CONTENTS_DESCRIPTION",
            "Get the contents of a file from a GitHub repository",
        ),
    )
}

pub fn get_repository_tool(translator: &Translator) -> Tool {
    tool_definition::<GetRepositoryParams>(
        "get_repository",
        translator.translate(
            "TOOL_GET_REPOSITORY_DESCRIPTION",
            "Get an overview of a GitHub repository: description, visibility, default branch, language and star count",
        ),
    )
}

pub async fn get_file_contents(
    raw: &RawClient,
    params: GetFileContentsParams,
) -> Result<CallToolResult, McpError> {
    if params.path.is_empty() || params.path.ends_with('/') {
        return Ok(tool_error_result(
            "path must point to a file, not a directory",
        ));
    }

    let content = match raw
        .get_raw_content(
            &params.owner,
            &params.repo,
            &params.path,
            params.git_ref.as_deref(),
        )
        .await
    {
        Ok(content) => content,
        Err(e) => return api_error_result("failed to get file contents", e),
    };

    match String::from_utf8(content.bytes) {
        Ok(text) => Ok(text_result(text)),
        Err(e) => Ok(text_result(format!(
            "{} is a binary file ({} bytes, content type {})",
            params.path,
            e.as_bytes().len(),
            content.content_type.as_deref().unwrap_or("unknown")
        ))),
    }
}

pub async fn get_repository(
    graphql: &GraphQLClient,
    params: GetRepositoryParams,
) -> Result<CallToolResult, McpError> {
    let payload = GraphQLPayload {
        query: GraphQLQuery(repository_query()),
        variables: Some(RepositoryVariable {
            owner: params.owner.clone(),
            repository_name: params.repo.clone(),
        }),
    };

    let response: RepositoryResponse = match graphql.execute("repository", payload).await {
        Ok(response) => response,
        Err(e) => return graphql_error_result("failed to get repository", e),
    };

    match response.repository {
        Some(repository) => json_result(&repository),
        None => Ok(tool_error_result(format!(
            "repository {}/{} not found",
            params.owner, params.repo
        ))),
    }
}
