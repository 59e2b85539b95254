use rmcp::Error as McpError;
use rmcp::model::{CallToolResult, Tool};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::github::RestClient;
use crate::tools::error::{api_error_result, json_result, tool_error_result};
use crate::tools::tool_definition;
use crate::translations::Translator;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetIssueParams {
    #[schemars(description = "Repository owner")]
    pub owner: String,
    #[schemars(description = "Repository name")]
    pub repo: String,
    #[schemars(description = "Issue number")]
    pub issue_number: u64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateIssueParams {
    #[schemars(description = "Repository owner")]
    pub owner: String,
    #[schemars(description = "Repository name")]
    pub repo: String,
    #[schemars(description = "Issue title")]
    pub title: String,
    #[serde(default)]
    #[schemars(description = "Issue body content")]
    pub body: Option<String>,
    #[serde(default)]
    #[schemars(description = "Labels to apply to this issue")]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    #[schemars(description = "Usernames to assign to this issue")]
    pub assignees: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddIssueCommentParams {
    #[schemars(description = "Repository owner")]
    pub owner: String,
    #[schemars(description = "Repository name")]
    pub repo: String,
    #[schemars(description = "Issue number to comment on")]
    pub issue_number: u64,
    #[schemars(description = "Comment text")]
    pub body: String,
}

#[derive(Debug, Serialize)]
struct NewIssue<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignees: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
struct NewComment<'a> {
    body: &'a str,
}

pub fn get_issue_tool(translator: &Translator) -> Tool {
    tool_definition::<GetIssueParams>(
        "get_issue",
        translator.translate(
            "TOOL_GET_ISSUE_DESCRIPTION",
            "Get details of a specific issue in a GitHub repository",
        ),
    )
}

pub fn create_issue_tool(translator: &Translator) -> Tool {
    tool_definition::<CreateIssueParams>(
        "create_issue",
        translator.translate(
            "TOOL_CREATE_ISSUE_DESCRIPTION",
            "Create a new issue in a GitHub repository",
        ),
    )
}

pub fn add_issue_comment_tool(translator: &Translator) -> Tool {
    tool_definition::<AddIssueCommentParams>(
        "add_issue_comment",
        translator.translate(
            "TOOL_ADD_ISSUE_COMMENT_DESCRIPTION",
            "Add a comment to an existing issue",
        ),
    )
}

pub async fn get_issue(rest: &RestClient, params: GetIssueParams) -> Result<CallToolResult, McpError> {
    let number = params.issue_number.to_string();
    let path = [
        "repos",
        params.owner.as_str(),
        params.repo.as_str(),
        "issues",
        number.as_str(),
    ];
    match rest.get::<serde_json::Value>(&path).await {
        Ok(issue) => json_result(&issue),
        Err(e) => api_error_result("failed to get issue", e),
    }
}

pub async fn create_issue(
    rest: &RestClient,
    params: CreateIssueParams,
) -> Result<CallToolResult, McpError> {
    if params.title.trim().is_empty() {
        return Ok(tool_error_result("title must not be empty"));
    }

    let path = ["repos", params.owner.as_str(), params.repo.as_str(), "issues"];
    let new_issue = NewIssue {
        title: &params.title,
        body: params.body.as_deref(),
        labels: params.labels.as_deref(),
        assignees: params.assignees.as_deref(),
    };

    match rest.post::<_, serde_json::Value>(&path, &new_issue).await {
        Ok(issue) => json_result(&issue),
        Err(e) => api_error_result("failed to create issue", e),
    }
}

pub async fn add_issue_comment(
    rest: &RestClient,
    params: AddIssueCommentParams,
) -> Result<CallToolResult, McpError> {
    if params.body.trim().is_empty() {
        return Ok(tool_error_result("comment body must not be empty"));
    }

    let number = params.issue_number.to_string();
    let path = [
        "repos",
        params.owner.as_str(),
        params.repo.as_str(),
        "issues",
        number.as_str(),
        "comments",
    ];
    let comment = NewComment { body: &params.body };

    match rest.post::<_, serde_json::Value>(&path, &comment).await {
        Ok(comment) => json_result(&comment),
        Err(e) => api_error_result("failed to create comment", e),
    }
}
