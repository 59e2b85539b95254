use rmcp::Error as McpError;
use rmcp::model::{CallToolResult, Tool};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::github::RestClient;
use crate::tools::error::{api_error_result, json_result};
use crate::tools::tool_definition;
use crate::translations::Translator;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GetMeParams {}

pub fn get_me_tool(translator: &Translator) -> Tool {
    tool_definition::<GetMeParams>(
        "get_me",
        translator.translate(
            "TOOL_GET_ME_DESCRIPTION",
            "Get details of the authenticated GitHub user. Use this when a request includes \"me\", \"my\", or asks about the current user.",
        ),
    )
}

/// Returns the authenticated user as JSON
pub async fn get_me(rest: &RestClient) -> Result<CallToolResult, McpError> {
    match rest.get::<serde_json::Value>(&["user"]).await {
        Ok(user) => json_result(&user),
        Err(e) => api_error_result("failed to get user", e),
    }
}
