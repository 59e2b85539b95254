//! Tools for discovering and enabling toolsets at runtime

use std::sync::{PoisonError, RwLock};

use rmcp::Error as McpError;
use rmcp::model::{CallToolResult, Tool};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::error::{json_result, text_result, tool_error_result};
use crate::tools::tool_definition;
use crate::tools::toolsets::ToolsetGroup;
use crate::translations::Translator;

pub const LIST_AVAILABLE_TOOLSETS: &str = "list_available_toolsets";
pub const GET_TOOLSET_TOOLS: &str = "get_toolset_tools";
pub const ENABLE_TOOLSET: &str = "enable_toolset";

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListAvailableToolsetsParams {}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ToolsetParams {
    #[schemars(description = "The name of the toolset")]
    pub toolset: String,
}

#[derive(Debug, Serialize)]
struct ToolsetSummary<'a> {
    name: &'a str,
    description: &'a str,
    can_enable: bool,
    currently_enabled: bool,
}

#[derive(Debug, Serialize)]
struct ToolSummary {
    name: String,
    description: String,
    can_enable: bool,
    toolset: String,
}

pub fn dynamic_tools(translator: &Translator) -> Vec<Tool> {
    vec![
        tool_definition::<ListAvailableToolsetsParams>(
            LIST_AVAILABLE_TOOLSETS,
            translator.translate(
                "TOOL_LIST_AVAILABLE_TOOLSETS_DESCRIPTION",
                "List all toolsets this GitHub MCP server can offer, with their enabled status. Use this to find toolsets to enable for the current task",
            ),
        ),
        tool_definition::<ToolsetParams>(
            GET_TOOLSET_TOOLS,
            translator.translate(
                "TOOL_GET_TOOLSET_TOOLS_DESCRIPTION",
                "List the tools a toolset provides. Use this to decide whether enabling the toolset would help",
            ),
        ),
        tool_definition::<ToolsetParams>(
            ENABLE_TOOLSET,
            translator.translate(
                "TOOL_ENABLE_TOOLSET_DESCRIPTION",
                "Enable one of the sets of tools this GitHub MCP server provides. Call list_available_toolsets first to see what exists",
            ),
        ),
    ]
}

pub fn list_available_toolsets(toolsets: &RwLock<ToolsetGroup>) -> Result<CallToolResult, McpError> {
    let group = toolsets.read().unwrap_or_else(PoisonError::into_inner);
    let summaries: Vec<ToolsetSummary<'_>> = group
        .toolsets()
        .iter()
        .map(|t| ToolsetSummary {
            name: &t.name,
            description: &t.description,
            can_enable: true,
            currently_enabled: t.enabled,
        })
        .collect();
    json_result(&summaries)
}

pub fn get_toolset_tools(
    toolsets: &RwLock<ToolsetGroup>,
    params: ToolsetParams,
) -> Result<CallToolResult, McpError> {
    let group = toolsets.read().unwrap_or_else(PoisonError::into_inner);
    let Some(toolset) = group.toolset(&params.toolset) else {
        return Ok(tool_error_result(format!(
            "toolset '{}' not found",
            params.toolset
        )));
    };

    let tools: Vec<ToolSummary> = toolset
        .tools(group.read_only())
        .into_iter()
        .map(|tool| ToolSummary {
            name: tool.name.to_string(),
            description: tool.description.to_string(),
            can_enable: true,
            toolset: toolset.name.clone(),
        })
        .collect();
    json_result(&tools)
}

pub fn enable_toolset(
    toolsets: &RwLock<ToolsetGroup>,
    params: ToolsetParams,
) -> Result<CallToolResult, McpError> {
    let mut group = toolsets.write().unwrap_or_else(PoisonError::into_inner);
    if group.is_enabled(&params.toolset) {
        return Ok(text_result(format!(
            "Toolset {} is already enabled",
            params.toolset
        )));
    }

    match group.enable_toolset(&params.toolset) {
        Ok(()) => Ok(text_result(format!(
            "Toolset {} enabled",
            params.toolset
        ))),
        Err(e) => Ok(tool_error_result(e.to_string())),
    }
}
