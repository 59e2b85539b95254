//! MCP (Model Context Protocol) server exposing GitHub as tools
//!
//! [`GitHubMcpServer`] implements the rmcp server handler. It wires the two
//! lifecycle hooks into the protocol methods, filters the tool list through
//! the toolset registry and dispatches tool calls to the functions in
//! [`functions`], each running with its own GitHub error store.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use rmcp::model::*;
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{Error as McpError, ServerHandler};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::config::ServerConfig;
use crate::error_store::{ErrorStore, with_github_errors};
use crate::github::GitHubClients;
use crate::github::client::SERVER_NAME;
use crate::hooks::LifecycleHooks;
use crate::tools::toolsets::{ALL_TOOLSETS, Toolset, ToolsetError, ToolsetGroup};
use crate::translations::Translator;

/// Conversions from GitHub failures to tool results
pub mod error;

/// Tool function implementations organized by toolset
pub mod functions;

/// Toolset registry
pub mod toolsets;

/// Toolset that stays enabled in dynamic mode
const CONTEXT_TOOLSET: &str = "context";

/// Builds a tool whose input schema is generated from `P`
pub(crate) fn tool_definition<P: JsonSchema>(name: &'static str, description: String) -> Tool {
    let schema = schemars::schema_for!(P);
    let input_schema = match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => JsonObject::new(),
    };
    Tool::new(name, description, Arc::new(input_schema))
}

/// The toolsets this server ships, none of them enabled yet
pub fn default_toolset_group(translator: &Translator, read_only: bool) -> ToolsetGroup {
    use functions::{context, issues, repos};

    let mut group = ToolsetGroup::new(read_only);
    group.add_toolset(
        Toolset::new(
            CONTEXT_TOOLSET,
            translator.translate(
                "TOOLSET_CONTEXT_DESCRIPTION",
                "Tools that provide context about the current user and GitHub context you are operating in",
            ),
        )
        .with_read_tools([context::get_me_tool(translator)]),
    );
    group.add_toolset(
        Toolset::new(
            "repos",
            translator.translate("TOOLSET_REPOS_DESCRIPTION", "GitHub Repository related tools"),
        )
        .with_read_tools([
            repos::get_file_contents_tool(translator),
            repos::get_repository_tool(translator),
        ]),
    );
    group.add_toolset(
        Toolset::new(
            "issues",
            translator.translate("TOOLSET_ISSUES_DESCRIPTION", "GitHub Issues related tools"),
        )
        .with_read_tools([issues::get_issue_tool(translator)])
        .with_write_tools([
            issues::create_issue_tool(translator),
            issues::add_issue_comment_tool(translator),
        ]),
    );
    group
}

fn parse_params<P: DeserializeOwned>(arguments: Option<JsonObject>) -> Result<P, McpError> {
    serde_json::from_value(serde_json::Value::Object(arguments.unwrap_or_default()))
        .map_err(|e| McpError::invalid_params(format!("Invalid tool arguments: {}", e), None))
}

/// GitHub MCP server state shared by every request
#[derive(Clone)]
pub struct GitHubMcpServer {
    version: String,
    clients: GitHubClients,
    hooks: LifecycleHooks,
    toolsets: Arc<RwLock<ToolsetGroup>>,
    dynamic_tools: Vec<Tool>,
}

impl GitHubMcpServer {
    /// Registers the toolsets and enables the ones named in `config`.
    ///
    /// In dynamic mode `all` is ignored, only the context toolset starts
    /// enabled, and the toolset discovery tools are exposed.
    pub fn new(config: &ServerConfig, clients: GitHubClients) -> Result<Self, ToolsetError> {
        let translator = &config.translator;
        let mut group = default_toolset_group(translator, config.read_only);

        let dynamic_tools = if config.dynamic_toolsets {
            let names: Vec<String> = config
                .enabled_toolsets
                .iter()
                .filter(|name| *name != ALL_TOOLSETS)
                .cloned()
                .collect();
            group.enable_toolsets(&names)?;
            group.enable_toolset(CONTEXT_TOOLSET)?;
            functions::dynamic::dynamic_tools(translator)
        } else {
            group.enable_toolsets(&config.enabled_toolsets)?;
            Vec::new()
        };

        let hooks = LifecycleHooks::new(config.version.clone(), clients.user_agent.clone());

        Ok(Self {
            version: config.version.clone(),
            clients,
            hooks,
            toolsets: Arc::new(RwLock::new(group)),
            dynamic_tools,
        })
    }

    pub fn clients(&self) -> &GitHubClients {
        &self.clients
    }

    /// Tools currently offered to the client
    pub fn available_tools(&self) -> Vec<Tool> {
        let mut tools = self.dynamic_tools.clone();
        tools.extend(
            self.toolsets
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .available_tools(),
        );
        tools
    }

    fn is_tool_available(&self, name: &str) -> bool {
        self.dynamic_tools.iter().any(|tool| tool.name == name)
            || self
                .toolsets
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .is_tool_available(name)
    }

    /// Runs `future` as the body of a `method` request, with the fresh error
    /// store from the per-request hook in scope. Returns the store with the
    /// output so the caller can inspect what was recorded.
    pub async fn with_request_scope<F: Future>(
        &self,
        method: &str,
        future: F,
    ) -> (F::Output, ErrorStore) {
        let store = self.hooks.on_before_any(method);
        let output = with_github_errors(store.clone(), future).await;
        (output, store)
    }

    /// Runs a tool call in its own request scope and reports what the handler
    /// recorded once it has finished.
    pub async fn handle_tool_call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let (result, store) = self
            .with_request_scope("tools/call", self.dispatch(name, arguments))
            .await;
        report_github_errors(name, &store);
        result
    }

    /// Tool listing for a `tools/list` request
    pub async fn handle_list_tools(&self) -> ListToolsResult {
        let (tools, _) = self
            .with_request_scope("tools/list", async { self.available_tools() })
            .await;
        ListToolsResult {
            next_cursor: None,
            tools,
        }
    }

    /// Invokes the named tool. GitHub failures are recorded in whatever error
    /// store is in scope.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        use functions::{context, dynamic, issues, repos};

        if !self.is_tool_available(name) {
            return Err(McpError::invalid_params(
                format!("Tool '{}' is not available", name),
                None,
            ));
        }

        tracing::debug!("Calling tool '{}'", name);
        match name {
            "get_me" => context::get_me(&self.clients.rest).await,
            "get_file_contents" => {
                repos::get_file_contents(&self.clients.raw, parse_params(arguments)?).await
            }
            "get_repository" => {
                repos::get_repository(&self.clients.graphql, parse_params(arguments)?).await
            }
            "get_issue" => issues::get_issue(&self.clients.rest, parse_params(arguments)?).await,
            "create_issue" => {
                issues::create_issue(&self.clients.rest, parse_params(arguments)?).await
            }
            "add_issue_comment" => {
                issues::add_issue_comment(&self.clients.rest, parse_params(arguments)?).await
            }
            dynamic::LIST_AVAILABLE_TOOLSETS => dynamic::list_available_toolsets(&self.toolsets),
            dynamic::GET_TOOLSET_TOOLS => {
                dynamic::get_toolset_tools(&self.toolsets, parse_params(arguments)?)
            }
            dynamic::ENABLE_TOOLSET => {
                dynamic::enable_toolset(&self.toolsets, parse_params(arguments)?)
            }
            other => Err(McpError::internal_error(
                format!("Tool '{}' has no handler", other),
                None,
            )),
        }
    }
}

/// Logs the GitHub failures a tool call recorded
fn report_github_errors(tool: &str, store: &ErrorStore) {
    if store.is_empty() {
        return;
    }
    for error in store.api_errors() {
        tracing::warn!("Tool '{}' GitHub API error: {}", tool, error);
    }
    for error in store.graphql_errors() {
        tracing::warn!("Tool '{}' GitHub GraphQL error: {}", tool, error);
    }
}

impl ServerHandler for GitHubMcpServer {
    async fn initialize(
        &self,
        request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, McpError> {
        let (info, _) = self
            .with_request_scope("initialize", async {
                self.hooks
                    .on_before_initialize(&request.client_info.name, &request.client_info.version);
                self.get_info()
            })
            .await;
        Ok(info)
    }

    async fn list_tools(
        &self,
        _request: PaginatedRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(self.handle_list_tools().await)
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.handle_tool_call(&request.name, request.arguments).await
    }

    fn get_info(&self) -> ServerInfo {
        let read_only = self
            .toolsets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .read_only();
        let mode = if read_only { "read-only" } else { "read-write" };

        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: self.version.clone(),
            },
            instructions: Some(format!(
                "GitHub MCP Server ({}). Tools are grouped into toolsets (context, repos, issues); \
                 only enabled toolsets are listed.",
                mode
            )),
        }
    }
}
