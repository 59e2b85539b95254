/// Server configuration assembled from command line flags and environment
pub mod config;

/// Per-request store of GitHub API failures for later inspection
pub mod error_store;

/// GitHub host resolution, transport chain and API clients
pub mod github;

/// Handshake and per-request hooks fired by the MCP server handler
pub mod hooks;

/// MCP tool implementations exposing GitHub through the protocol
pub mod tools;

/// Overridable tool and toolset descriptions
pub mod translations;

/// Transport layer and process lifecycle for the stdio server
pub mod transport;
