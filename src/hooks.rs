//! Lifecycle hooks invoked by the MCP server handler

use crate::error_store::ErrorStore;
use crate::github::client::client_user_agent;
use crate::github::transport::UserAgent;

/// The two hook points the server handler fires: once at the client
/// handshake, and before every inbound request.
#[derive(Clone, Debug)]
pub struct LifecycleHooks {
    version: String,
    user_agent: UserAgent,
}

impl LifecycleHooks {
    pub fn new(version: impl Into<String>, user_agent: UserAgent) -> Self {
        Self {
            version: version.into(),
            user_agent,
        }
    }

    /// Finalises the user agent from the client's identity.
    ///
    /// Every client shares the same [`UserAgent`] cell, so REST, GraphQL and raw
    /// content requests all pick up the new value. A second call simply
    /// overwrites it. A value that is not a valid header leaves the previous
    /// one in place.
    pub fn on_before_initialize(&self, client_name: &str, client_version: &str) {
        let agent = client_user_agent(&self.version, client_name, client_version);
        match self.user_agent.set(&agent) {
            Ok(()) => tracing::info!("Client connected, using user agent '{}'", agent),
            Err(e) => tracing::warn!("Keeping user agent '{}': {}", self.user_agent.get(), e),
        }
    }

    /// Hands out a fresh error store for the request about to be dispatched
    pub fn on_before_any(&self, method: &str) -> ErrorStore {
        tracing::trace!("Dispatching '{}' with a fresh error store", method);
        ErrorStore::new()
    }
}
