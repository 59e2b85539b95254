use anyhow::{Result, bail};

use crate::tools::toolsets::ALL_TOOLSETS;
use crate::translations::Translator;

/// Settings shared by every component of the server, fixed at startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Version reported in the user agent and server info
    pub version: String,
    /// GitHub host; empty means GitHub.com
    pub host: String,
    /// Personal access token sent as a bearer token
    pub token: String,
    pub enabled_toolsets: Vec<String>,
    pub dynamic_toolsets: bool,
    pub read_only: bool,
    pub translator: Translator,
}

impl ServerConfig {
    pub fn new(version: impl Into<String>, host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            host: host.into(),
            token: token.into(),
            enabled_toolsets: vec![ALL_TOOLSETS.to_string()],
            dynamic_toolsets: false,
            read_only: false,
            translator: Translator::default(),
        }
    }

    /// Rejects configurations the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            bail!("GITHUB_PERSONAL_ACCESS_TOKEN not set");
        }
        Ok(())
    }
}

/// Options of the stdio process on top of [`ServerConfig`]
#[derive(Debug, Clone)]
pub struct StdioServerConfig {
    pub server: ServerConfig,
    /// Log every byte read from stdin and written to stdout
    pub enable_command_logging: bool,
    /// Write the translation keys to the config file and exit
    pub export_translations: bool,
}
