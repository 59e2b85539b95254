//! Registry of toolsets that can be switched on at startup or at runtime

use rmcp::model::Tool;
use thiserror::Error;

/// Name that enables every toolset at once
pub const ALL_TOOLSETS: &str = "all";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolsetError {
    #[error("toolset '{0}' does not exist")]
    UnknownToolset(String),
}

/// A named group of related tools
#[derive(Debug, Clone)]
pub struct Toolset {
    pub name: String,
    pub description: String,
    pub enabled: bool,
    read_tools: Vec<Tool>,
    write_tools: Vec<Tool>,
}

impl Toolset {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            enabled: false,
            read_tools: Vec::new(),
            write_tools: Vec::new(),
        }
    }

    pub fn with_read_tools(mut self, tools: impl IntoIterator<Item = Tool>) -> Self {
        self.read_tools.extend(tools);
        self
    }

    pub fn with_write_tools(mut self, tools: impl IntoIterator<Item = Tool>) -> Self {
        self.write_tools.extend(tools);
        self
    }

    /// Tools this toolset exposes; write tools are left out in read-only mode
    pub fn tools(&self, read_only: bool) -> Vec<Tool> {
        let mut tools = self.read_tools.clone();
        if !read_only {
            tools.extend(self.write_tools.iter().cloned());
        }
        tools
    }
}

/// Ordered collection of toolsets plus the server-wide enablement flags
#[derive(Debug, Clone, Default)]
pub struct ToolsetGroup {
    toolsets: Vec<Toolset>,
    everything_on: bool,
    read_only: bool,
}

impl ToolsetGroup {
    pub fn new(read_only: bool) -> Self {
        Self {
            toolsets: Vec::new(),
            everything_on: false,
            read_only,
        }
    }

    pub fn add_toolset(&mut self, toolset: Toolset) {
        self.toolsets.push(toolset);
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn everything_on(&self) -> bool {
        self.everything_on
    }

    pub fn toolsets(&self) -> &[Toolset] {
        &self.toolsets
    }

    pub fn toolset(&self, name: &str) -> Option<&Toolset> {
        self.toolsets.iter().find(|t| t.name == name)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.toolset(name).is_some_and(|t| t.enabled)
    }

    /// Enables the named toolsets. `all` enables every toolset.
    ///
    /// Stops at the first unknown name; toolsets enabled before it stay enabled.
    pub fn enable_toolsets(&mut self, names: &[String]) -> Result<(), ToolsetError> {
        for name in names {
            if name == ALL_TOOLSETS {
                self.everything_on = true;
                for toolset in &mut self.toolsets {
                    toolset.enabled = true;
                }
                continue;
            }
            self.enable_toolset(name)?;
        }
        Ok(())
    }

    pub fn enable_toolset(&mut self, name: &str) -> Result<(), ToolsetError> {
        let toolset = self
            .toolsets
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| ToolsetError::UnknownToolset(name.to_string()))?;
        toolset.enabled = true;
        tracing::info!("Enabled toolset '{}'", name);
        Ok(())
    }

    /// Tools of every enabled toolset, in registration order
    pub fn available_tools(&self) -> Vec<Tool> {
        self.toolsets
            .iter()
            .filter(|t| t.enabled)
            .flat_map(|t| t.tools(self.read_only))
            .collect()
    }

    pub fn is_tool_available(&self, tool_name: &str) -> bool {
        self.toolsets
            .iter()
            .filter(|t| t.enabled)
            .any(|t| t.tools(self.read_only).iter().any(|tool| tool.name == tool_name))
    }
}

/// Splits a comma separated toolset list, trimming blanks
pub fn parse_toolset_names(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_names() {
        assert_eq!(
            parse_toolset_names(" repos, issues ,,context"),
            vec!["repos", "issues", "context"]
        );
        assert!(parse_toolset_names("").is_empty());
    }
}
