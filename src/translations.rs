//! Overridable strings for tool descriptions
//!
//! A key is looked up in the environment as `GITHUB_MCP_<KEY>`, then in the
//! `github-mcp-server-config.json` file, and finally falls back to the
//! built-in default.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};

pub const TRANSLATIONS_FILE: &str = "github-mcp-server-config.json";
const ENV_PREFIX: &str = "GITHUB_MCP_";

#[derive(Clone, Debug, Default)]
pub struct Translator {
    overrides: BTreeMap<String, String>,
    used: Arc<Mutex<BTreeMap<String, String>>>,
}

impl Translator {
    /// Translator reading overrides from `github-mcp-server-config.json` in the
    /// working directory, when present
    pub fn load() -> Result<Self> {
        Self::from_file(Path::new(TRANSLATIONS_FILE))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read translations from {}", path.display()))?;
        let overrides: BTreeMap<String, String> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse translations in {}", path.display()))?;
        tracing::debug!(
            "Loaded {} translation override(s) from {}",
            overrides.len(),
            path.display()
        );
        Ok(Self {
            overrides,
            used: Arc::default(),
        })
    }

    pub fn translate(&self, key: &str, default: &str) -> String {
        let key = key.to_uppercase();
        let value = std::env::var(format!("{}{}", ENV_PREFIX, key))
            .ok()
            .or_else(|| self.overrides.get(&key).cloned())
            .unwrap_or_else(|| default.to_string());

        self.used
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value.clone());
        value
    }

    /// Every key looked up so far with the value it resolved to
    pub fn used_keys(&self) -> BTreeMap<String, String> {
        self.used
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Writes all looked-up keys to `path` as pretty JSON
    pub fn export(&self, path: &Path) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(&self.used_keys())?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write translations to {}", path.display()))?;
        Ok(path.to_path_buf())
    }
}
