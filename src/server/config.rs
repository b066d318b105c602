//! Process-wide server configuration.
//!
//! Both structs are built once before the listener starts; description and
//! version overrides are resolved at construction, never patched later.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::executor::Overflow;

/// Version shown in the description document when the CLI declares none.
pub const DEFAULT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    root_name: String,
    exec_path: PathBuf,
    description: String,
    version: String,
}

impl ServerConfig {
    pub fn new(root_name: impl Into<String>, exec_path: impl Into<PathBuf>) -> Self {
        Self {
            root_name: root_name.into(),
            exec_path: exec_path.into(),
            description: String::new(),
            version: DEFAULT_VERSION.to_string(),
        }
    }

    /// Root name, description (long about, else about) and version taken
    /// from the CLI definition; the currently running executable is the
    /// re-invocation target.
    pub fn from_command(cmd: &clap::Command) -> Result<Self> {
        let exec_path =
            std::env::current_exe().context("Failed to resolve the current executable")?;
        let description = cmd
            .get_long_about()
            .or_else(|| cmd.get_about())
            .map(|s| s.to_string())
            .unwrap_or_default();
        Ok(Self::new(cmd.get_name(), exec_path)
            .with_description(description)
            .with_version(cmd.get_version().map(str::to_string)))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// `None` or a blank string keeps [`DEFAULT_VERSION`].
    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());
        self
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn exec_path(&self) -> &Path {
        &self.exec_path
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Hosting-layer knobs (listener, per-request timeout, execution bound).
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub bind: String,
    pub port: u16,
    pub timeout: Duration,
    pub max_concurrent: usize,
    pub overflow: Overflow,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8000,
            timeout: Duration::from_secs(15 * 60),
            max_concurrent: 32,
            overflow: Overflow::Queue,
        }
    }
}

impl ServeOptions {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
