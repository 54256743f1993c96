// config.rs - Runtime configuration
// Purpose: Home, tools and output directories plus release endpoints, passed to every component

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};

use crate::tools::Tool;

/// Environment override for the home directory
pub const HOME_ENV: &str = "DISCOVERYX_HOME";

/// Format of the per-run output directory name
pub const RUN_DIR_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Paths and endpoints shared by every component
#[derive(Clone, Debug)]
pub struct Config {
    pub home: PathBuf,
    /// Where native executables live (`<home>/.discoveryx/tools`)
    pub tool_dir: PathBuf,
    /// Parent of the timestamped run directories
    pub output_root: PathBuf,
    /// Release metadata API (`/repos/<owner>/<tool>/releases/latest`)
    pub api_base: String,
    /// Release artifact host
    pub download_base: String,
    pub docker_tag: String,
}

impl Config {
    pub fn from_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let tool_dir = home.join(".discoveryx").join("tools");
        Self {
            home,
            tool_dir,
            output_root: PathBuf::from("output"),
            api_base: "https://api.github.com".to_string(),
            download_base: "https://github.com".to_string(),
            docker_tag: "latest".to_string(),
        }
    }

    /// Home from `DISCOVERYX_HOME`, falling back to the user's home directory
    pub fn resolve() -> Result<Self> {
        let home = match std::env::var_os(HOME_ENV) {
            Some(value) if !value.is_empty() => PathBuf::from(value),
            _ => dirs::home_dir().context("Unable to determine home directory")?,
        };
        Ok(Self::from_home(home))
    }

    pub fn with_output_root(mut self, root: impl AsRef<Path>) -> Self {
        self.output_root = root.as_ref().to_path_buf();
        self
    }

    pub fn tool_path(&self, tool: Tool) -> PathBuf {
        self.tool_dir.join(tool.executable_name())
    }

    pub fn run_output_dir<Tz: TimeZone>(&self, now: DateTime<Tz>) -> PathBuf
    where
        Tz::Offset: std::fmt::Display,
    {
        self.output_root.join(now.format(RUN_DIR_FORMAT).to_string())
    }
}
