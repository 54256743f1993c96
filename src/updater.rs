// updater.rs - Tool updater
// Purpose: Wipe the tools directory and reinstall every tool from the latest releases.
// TODO: record installed versions in the tools directory so update only replaces
//       tools whose latest release tag changed.

use anyhow::{Context, Result};
use log::info;
use reqwest::Client;
use std::fs;

use crate::config::Config;
use crate::installer::{self, InstallSummary};

/// Delete the tools directory. Returns whether anything was removed.
pub fn wipe_tools_dir(config: &Config) -> Result<bool> {
    if !config.tool_dir.is_dir() {
        return Ok(false);
    }

    info!("Removing previous tool installs");
    fs::remove_dir_all(&config.tool_dir).with_context(|| {
        format!("Failed to remove tools directory: {}", config.tool_dir.display())
    })?;
    Ok(true)
}

pub async fn update_all(config: &Config) -> Result<InstallSummary> {
    update_all_with(config, &installer::build_client()?).await
}

pub async fn update_all_with(config: &Config, client: &Client) -> Result<InstallSummary> {
    wipe_tools_dir(config)?;
    installer::install_all_with(config, client).await
}
