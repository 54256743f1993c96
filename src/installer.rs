// installer.rs - Tool installer
// Purpose: Download the latest ProjectDiscovery release zip for this platform,
//          unpack it into the tools directory and mark the binary executable

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::config::Config;
use crate::tools::{RELEASE_OWNER, Tool};

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("invalid operating system: {0}")]
    UnsupportedOs(String),
    #[error("invalid system architecture: {0}")]
    UnsupportedArch(String),
    #[error("release metadata for {0} has no tag_name")]
    MissingTag(String),
    #[error("invalid tool specification: {0}")]
    InvalidToolSpec(String),
    #[error("unexpected HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },
}

/// Host OS name → release artifact OS name
const OS_TABLE: &[(&str, &str)] = &[
    ("linux", "linux"),
    ("Linux", "linux"),
    ("macos", "macOS"),
    ("Darwin", "macOS"),
    ("windows", "windows"),
    ("Windows", "windows"),
];

/// Host CPU name → release artifact architecture name
const ARCH_TABLE: &[(&str, &str)] = &[
    // x86
    ("x86", "386"),
    ("i386", "386"),
    ("i686", "386"),
    // x64
    ("x86_64", "amd64"),
    ("AMD64", "amd64"),
    // ARM64
    ("aarch64", "arm64"),
    ("arm64", "arm64"),
    ("ARM64", "arm64"),
];

/// Files shipped inside release zips that are not needed
const BUNDLED_EXTRAS: &[&str] = &["README.md", "LICENSE.md"];

pub fn lookup_os(raw: &str) -> Result<&'static str, InstallError> {
    OS_TABLE
        .iter()
        .find(|(host, _)| *host == raw)
        .map(|(_, name)| *name)
        .ok_or_else(|| InstallError::UnsupportedOs(raw.to_string()))
}

pub fn lookup_arch(raw: &str) -> Result<&'static str, InstallError> {
    ARCH_TABLE
        .iter()
        .find(|(host, _)| *host == raw)
        .map(|(_, name)| *name)
        .ok_or_else(|| InstallError::UnsupportedArch(raw.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: &'static str,
    pub arch: &'static str,
}

impl Platform {
    pub fn from_host(os: &str, arch: &str) -> Result<Self, InstallError> {
        Ok(Self {
            os: lookup_os(os)?,
            arch: lookup_arch(arch)?,
        })
    }

    pub fn detect() -> Result<Self, InstallError> {
        Self::from_host(std::env::consts::OS, std::env::consts::ARCH)
    }
}

#[derive(Deserialize)]
struct Release {
    tag_name: Option<String>,
}

/// `v1.1.1` → `1.1.1`
pub fn strip_version_prefix(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

/// Extract the version from a `releases/latest` response body
pub fn parse_release_version(tool: Tool, body: &str) -> Result<String> {
    let release: Release = serde_json::from_str(body)
        .with_context(|| format!("Invalid release metadata for {}", tool))?;
    let tag = release
        .tag_name
        .ok_or_else(|| InstallError::MissingTag(tool.name().to_string()))?;
    Ok(strip_version_prefix(&tag).to_string())
}

pub fn release_api_url(config: &Config, tool: Tool) -> String {
    format!(
        "{}/repos/{}/{}/releases/latest",
        config.api_base.trim_end_matches('/'),
        RELEASE_OWNER,
        tool
    )
}

/// e.g. `https://github.com/projectdiscovery/naabu/releases/download/v2.1.1/naabu_2.1.1_linux_amd64.zip`
pub fn download_url(config: &Config, tool: Tool, version: &str, platform: Platform) -> String {
    format!(
        "{}/{}/{}/releases/download/v{}/{}",
        config.download_base.trim_end_matches('/'),
        RELEASE_OWNER,
        tool,
        version,
        artifact_name(tool, version, platform)
    )
}

fn artifact_name(tool: Tool, version: &str, platform: Platform) -> String {
    format!("{}_{}_{}_{}.zip", tool, version, platform.os, platform.arch)
}

pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("discoveryx/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")
}

/// Outcome of an install pass
#[derive(Debug, Default)]
pub struct InstallSummary {
    pub installed: Vec<Tool>,
    pub skipped: Vec<Tool>,
    pub failed: Vec<(Tool, String)>,
}

impl InstallSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Install every tool in declared order. A failing tool does not stop the others.
pub async fn install_all(config: &Config) -> Result<InstallSummary> {
    install_all_with(config, &build_client()?).await
}

pub async fn install_all_with(config: &Config, client: &Client) -> Result<InstallSummary> {
    fs::create_dir_all(&config.tool_dir).with_context(|| {
        format!("Failed to create tools directory: {}", config.tool_dir.display())
    })?;

    let mut summary = InstallSummary::default();

    for tool in Tool::ALL {
        if config.tool_path(tool).is_file() {
            summary.skipped.push(tool);
            continue;
        }

        match install_one(config, client, tool).await {
            Ok(()) => summary.installed.push(tool),
            Err(e) => {
                error!("{} download exception: {:#}", tool, e);
                summary.failed.push((tool, format!("{:#}", e)));
            }
        }
    }

    if !summary.is_success() {
        let names: Vec<&str> = summary.failed.iter().map(|(tool, _)| tool.name()).collect();
        error!("Setup failed for: {}", names.join(", "));
    }

    Ok(summary)
}

/// Install a single tool unless its executable is already in place
pub async fn install_one(config: &Config, client: &Client, tool: Tool) -> Result<()> {
    let exe_path = config.tool_path(tool);
    if exe_path.is_file() {
        return Ok(());
    }

    if let Some(note) = tool.spec().prerequisite {
        warn!("{}", note);
    }

    let platform = Platform::detect()?;
    let version = latest_version(config, client, tool)
        .await
        .with_context(|| format!("Failed to retrieve latest version for: {}", tool))?;

    let url = download_url(config, tool, &version, platform);
    let archive = config.tool_dir.join(format!("{}.zip", tool));

    info!("Downloading: '{}'", tool);
    let installed = async {
        download_archive(client, &url, &archive, &artifact_name(tool, &version, platform)).await?;
        unpack(&archive, &config.tool_dir)?;
        make_executable(&exe_path)
    }
    .await;

    // The zip and bundled docs never outlive an attempt, successful or not
    remove_extras(&config.tool_dir, tool);
    installed
}

async fn latest_version(config: &Config, client: &Client, tool: Tool) -> Result<String> {
    let url = release_api_url(config, tool);
    let mut request = client
        .get(&url)
        .header(header::ACCEPT, "application/vnd.github+json");

    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        if !token.is_empty() {
            request = request.bearer_auth(token);
        }
    }

    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(InstallError::HttpStatus {
            status: response.status().as_u16(),
            url,
        }
        .into());
    }

    let body = response.text().await?;
    parse_release_version(tool, &body)
}

async fn download_archive(client: &Client, url: &str, dest: &Path, artifact: &str) -> Result<()> {
    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Request failed: {}", url))?;

    if response.status() == StatusCode::NOT_FOUND {
        return Err(InstallError::InvalidToolSpec(artifact.trim_end_matches(".zip").to_string()).into());
    }
    if !response.status().is_success() {
        return Err(InstallError::HttpStatus {
            status: response.status().as_u16(),
            url: url.to_string(),
        }
        .into());
    }

    let progress = match response.content_length() {
        Some(total) => {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::with_template(
                    "{msg} [{elapsed_precise}] {bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec})",
                )?
                .progress_chars("#>-"),
            );
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            bar.set_style(ProgressStyle::with_template("{spinner} {msg} {bytes}")?);
            bar
        }
    };
    progress.set_message(artifact.to_string());

    let mut file = tokio::fs::File::create(dest)
        .await
        .with_context(|| format!("Failed to create {}", dest.display()))?;

    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        progress.inc(chunk.len() as u64);
    }
    file.flush().await?;
    progress.finish_and_clear();

    Ok(())
}

/// Extract a release zip into `dir`
pub fn unpack(archive: &Path, dir: &Path) -> Result<()> {
    let file = File::open(archive).with_context(|| format!("Failed to open {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("Invalid zip archive: {}", archive.display()))?;
    zip.extract(dir)
        .with_context(|| format!("Failed to extract {}", archive.display()))?;
    Ok(())
}

/// Remove the downloaded zip and bundled README/LICENSE, ignoring absent files
pub fn remove_extras(dir: &Path, tool: Tool) {
    let archive = format!("{}.zip", tool);
    let leftovers: Vec<PathBuf> = std::iter::once(archive.as_str())
        .chain(BUNDLED_EXTRAS.iter().copied())
        .map(|name| dir.join(name))
        .collect();

    for path in leftovers {
        let _ = fs::remove_file(path);
    }
}

#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path)
        .with_context(|| format!("Extracted archive has no {}", path.display()))?;
    let mut permissions = metadata.permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(path, permissions)
        .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
    Ok(())
}

#[cfg(not(unix))]
pub fn make_executable(path: &Path) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!("Extracted archive has no {}", path.display());
    }
    Ok(())
}
