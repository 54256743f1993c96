// inventory.rs - Tool presence checks
// Purpose: Read-only check of the tools directory (native) or the container runtime (docker)

use log::{error, warn};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::tools::{ExecMode, Tool};

/// Readiness of one tool
#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub tool: Tool,
    pub path: PathBuf,
    pub present: bool,
}

/// Per-tool readiness, in declared order
pub fn inventory(config: &Config) -> Vec<ToolStatus> {
    Tool::ALL
        .iter()
        .map(|&tool| {
            let path = config.tool_path(tool);
            let present = path.is_file();
            ToolStatus { tool, path, present }
        })
        .collect()
}

/// True when every tool needed for `mode` is available
pub fn all_present(config: &Config, mode: ExecMode) -> bool {
    match mode {
        ExecMode::Native => native_tools_present(config),
        ExecMode::Docker => {
            if find_on_path("docker").is_none() {
                error!("docker is not installed");
                warn!("Install docker before rerunning discoveryx");
                return false;
            }
            true
        }
    }
}

fn native_tools_present(config: &Config) -> bool {
    if !config.tool_dir.is_dir() {
        error!("discoveryx tools directory does not exist");
        warn!("Rerun discoveryx with the '--setup' flag");
        return false;
    }

    let mut valid = true;
    for status in inventory(config) {
        if !status.present {
            error!("{} does not exist", status.path.display());
            valid = false;
        }
    }

    if !valid {
        error!("discoveryx tools are missing");
        warn!("Rerun discoveryx with the '--setup' flag");
    }

    valid
}

/// Search `PATH` for an executable
pub fn find_on_path(binary: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    find_in_dirs(binary, &path_var)
}

/// Search a `PATH`-style list of directories for an executable
pub fn find_in_dirs(binary: &str, path_var: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(path_var) {
        let candidate = dir.join(binary);
        if is_executable(&candidate) {
            return Some(candidate);
        }

        #[cfg(windows)]
        {
            let candidate = dir.join(format!("{}.exe", binary));
            if is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }

    None
}

fn is_executable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .map(|metadata| metadata.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn populate(config: &Config, tools: &[Tool]) {
        fs::create_dir_all(&config.tool_dir).unwrap();
        for tool in tools {
            fs::write(config.tool_path(*tool), b"").unwrap();
        }
    }

    #[test]
    fn test_missing_tools_directory() {
        let home = TempDir::new().unwrap();
        let config = Config::from_home(home.path());
        assert!(!all_present(&config, ExecMode::Native));
    }

    #[test]
    fn test_partial_install_is_not_ready() {
        let home = TempDir::new().unwrap();
        let config = Config::from_home(home.path());
        populate(&config, &[Tool::Subfinder, Tool::Dnsx, Tool::Httpx]);

        assert!(!all_present(&config, ExecMode::Native));

        let missing: Vec<Tool> = inventory(&config)
            .into_iter()
            .filter(|status| !status.present)
            .map(|status| status.tool)
            .collect();
        assert_eq!(missing, vec![Tool::Naabu, Tool::Katana, Tool::Nuclei]);
    }

    #[test]
    fn test_all_tools_present() {
        let home = TempDir::new().unwrap();
        let config = Config::from_home(home.path());
        populate(&config, &Tool::ALL);
        assert!(all_present(&config, ExecMode::Native));
    }

    #[test]
    fn test_directory_named_like_tool_does_not_count() {
        let home = TempDir::new().unwrap();
        let config = Config::from_home(home.path());
        populate(&config, &Tool::ALL[1..]);
        fs::create_dir_all(config.tool_path(Tool::Subfinder)).unwrap();
        assert!(!all_present(&config, ExecMode::Native));
    }

    #[cfg(unix)]
    #[test]
    fn test_find_in_dirs_requires_exec_bit() {
        use std::os::unix::fs::PermissionsExt;

        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();

        let plain = first.path().join("docker");
        fs::write(&plain, b"").unwrap();

        let runnable = second.path().join("docker");
        fs::write(&runnable, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&runnable, fs::Permissions::from_mode(0o755)).unwrap();

        let path_var = std::env::join_paths([first.path(), second.path()]).unwrap();
        assert_eq!(find_in_dirs("docker", &path_var), Some(runnable));
        assert_eq!(find_in_dirs("podman", &path_var), None);
    }
}
