// runner.rs - Stage runner
// Purpose: Run one pipeline segment `<stdin> | <tool> <flags> > <tool>.txt 2>&1`
//          through the shell and report whether it exited cleanly

use anyhow::{Context, Result};
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

use crate::config::Config;
use crate::tools::{ExecMode, Tool};

/// Curated common HTTP ports for naabu
const COMMON_HTTP_PORTS: &str = include_str!("../resc/common-http-ports.txt");

/// Mount point of the output directory inside containers
const CONTAINER_OUTPUT_DIR: &str = "/output";

/// Comma-separated port list for naabu's `-p`
pub fn common_http_ports() -> String {
    COMMON_HTTP_PORTS
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(unix)]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(windows)]
pub fn shell_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn quote_path(path: &Path) -> String {
    shell_quote(&path.to_string_lossy())
}

/// Shell command printing a file to stdout
pub fn cat_command(path: &Path) -> String {
    if cfg!(windows) {
        format!("type {}", quote_path(path))
    } else {
        format!("cat {}", quote_path(path))
    }
}

/// Shell command printing each literal target on its own line
pub fn echo_command(targets: &[String]) -> String {
    if cfg!(windows) {
        let parts: Vec<String> = targets.iter().map(|t| format!("echo {}", t)).collect();
        format!("({})", parts.join("& "))
    } else {
        let quoted: Vec<String> = targets.iter().map(|t| shell_quote(t)).collect();
        format!("printf '%s\\n' {}", quoted.join(" "))
    }
}

/// Executable prefix for `tool`: a local binary or a `docker run` invocation
pub fn executable(config: &Config, tool: Tool, mode: ExecMode, out_dir: &Path) -> Result<String> {
    match mode {
        ExecMode::Native => Ok(quote_path(&config.tool_path(tool))),
        ExecMode::Docker => {
            let image = tool.docker_image(&config.docker_tag);
            if tool.spec().side_file.is_none() {
                return Ok(format!("docker run --rm -i {}", image));
            }

            let host_dir = std::path::absolute(out_dir)
                .with_context(|| format!("Failed to resolve {}", out_dir.display()))?;
            let mount = format!("{}:{}", host_dir.to_string_lossy(), CONTAINER_OUTPUT_DIR);
            Ok(format!("docker run --rm -i -v {} {}", shell_quote(&mount), image))
        }
    }
}

/// Fixed flags for `tool`; side files are written under `side_dir`
pub fn tool_flags(tool: Tool, side_dir: &str) -> Vec<String> {
    let spec = tool.spec();
    let mut flags: Vec<String> = spec.flags.iter().map(|f| f.to_string()).collect();

    if spec.http_ports {
        flags.push("-p".to_string());
        flags.push(common_http_ports());
    }

    if let Some(side) = spec.side_file {
        let side_path = format!("{}/{}", side_dir.trim_end_matches(['/', '\\']), side.file_name);
        flags.push(side.flag.to_string());
        flags.push(shell_quote(&side_path));
    }

    flags
}

/// Build the full pipeline string and the path its output lands in
pub fn build_pipeline(
    config: &Config,
    tool: Tool,
    stdin: &str,
    out_dir: &Path,
    mode: ExecMode,
) -> Result<(String, PathBuf)> {
    let output_file = out_dir.join(tool.output_file_name());

    let side_dir = match mode {
        ExecMode::Native => out_dir.to_string_lossy().to_string(),
        ExecMode::Docker => CONTAINER_OUTPUT_DIR.to_string(),
    };

    let command = format!(
        "{} | {} {} > {} 2>&1",
        stdin,
        executable(config, tool, mode, out_dir)?,
        tool_flags(tool, &side_dir).join(" "),
        quote_path(&output_file)
    );

    Ok((command, output_file))
}

/// Run a command line through the platform shell, waiting for it to exit
pub async fn exec_shell_command(command: &str) -> std::io::Result<ExitStatus> {
    let mut shell = if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C");
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c");
        cmd
    };

    shell
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
}

/// Run one stage. `Ok` carries the output file when the pipeline exited 0.
pub async fn run(
    config: &Config,
    tool: Tool,
    stdin: &str,
    out_dir: &Path,
    mode: ExecMode,
) -> Result<PathBuf> {
    let (command, output_file) = build_pipeline(config, tool, stdin, out_dir, mode)?;

    info!("Running '{}'", tool);
    debug!("{}", command);

    match exec_shell_command(&command).await {
        Ok(status) if status.success() => Ok(output_file),
        Ok(status) => anyhow::bail!("'{}' exited with {}", tool, status),
        Err(e) => {
            error!("Command Exception: {}", e);
            Err(e).with_context(|| format!("Failed to spawn shell for '{}'", tool))
        }
    }
}
