// discover.rs - Discovery path orchestrator
// Purpose: Sequence the stage runners for a domain or address target and stop
//          as soon as a gating stage leaves no usable output
//
//   domain:  subfinder → dnsx → naabu → httpx → { katana, nuclei }
//   address:                    naabu → httpx → { katana, nuclei }

use anyhow::{Context, Result};
use log::{debug, error};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::runner;
use crate::tools::{ExecMode, Tool};

/// Name of the URL column extracted from httpx output
pub const URL_COLUMN_FILE: &str = "httpx_urls.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryPath {
    Domain,
    Address,
}

impl DiscoveryPath {
    /// Stages that must leave a non-empty file before the next one runs
    pub fn gated_stages(&self) -> &'static [Tool] {
        match self {
            DiscoveryPath::Domain => &[Tool::Subfinder, Tool::Dnsx, Tool::Naabu, Tool::Httpx],
            DiscoveryPath::Address => &[Tool::Naabu, Tool::Httpx],
        }
    }
}

/// Stages fed with the httpx URL column, independent of each other
pub const FINAL_STAGES: [Tool; 2] = [Tool::Katana, Tool::Nuclei];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every stage was attempted
    Done,
    /// The named stage failed or produced an empty file
    Aborted(Tool),
}

#[derive(Debug, Clone)]
pub struct StageRecord {
    pub tool: Tool,
    /// Set when the stage runner reported success
    pub output: Option<PathBuf>,
    pub lines: usize,
}

#[derive(Debug, Clone)]
pub struct DiscoveryReport {
    pub stages: Vec<StageRecord>,
    pub outcome: Outcome,
}

impl DiscoveryReport {
    pub fn tools_run(&self) -> Vec<Tool> {
        self.stages.iter().map(|stage| stage.tool).collect()
    }

    pub fn stage(&self, tool: Tool) -> Option<&StageRecord> {
        self.stages.iter().find(|stage| stage.tool == tool)
    }
}

/// Count lines in a file (0 when absent)
pub fn count_lines(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(reader.lines().count())
}

/// True if `path` is a regular file with at least one byte
pub fn has_data(path: &Path) -> bool {
    fs::metadata(path)
        .map(|metadata| metadata.is_file() && metadata.len() > 0)
        .unwrap_or(false)
}

/// First whitespace-delimited column of every non-blank line, newline-joined
pub fn extract_urls(httpx_output: &str) -> String {
    let mut urls = String::new();
    for url in httpx_output.lines().filter_map(|line| line.split_whitespace().next()) {
        urls.push_str(url);
        urls.push('\n');
    }
    urls
}

fn log_result_count(tool: Tool, path: &Path) -> usize {
    match count_lines(path) {
        Ok(0) => {
            debug!("{} returned no results", tool);
            0
        }
        Ok(count) => {
            debug!("{} results: {}", tool, count);
            count
        }
        Err(e) => {
            error!("File stat exception: {}", e);
            0
        }
    }
}

/// One discovery run bound to an output directory
pub struct Discovery<'a> {
    config: &'a Config,
    out_dir: &'a Path,
    mode: ExecMode,
}

impl<'a> Discovery<'a> {
    pub fn new(config: &'a Config, out_dir: &'a Path, mode: ExecMode) -> Self {
        Self { config, out_dir, mode }
    }

    /// Run the discovery path starting from `stdin`, a shell command that prints the targets
    pub async fn run(&self, stdin: &str, path: DiscoveryPath) -> DiscoveryReport {
        let mut stages = Vec::new();
        let mut stdin = stdin.to_string();

        for &tool in path.gated_stages() {
            let record = self.run_stage(tool, &stdin).await;
            let usable = record.output.as_deref().filter(|out| has_data(out)).map(Path::to_path_buf);
            stages.push(record);

            match usable {
                Some(out) => stdin = runner::cat_command(&out),
                None => {
                    debug!("Stopping discovery: '{}' produced no usable output", tool);
                    return DiscoveryReport {
                        stages,
                        outcome: Outcome::Aborted(tool),
                    };
                }
            }
        }

        // httpx prints `<url> [status] [title] [tech]`; only the url goes forward
        let httpx_out = self.out_dir.join(Tool::Httpx.output_file_name());
        let urls_file = match self.write_url_column(&httpx_out) {
            Ok(file) => file,
            Err(e) => {
                error!("{:#}", e);
                return DiscoveryReport {
                    stages,
                    outcome: Outcome::Aborted(Tool::Httpx),
                };
            }
        };
        let stdin = runner::cat_command(&urls_file);

        for tool in FINAL_STAGES {
            stages.push(self.run_stage(tool, &stdin).await);
        }

        DiscoveryReport {
            stages,
            outcome: Outcome::Done,
        }
    }

    async fn run_stage(&self, tool: Tool, stdin: &str) -> StageRecord {
        match runner::run(self.config, tool, stdin, self.out_dir, self.mode).await {
            Ok(output) => {
                let lines = log_result_count(tool, &output);
                StageRecord {
                    tool,
                    output: Some(output),
                    lines,
                }
            }
            Err(e) => {
                debug!("{:#}", e);
                // A failed stage can still leave partial results behind
                let partial = self.out_dir.join(tool.output_file_name());
                let lines = if partial.is_file() { log_result_count(tool, &partial) } else { 0 };
                StageRecord {
                    tool,
                    output: None,
                    lines,
                }
            }
        }
    }

    fn write_url_column(&self, httpx_out: &Path) -> Result<PathBuf> {
        let contents = fs::read_to_string(httpx_out)
            .with_context(|| format!("Failed to read {}", httpx_out.display()))?;
        let urls_file = self.out_dir.join(URL_COLUMN_FILE);
        fs::write(&urls_file, extract_urls(&contents))
            .with_context(|| format!("Failed to write {}", urls_file.display()))?;
        Ok(urls_file)
    }
}
