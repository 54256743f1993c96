// main.rs - discoveryx entry point
// Purpose: Parse the invocation, manage tool installs, and hand a target to the
//          discovery orchestrator

use anyhow::{Context, Result};
use clap::CommandFactory;
use colored::*;
use std::fs;
use std::process::ExitCode;

use discoveryx::cli::{Args, Invocation};
use discoveryx::config::Config;
use discoveryx::discover::{Discovery, Outcome};
use discoveryx::installer::{self, InstallSummary};
use discoveryx::inventory::{self, ToolStatus};
use discoveryx::logger;
use discoveryx::tools::ExecMode;
use discoveryx::updater;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse_normalized();

    let invocation = match args.invocation() {
        Ok(invocation) => invocation,
        Err(usage) => Args::command().error(usage.kind, usage.message).exit(),
    };

    print_banner();
    logger::init(args.debug);

    let config = Config::resolve()?.with_output_root(&args.output);

    let target = match invocation {
        Invocation::Setup => {
            report_install(&installer::install_all(&config).await?);
            return Ok(ExitCode::SUCCESS);
        }
        Invocation::Update => {
            report_install(&updater::update_all(&config).await?);
            return Ok(ExitCode::SUCCESS);
        }
        Invocation::CheckTools => {
            let statuses = inventory::inventory(&config);
            print_tool_status(&statuses);
            let ready = statuses.iter().all(|status| status.present);
            return Ok(if ready { ExitCode::SUCCESS } else { ExitCode::from(1) });
        }
        Invocation::Scan(target) => target,
    };

    let mode = ExecMode::from_docker_flag(args.docker);
    if !inventory::all_present(&config, mode) {
        return Ok(ExitCode::from(1));
    }

    let out_dir = config.run_output_dir(chrono::Local::now());
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;
    log::info!("Output directory: {}", out_dir.display());

    let report = Discovery::new(&config, &out_dir, mode)
        .run(&target.stdin_command(), target.discovery_path())
        .await;

    match report.outcome {
        Outcome::Done => log::info!("Discovery complete"),
        Outcome::Aborted(tool) => log::debug!("Discovery stopped after '{}'", tool),
    }

    Ok(ExitCode::SUCCESS)
}

fn print_banner() {
    println!("{}", "═══════════════════════════════════════════════════════════════".cyan().bold());
    println!("{}", "      _ _                               __  __".cyan().bold());
    println!("{}", "   __| (_)___  ___ _____   _____ _ __ _ \\ \\/ /".cyan().bold());
    println!("{}", "  / _` | / __|/ __/ _ \\ \\ / / _ \\ '__| | | \\  / ".cyan().bold());
    println!("{}", " | (_| | \\__ \\ (_| (_) \\ V /  __/ |  | |_| /  \\ ".cyan().bold());
    println!("{}", "  \\__,_|_|___/\\___\\___/ \\_/ \\___|_|   \\__, /_/\\_\\".cyan().bold());
    println!("{}", "                                      |___/".cyan().bold());
    println!("{}", "═══════════════════════════════════════════════════════════════".cyan().bold());
    println!("{}", format!("  discoveryx v{}", env!("CARGO_PKG_VERSION")).white().bold());
    println!("{}", "═══════════════════════════════════════════════════════════════\n".cyan().bold());
}

fn report_install(summary: &InstallSummary) {
    println!();
    println!("{}", format!("  ✓ Installed: {}", summary.installed.len()).green());
    println!("{}", format!("  ⏭️  Skipped:  {}", summary.skipped.len()).dimmed());
    if !summary.is_success() {
        println!("{}", format!("  ✗ Failed:    {}", summary.failed.len()).red());
        for (tool, reason) in &summary.failed {
            println!("{}", format!("      {}: {}", tool, reason).dimmed());
        }
    }
    println!();
}

fn print_tool_status(statuses: &[ToolStatus]) {
    for status in statuses {
        let icon = if status.present { "✓".green() } else { "✗".red() };
        let name = if status.present {
            status.tool.name().green().bold()
        } else {
            status.tool.name().red().bold()
        };
        println!(
            "  {} {:<12} {:<58} {}",
            icon,
            name,
            status.tool.spec().description,
            status.path.display().to_string().dimmed()
        );
    }

    let missing = statuses.iter().filter(|status| !status.present).count();
    println!();
    if missing == 0 {
        println!("{}", "  ✓ All tools installed!".green().bold());
    } else {
        println!("{}", format!("  ✗ {} tool(s) missing. Run: discoveryx --setup", missing).yellow());
    }
}
