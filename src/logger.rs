// logger.rs - Colorized leveled logging
// Purpose: `log` macros backed by env_logger, `[time] level | message` lines

use colored::*;
use log::{Level, LevelFilter};
use std::io::Write;

/// Colored four-letter label for a log level
pub fn level_label(level: Level) -> ColoredString {
    match level {
        Level::Error => "fail".red(),
        Level::Warn => "warn".yellow(),
        Level::Info => "info".blue(),
        Level::Debug => "debg".blue(),
        Level::Trace => "trce".dimmed(),
    }
}

/// Install the global logger. Debug mode lowers the filter and adds `file#line`.
/// Safe to call more than once; later calls are ignored.
pub fn init(debug: bool) {
    let level = if debug { LevelFilter::Debug } else { LevelFilter::Info };

    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .format(move |buf, record| {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
            let label = level_label(record.level());

            if debug {
                let file = record
                    .file()
                    .and_then(|f| f.rsplit(['/', '\\']).next())
                    .unwrap_or("?");
                writeln!(
                    buf,
                    "[{}] {}  | {:>15}#{:<4}: {}",
                    timestamp,
                    label,
                    file,
                    record.line().unwrap_or(0),
                    record.args()
                )
            } else {
                writeln!(buf, "[{}] {}  | {}", timestamp, label, record.args())
            }
        })
        .try_init();
}
