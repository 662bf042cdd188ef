//! Logging using simplelog
//!
//! Logs always go to stderr. With `log_to_file` enabled they are also written
//! to a timestamped file in the cache directory (~/.cache/redux-demo/ on Linux).

use redux_store_config::DemoConfig;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::PathBuf;

/// Parse a level name, falling back to Info for anything unknown
pub fn parse_level(value: &str) -> LevelFilter {
    match value.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn log_file_path() -> anyhow::Result<PathBuf> {
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    Ok(redux_store_config::cache_dir()?.join(format!("redux-demo-{}.log", timestamp)))
}

/// Initialize logging
///
/// RUST_LOG wins over the configured level. Returns the log file path when
/// file logging is enabled.
pub fn init(config: &DemoConfig) -> anyhow::Result<Option<PathBuf>> {
    let level = std::env::var("RUST_LOG")
        .map(|v| parse_level(&v))
        .unwrap_or_else(|_| parse_level(&config.log_level));

    // Configure simplelog with timestamps
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|c| c) // Fallback if local time offset fails
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        log_config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    let log_file = if config.log_to_file {
        let path = log_file_path()?;
        let file = File::create(&path)?;
        loggers.push(WriteLogger::new(level, log_config, file));
        Some(path)
    } else {
        None
    };

    CombinedLogger::init(loggers)?;
    Ok(log_file)
}
