use fern::colors::{Color, ColoredLevelConfig};
use fern::Dispatch;
use log::LevelFilter;

use crate::error::Result;

/// Environment variable overriding the log level chosen from CLI flags.
pub const LOG_ENV: &str = "BURNDOWN_LOG";

/// Initialize logging to stderr so stdout stays clean for JSON output.
pub fn initialize(verbose: bool) -> Result<()> {
    let default_level = if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|value| parse_level(&value))
        .unwrap_or(default_level);

    let colors = ColoredLevelConfig::new()
        .trace(Color::Magenta)
        .debug(Color::Blue)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);

    Dispatch::new()
        .level(level)
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{level}] {message}",
                level = colors.color(record.level()),
                message = message,
            ))
        })
        .chain(std::io::stderr())
        .apply()?;

    Ok(())
}

fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}
