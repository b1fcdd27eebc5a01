//! Logging initialization.
//!
//! Structured logging via `tracing` with human-readable and JSON output,
//! verbosity from `-v` flags, and an environment override via
//! `CONFESSION_LOG_LEVEL`.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable overriding the log filter.
pub const LOG_LEVEL_ENV: &str = "CONFESSION_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable format with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON.
    Json,
}

/// Maps a verbosity level to a tracing directive string.
///
/// - 0 → `"warn"`
/// - 1 → `"info"`
/// - 2 → `"debug"`
/// - 3+ → `"trace"`
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Whether log lines on stderr should carry ANSI colors.
///
/// `auto` colors only a terminal and honours `NO_COLOR`.
#[must_use]
pub const fn use_ansi(color: ColorChoice, stderr_is_terminal: bool, no_color: bool) -> bool {
    match color {
        ColorChoice::Auto => stderr_is_terminal && !no_color,
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    }
}

/// Builds the level filter from the `CONFESSION_LOG_LEVEL` value, if any.
///
/// A malformed override falls back to the verbosity directive instead of
/// silencing every log line.
#[must_use]
pub fn build_filter(env_override: Option<&str>, verbosity: u8) -> EnvFilter {
    env_override
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(verbosity_to_directive(verbosity)))
}

/// Initializes the global tracing subscriber on stderr.
///
/// `CONFESSION_LOG_LEVEL`, when set, takes precedence over `verbosity`.
/// Uses `try_init()`, so repeated calls are ignored.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let env_override = std::env::var(LOG_LEVEL_ENV).ok();
    let filter = build_filter(env_override.as_deref(), verbosity);
    let show_target = verbosity >= 2;

    match format {
        LogFormat::Human => {
            let ansi = use_ansi(
                color,
                std::io::stderr().is_terminal(),
                std::env::var_os("NO_COLOR").is_some(),
            );
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(ansi)
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_target(show_target)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::*;

    #[test]
    fn verbosity_mapping() {
        assert_eq!(verbosity_to_directive(0), "warn");
        assert_eq!(verbosity_to_directive(1), "info");
        assert_eq!(verbosity_to_directive(2), "debug");
        assert_eq!(verbosity_to_directive(255), "trace");
    }

    #[test]
    fn filter_follows_verbosity_without_override() {
        assert_eq!(build_filter(None, 0).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(build_filter(None, 2).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(build_filter(Some("  "), 1).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn filter_override_wins_over_verbosity() {
        let filter = build_filter(Some("confession::session=trace"), 0);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
        assert_eq!(build_filter(Some("error"), 3).max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn malformed_override_falls_back_to_verbosity() {
        let filter = build_filter(Some("confession=loud"), 1);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn ansi_only_for_terminals_without_no_color() {
        assert!(use_ansi(ColorChoice::Auto, true, false));
        assert!(!use_ansi(ColorChoice::Auto, true, true));
        assert!(!use_ansi(ColorChoice::Auto, false, false));
        assert!(use_ansi(ColorChoice::Always, false, true));
        assert!(!use_ansi(ColorChoice::Never, true, false));
    }

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(LogFormat::Human, 0, ColorChoice::Never);
        init_logging(LogFormat::Json, 3, ColorChoice::Never);
    }
}
