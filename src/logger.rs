use std::io::IsTerminal;
use tinify::constants::DEFAULT_LOG_LEVEL;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Parses a logging level name, accepting the aliases older releases used.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "" => None,
        "fatal" | "panic" => Some(LevelFilter::ERROR),
        "disabled" | "none" => Some(LevelFilter::OFF),
        other => other.parse().ok(),
    }
}

/// Installs the stderr subscriber for the application.
///
/// Unknown levels fall back to "error"; the returned warning says so.
pub fn init(level: &str) -> (LevelFilter, Option<String>) {
    let (filter, warning) = match parse_level(level) {
        Some(filter) => (filter, None),
        None => {
            let fallback = parse_level(DEFAULT_LOG_LEVEL).unwrap_or(LevelFilter::ERROR);
            let warning = format!(
                "unknown logging level {:?}, setting to {:?} by default",
                level, DEFAULT_LOG_LEVEL
            );
            (fallback, Some(warning))
        }
    };

    let directives = format!("tinify={}", filter);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();

    (filter, warning)
}
