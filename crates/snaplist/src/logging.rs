//! Logging setup on top of `tracing-subscriber`.
//!
//! Output goes to stderr so stdout only carries the run summary. `RUST_LOG`
//! wins over everything else; otherwise `--verbose` forces debug and the
//! `[logging]` config section supplies the level and format.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the config, with CLI flags taking precedence.
pub fn init_from_config(config: &snaplist_core::Config, verbose: bool, json_logs: bool) {
    let level = resolve_level(&config.logging.level, verbose);
    let json_format = json_logs || config.logging.format.eq_ignore_ascii_case("json");
    init(level, json_format);
}

/// Filter directive for the configured level; unknown names fall back to info.
fn resolve_level(configured: &str, verbose: bool) -> &'static str {
    if verbose {
        return "debug";
    }
    match configured.to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}
