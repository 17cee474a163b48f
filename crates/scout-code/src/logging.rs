//! Tracing subscriber setup for the `scout` binary.
//!
//! Logs go to stderr so stdout carries only the final output. `RUST_LOG`
//! overrides the verbosity flag when set.

use std::io::IsTerminal;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Crates whose logs the verbosity flag controls.
const LOG_TARGETS: &[&str] = &["scout_rs", "scout_code"];

/// Log level for a `-v` count: none → warn, `-v` → info, `-vv` → debug,
/// three or more → trace.
pub fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_directives(verbosity: u8) -> String {
    let level = level_for_verbosity(verbosity).to_string().to_lowercase();
    std::iter::once("warn".to_string())
        .chain(LOG_TARGETS.iter().map(|target| format!("{target}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(verbosity: u8) {
    INIT.call_once(|| {
        let filter = match std::env::var("RUST_LOG") {
            Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
            _ => EnvFilter::new(default_directives(verbosity)),
        };

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(true);

        // A subscriber installed elsewhere (tests) wins.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for_verbosity(0), Level::WARN);
        assert_eq!(level_for_verbosity(1), Level::INFO);
        assert_eq!(level_for_verbosity(2), Level::DEBUG);
        assert_eq!(level_for_verbosity(3), Level::TRACE);
        assert_eq!(level_for_verbosity(9), Level::TRACE);
    }

    #[test]
    fn directives_cover_both_crates() {
        assert_eq!(default_directives(0), "warn,scout_rs=warn,scout_code=warn");
        assert_eq!(default_directives(2), "warn,scout_rs=debug,scout_code=debug");
        assert!(default_directives(1).parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging(1);
        init_logging(3);
    }
}
