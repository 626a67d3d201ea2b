//! Diagnostic logging setup.
//!
//! Logs always go to stderr. Stdout belongs to the renderer, and NDJSON
//! output has to stay parseable.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Filter used with `--debug`.
pub const DEBUG_DIRECTIVE: &str = "execstream=debug,warn";

/// Build the filter: `--debug` wins, then `RUST_LOG`, then the default.
pub fn env_filter(debug: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new(DEBUG_DIRECTIVE);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. Returns false if one was already set.
pub fn init_logging(debug: bool) -> bool {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(debug))
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_debug_filter_raises_level() {
        assert_eq!(env_filter(true).max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
