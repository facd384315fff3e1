//! Diagnostic output through `tracing`.
//!
//! Events go to stderr so reports on stdout stay pipeable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used without `RUST_LOG`: warnings only.
const DEFAULT_FILTER: &str = "depscope=warn";

/// Filter used with `--verbose`.
const VERBOSE_FILTER: &str = "depscope=debug";

/// Builds the event filter.
///
/// `--verbose` wins over `RUST_LOG`; otherwise `RUST_LOG` is honored and
/// falls back to warnings.
pub fn build_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initializes the global subscriber. Call once, at startup.
pub fn init_logging(verbose: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    // A subscriber may already be set, e.g. by a test harness.
    let _ = tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_filter() {
        let filter = build_filter(true);
        assert!(filter.to_string().contains("depscope=debug"));
    }

    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging(false);
        init_logging(true);
    }
}
