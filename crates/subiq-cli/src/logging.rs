//! Diagnostic logging setup.
//!
//! Human-facing status lines go to stdout through `colored`; tracing output
//! goes to stderr so `--json` output stays machine readable.

use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Filter used with `--verbose` when `RUST_LOG` is unset.
pub const VERBOSE_LOG_LEVEL: &str = "debug";

/// Installs the global subscriber. `RUST_LOG` takes precedence over `verbose`.
///
/// Calling it again is a no-op.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose {
        VERBOSE_LOG_LEVEL
    } else {
        DEFAULT_LOG_LEVEL
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .compact()
        .with_writer(std::io::stderr)
        .try_init();
}
