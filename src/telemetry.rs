//! Diagnostic logging setup. Logs go to stderr so stdout stays reserved for
//! command output.

use std::io::{self, IsTerminal};
use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static TELEMETRY_GUARD: OnceLock<()> = OnceLock::new();

/// Default filter directive for a `-v` count.
pub fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Installs the global subscriber on first call; later calls do nothing.
///
/// `RUST_LOG` takes precedence over the verbosity flag when set.
pub fn initialise(verbose: u8) {
    TELEMETRY_GUARD.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

        // Another subscriber may already be installed by an embedding test
        // harness; that one wins.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .try_init();
    });
}
