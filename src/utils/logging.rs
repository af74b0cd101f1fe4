//! Logging utilities
//!
//! Provides logging setup and configuration.

use env_logger::Env;

/// Setup logging for the client.
///
/// Logs go to stderr so they never interleave with server replies on stdout.
/// `RUST_LOG` overrides the default `warn` filter.
pub fn setup_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();
}
