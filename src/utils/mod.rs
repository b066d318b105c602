//! Utilities: logging setup (verbosity flags -> tracing filter, RUST_LOG wins).
//!
//! Key items:
//!   init_logging / derive_level

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Map `-v` count and `-q` to a level. Quiet beats verbose.
pub fn derive_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global fmt subscriber. `RUST_LOG`, when set, overrides `level`.
/// Calling twice is harmless (the second install is ignored).
pub fn init_logging(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
