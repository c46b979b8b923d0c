//! Subscriber setup shared by the command-line tools.

use tracing::Level;
use tracing_subscriber::EnvFilter;

fn verbosity_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

/// Filter built from `directives` (normally `RUST_LOG`); the `-v` level
/// applies only when there are none
pub fn env_filter(verbose: u8, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(verbosity_level(verbose).into())
        .parse_lossy(directives.unwrap_or_default())
}

/// Install a stderr subscriber filtered by `RUST_LOG` and verbosity
pub fn init_tracing(verbose: u8) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(verbose, directives.as_deref()))
        .init();
}
