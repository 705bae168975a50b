pub mod build_info;

use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_LOG_DIRECTIVE: &str = "pigcoin=info";

/// Installs the global subscriber. `RUST_LOG` wins over `directive`, which
/// wins over [`DEFAULT_LOG_DIRECTIVE`]. Logs go to stderr so command output
/// stays clean.
pub fn init_tracing(directive: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive.unwrap_or(DEFAULT_LOG_DIRECTIVE)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
