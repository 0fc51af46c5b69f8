use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing for the CLI.
///
/// `level` seeds the default filter; `RUST_LOG` wins when set.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,smv={level},smv_core={level},smv_slack={level}")));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .init();
}
