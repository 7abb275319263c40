use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber
///
/// `RUST_LOG` replaces the whole filter when set. Otherwise `level` applies to
/// the explorer itself and the HTTP stack only reports warnings.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("warn,sql_explorer={}", level))
}
