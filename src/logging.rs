use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize stderr logging.
///
/// `RUST_LOG` directives are honored; `level` replaces the WARN default.
pub fn init(level: Option<tracing::Level>) -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.unwrap_or(tracing::Level::WARN).into())
        .from_env_lossy();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .try_init()
        .map_err(|err| anyhow!("Failed to initialize logging: {}", err))
}
