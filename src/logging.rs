use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_level: String,
    /// Colored output; off when `NO_COLOR` is set
    pub ansi: bool,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            ansi: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    /// Raise the level to `debug` for this crate and the library
    pub fn verbose(mut self) -> Self {
        self.log_level = format!("{},stock_scenarios=debug,scenario_forecast=debug", self.log_level);
        self
    }
}

/// Console logging on stderr, so reports on stdout stay clean
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| anyhow!("Invalid log filter '{}': {}", config.log_level, e))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(config.ansi),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!(level = %config.log_level, "console logging initialized");
    Ok(())
}
