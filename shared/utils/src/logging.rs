use anyhow::Result;
use std::sync::Mutex;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Install the global subscriber.
///
/// Output goes to stderr unless a log file is configured, so that stdout
/// stays free for command results.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            let fmt_layer = fmt::layer().json();

            if let Some(file_path) = &config.file_path {
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(file_path)?;

                registry
                    .with(fmt_layer.with_writer(Mutex::new(file)))
                    .try_init()?;
            } else {
                registry
                    .with(fmt_layer.with_writer(std::io::stderr))
                    .try_init()?;
            }
        }
        _ => {
            let fmt_layer = fmt::layer().with_target(false);

            if let Some(file_path) = &config.file_path {
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(file_path)?;

                registry
                    .with(fmt_layer.with_ansi(false).with_writer(Mutex::new(file)))
                    .try_init()?;
            } else {
                registry
                    .with(fmt_layer.with_writer(std::io::stderr))
                    .try_init()?;
            }
        }
    }

    tracing::debug!("Logging initialized with level: {}", config.level);
    Ok(())
}
