//! File logging. The terminal belongs to the TUI, so everything goes to a
//! daily rolling file under the data directory.

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Environment variable overriding `[logging] level`.
pub const LOG_ENV: &str = "KONTAKTY_LOG";

fn default_filter(level: &str) -> String {
    format!("kontakty={level},reqwest=warn")
}

/// Install the global subscriber. Keep the guard alive until exit so the
/// background writer flushes.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    let dir = config.log_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    // Precedence: KONTAKTY_LOG > config file > "info"
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| default_filter(&config.logging.level).into());

    let appender = tracing_appender::rolling::daily(&dir, &config.logging.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_scopes_crate() {
        assert_eq!(default_filter("debug"), "kontakty=debug,reqwest=warn");
        assert!(default_filter("trace").parse::<EnvFilter>().is_ok());
    }
}
