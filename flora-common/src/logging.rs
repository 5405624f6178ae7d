//! Tracing subscriber initialization shared by Flora binaries

use crate::config::LoggingConfig;
use crate::{Error, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the default filter directive string
///
/// Every target gets the configured level. `tower_http` is always included so
/// request traces follow the same level.
pub fn default_directives(level: &str, targets: &[&str]) -> String {
    targets
        .iter()
        .copied()
        .chain(std::iter::once("tower_http"))
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level. When a log file is
/// configured, output is appended there instead of stderr.
pub fn init_tracing(config: &LoggingConfig, targets: &[&str]) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level, targets)));

    let registry = tracing_subscriber::registry().with(filter);

    let installed = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()
        }
        None => registry.with(fmt::layer()).try_init(),
    };

    installed.map_err(|e| Error::Config(format!("Tracing init failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_cover_targets_and_tower_http() {
        let directives = default_directives("debug", &["flora_id", "flora_common"]);
        assert_eq!(directives, "flora_id=debug,flora_common=debug,tower_http=debug");
    }

    #[test]
    fn test_default_directives_without_targets() {
        assert_eq!(default_directives("warn", &[]), "tower_http=warn");
    }
}
