//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging
//! utilities for the GatherBuddy application.

use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::config::LoggingConfig;
use crate::utils::errors::{GatherBuddyError, Result};

/// Initialize logging based on configuration.
///
/// Returns the file writer's `WorkerGuard`; the caller must keep it alive
/// for the process lifetime, since dropping it shuts the background writer
/// down and file logging stops.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "gatherbuddy.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .try_init()
        .map_err(|e| GatherBuddyError::Config(format!("failed to initialize logging: {e}")))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log an admission decision for a registration attempt
pub fn log_admission(event_id: Uuid, user_id: Uuid, party_size: i32, admitted: bool, reason: Option<&str>) {
    if admitted {
        info!(
            event_id = %event_id,
            user_id = %user_id,
            party_size = party_size,
            "Registration admitted"
        );
    } else {
        info!(
            event_id = %event_id,
            user_id = %user_id,
            party_size = party_size,
            reason = reason,
            "Registration rejected"
        );
    }
}

/// Log cancellation of a registration
pub fn log_cancellation(event_id: Uuid, user_id: Uuid, removed: bool) {
    if removed {
        info!(event_id = %event_id, user_id = %user_id, "Registration cancelled");
    } else {
        // Idempotent delete of a registration that was not there
        debug!(event_id = %event_id, user_id = %user_id, "Cancellation was a no-op");
    }
}

/// Log a best-effort notification outcome
pub fn log_notification(recipient: &str, template: &str, success: bool, error: Option<&str>) {
    if success {
        debug!(recipient = recipient, template = template, "Notification delivered");
    } else {
        warn!(
            recipient = recipient,
            template = template,
            error = error,
            "Notification delivery failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_returns_live_file_writer_guard() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            level: "info".to_string(),
            file_path: dir.path().to_string_lossy().to_string(),
        };

        let guard = init_logging(&config).unwrap();
        info!("file writer smoke test");

        // Dropping the guard flushes the background writer; the rolling
        // file must have received the startup lines by then
        drop(guard);

        let written: u64 = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.metadata().ok())
            .map(|metadata| metadata.len())
            .sum();
        assert!(written > 0);
    }
}
