//! Error handling for GatherBuddy
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy. Every registration
//! rejection carries a machine-readable reason code so the presentation
//! layer can show distinct guidance for each failure.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for the GatherBuddy application
#[derive(Error, Debug)]
pub enum GatherBuddyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: Uuid },

    #[error("User {user_id} is already registered for event {event_id}")]
    AlreadyRegistered { event_id: Uuid, user_id: Uuid },

    #[error("Event capacity exceeded: {spots_left} spots left, party of {party_size} requested")]
    CapacityExceeded { spots_left: i64, party_size: i32 },

    #[error("At least one menu item must be selected")]
    NoSelection,

    #[error("Selected food quantity {selected} does not cover a party of {required}")]
    InsufficientQuantity { required: i32, selected: i32 },

    #[error("Menu item {item_id} overcommitted: {requested} requested, {remaining} remaining")]
    ItemOvercommitted {
        item_id: Uuid,
        requested: i32,
        remaining: i64,
    },

    #[error("Failed to persist menu claims: {0}")]
    ClaimPersistFailed(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Result type alias for GatherBuddy operations
pub type Result<T> = std::result::Result<T, GatherBuddyError>;

impl GatherBuddyError {
    /// Machine-readable reason code surfaced to API callers
    pub fn reason_code(&self) -> &'static str {
        match self {
            GatherBuddyError::Database(_) | GatherBuddyError::Migration(_) => "STORAGE_FAILURE",
            GatherBuddyError::Config(_) => "CONFIG_ERROR",
            GatherBuddyError::Unauthenticated(_) => "UNAUTHENTICATED",
            GatherBuddyError::PermissionDenied(_) => "PERMISSION_DENIED",
            GatherBuddyError::EventNotFound { .. } => "NOT_FOUND",
            GatherBuddyError::AlreadyRegistered { .. } => "ALREADY_REGISTERED",
            GatherBuddyError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            GatherBuddyError::NoSelection => "NO_SELECTION",
            GatherBuddyError::InsufficientQuantity { .. } => "INSUFFICIENT_QUANTITY",
            GatherBuddyError::ItemOvercommitted { .. } => "ITEM_OVERCOMMITTED",
            GatherBuddyError::ClaimPersistFailed(_) => "CLAIM_PERSIST_FAILED",
            GatherBuddyError::Http(_) => "UPSTREAM_FAILURE",
            GatherBuddyError::Serialization(_) => "SERIALIZATION_ERROR",
            GatherBuddyError::Io(_) => "IO_ERROR",
            GatherBuddyError::InvalidInput(_) => "INVALID_INPUT",
            GatherBuddyError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Check if the error is a registration rejection (caller mistake or
    /// full event) as opposed to an infrastructure failure
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            GatherBuddyError::Unauthenticated(_)
                | GatherBuddyError::PermissionDenied(_)
                | GatherBuddyError::EventNotFound { .. }
                | GatherBuddyError::AlreadyRegistered { .. }
                | GatherBuddyError::CapacityExceeded { .. }
                | GatherBuddyError::NoSelection
                | GatherBuddyError::InsufficientQuantity { .. }
                | GatherBuddyError::ItemOvercommitted { .. }
                | GatherBuddyError::InvalidInput(_)
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GatherBuddyError::Database(_) => ErrorSeverity::Critical,
            GatherBuddyError::Migration(_) => ErrorSeverity::Critical,
            GatherBuddyError::Config(_) => ErrorSeverity::Critical,
            GatherBuddyError::ClaimPersistFailed(_) => ErrorSeverity::Error,
            GatherBuddyError::Unauthenticated(_) => ErrorSeverity::Warning,
            GatherBuddyError::PermissionDenied(_) => ErrorSeverity::Warning,
            GatherBuddyError::ServiceUnavailable(_) => ErrorSeverity::Warning,
            GatherBuddyError::Http(_) => ErrorSeverity::Warning,
            _ if self.is_rejection() => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_are_distinguishable() {
        let errors = [
            GatherBuddyError::Unauthenticated("no token".to_string()),
            GatherBuddyError::EventNotFound {
                event_id: Uuid::nil(),
            },
            GatherBuddyError::CapacityExceeded {
                spots_left: 0,
                party_size: 2,
            },
            GatherBuddyError::NoSelection,
            GatherBuddyError::InsufficientQuantity {
                required: 3,
                selected: 2,
            },
            GatherBuddyError::ItemOvercommitted {
                item_id: Uuid::nil(),
                requested: 2,
                remaining: 1,
            },
            GatherBuddyError::ClaimPersistFailed("boom".to_string()),
        ];

        let codes: std::collections::HashSet<_> =
            errors.iter().map(|e| e.reason_code()).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_rejections_are_not_infrastructure_failures() {
        assert!(GatherBuddyError::NoSelection.is_rejection());
        assert!(GatherBuddyError::CapacityExceeded {
            spots_left: -1,
            party_size: 1
        }
        .is_rejection());
        assert!(!GatherBuddyError::ClaimPersistFailed("x".to_string()).is_rejection());
        assert!(!GatherBuddyError::Config("x".to_string()).is_rejection());
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(
            GatherBuddyError::Config("bad".to_string()).severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(GatherBuddyError::NoSelection.severity(), ErrorSeverity::Info);
        assert_eq!(
            GatherBuddyError::Unauthenticated("no token".to_string()).severity(),
            ErrorSeverity::Warning
        );
    }
}
