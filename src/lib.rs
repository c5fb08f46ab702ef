//! GatherBuddy event registration service
//!
//! A community event-registration backend with potluck food-item
//! manifests. The core of the service is the admission protocol: a
//! capacity check over the whole party, a food-claim allocation against
//! the event's remaining menu inventory, and an atomic registration
//! write that re-asserts both limits under concurrency.

#![allow(non_snake_case)]

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod i18n;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{GatherBuddyError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;
pub use i18n::I18n;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
