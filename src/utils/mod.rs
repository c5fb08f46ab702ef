//! Utility modules
//!
//! Common utilities used throughout the application.

pub mod errors;
pub mod helpers;
pub mod logging;

pub use errors::{ErrorSeverity, GatherBuddyError, Result};
