//! Internationalization module
//!
//! Multi-language support for user-facing rejection messages.

pub mod loader;

pub use loader::{I18n, TranslationParams};
