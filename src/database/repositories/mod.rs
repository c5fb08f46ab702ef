//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod event;
pub mod food;
pub mod profile;
pub mod registration;

// Re-export repositories
pub use event::EventRepository;
pub use food::FoodItemRepository;
pub use profile::ProfileRepository;
pub use registration::RegistrationRepository;
