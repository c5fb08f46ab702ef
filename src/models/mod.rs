//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod event;
pub mod food;
pub mod profile;
pub mod registration;

// Re-export commonly used models
pub use event::{CreateEventRequest, Event, EventDetail, UpdateEventRequest};
pub use food::{FoodClaim, FoodItem, FoodItemDetail, FoodItemInput, MenuSelection};
pub use profile::{Profile, UpsertProfileRequest};
pub use registration::{RegisterRequest, Registration, RegistrationExportRow};
