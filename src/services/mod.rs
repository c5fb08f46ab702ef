//! Services module
//!
//! This module contains business logic services

pub mod admission;
pub mod auth;
pub mod event;
pub mod export;
pub mod notification;
pub mod registration;

// Re-export commonly used services
pub use admission::{allocate_claims, check_capacity, CapacityDecision, ClaimDecision};
pub use auth::{AuthService, AuthUser};
pub use event::EventService;
pub use export::ExportService;
pub use notification::{EmailMessage, EmailService};
pub use registration::RegistrationService;

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub auth_service: AuthService,
    pub event_service: EventService,
    pub registration_service: RegistrationService,
    pub export_service: ExportService,
    pub email_service: EmailService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings, db: DatabaseService) -> Result<Self> {
        let auth_service = AuthService::new(settings);
        let email_service = EmailService::new(settings.email.clone())?;
        let event_service = EventService::new(db.clone(), auth_service.clone());
        let registration_service = RegistrationService::new(
            db.clone(),
            email_service.clone(),
            settings.i18n.default_language.clone(),
        );
        let export_service = ExportService::new(db, auth_service.clone());

        Ok(Self {
            auth_service,
            event_service,
            registration_service,
            export_service,
            email_service,
        })
    }
}
