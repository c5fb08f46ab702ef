//! Registration transaction service implementation
//!
//! Orchestrates the admission protocol for one registration attempt:
//! event lookup, capacity pre-check, food-claim allocation, the atomic
//! write, and the detached notification side effects. Cancellation is a
//! single idempotent delete.

use tracing::{info, warn};
use uuid::Uuid;

use crate::database::DatabaseService;
use crate::models::event::Event;
use crate::models::food::MenuSelection;
use crate::models::profile::Profile;
use crate::models::registration::{RegisterRequest, Registration};
use crate::services::admission::{allocate_claims, check_capacity, CapacityDecision, ClaimDecision};
use crate::services::auth::AuthUser;
use crate::services::notification::EmailService;
use crate::utils::errors::{GatherBuddyError, Result};
use crate::utils::helpers::is_valid_email;
use crate::utils::logging;

/// Registration transaction service
#[derive(Debug, Clone)]
pub struct RegistrationService {
    db: DatabaseService,
    email: EmailService,
    notification_language: String,
}

impl RegistrationService {
    /// Create a new RegistrationService instance
    pub fn new(db: DatabaseService, email: EmailService, notification_language: String) -> Self {
        Self {
            db,
            email,
            notification_language,
        }
    }

    /// Attempt to register the caller for an event.
    ///
    /// The capacity and claim checks here produce fast, specific
    /// rejections; the repository re-asserts both limits inside the write
    /// transaction, so a concurrent registration that slips past the
    /// pre-check still fails at the write instead of breaking an
    /// invariant.
    pub async fn register(
        &self,
        user: &AuthUser,
        event_id: Uuid,
        request: &RegisterRequest,
    ) -> Result<Registration> {
        let event = self
            .db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(GatherBuddyError::EventNotFound { event_id })?;

        if request.guest_count < 0 || request.guest_count > event.max_guests_per_registration {
            return Err(GatherBuddyError::InvalidInput(format!(
                "guest_count must be between 0 and {}",
                event.max_guests_per_registration
            )));
        }
        let party_size = 1 + request.guest_count;

        let guest_counts = self.db.registrations.guest_counts(event_id).await?;
        if let CapacityDecision::Rejected { spots_left } =
            check_capacity(event.max_attendees, &guest_counts, request.guest_count)
        {
            logging::log_admission(event_id, user.id, party_size, false, Some("CAPACITY_EXCEEDED"));
            return Err(GatherBuddyError::CapacityExceeded {
                spots_left,
                party_size,
            });
        }

        let items = self.db.food_items.list_for_event(event_id).await?;
        let claimed_totals = self
            .db
            .food_items
            .claimed_totals(event_id)
            .await?
            .into_iter()
            .collect();
        let selections = match allocate_claims(
            &items,
            &claimed_totals,
            &request.menu_selections,
            party_size,
        ) {
            Ok(ClaimDecision::Accepted(selections)) => selections,
            Ok(ClaimDecision::Waived) => Vec::new(),
            Err(e) => {
                logging::log_admission(event_id, user.id, party_size, false, Some(e.reason_code()));
                return Err(e);
            }
        };

        let registration = self
            .db
            .registrations
            .create_with_claims(event_id, user.id, request.guest_count, &selections)
            .await?;

        // Keep the registrant's contact details current for the organizer export
        self.db
            .profiles
            .upsert(user.id, None, user.email.as_deref())
            .await?;

        logging::log_admission(event_id, user.id, party_size, true, None);
        self.spawn_notifications(event, user.clone(), registration.clone(), selections);

        Ok(registration)
    }

    /// Create or refresh the caller's own profile
    pub async fn upsert_profile(
        &self,
        user: &AuthUser,
        full_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Profile> {
        if let Some(email) = email {
            if !is_valid_email(email) {
                return Err(GatherBuddyError::InvalidInput(format!(
                    "invalid email address: {email}"
                )));
            }
        }
        self.db.profiles.upsert(user.id, full_name, email).await
    }

    /// Cancel the caller's registration for an event. Claims cascade with
    /// the registration row; cancelling a registration that does not exist
    /// is success, not an error.
    pub async fn unregister(&self, user: &AuthUser, event_id: Uuid) -> Result<()> {
        let removed = self
            .db
            .registrations
            .delete_by_event_and_user(event_id, user.id)
            .await?;

        logging::log_cancellation(event_id, user.id, removed);
        Ok(())
    }

    /// Queue the confirmation emails after a committed registration.
    /// Detached from the request: failures are logged, never propagated,
    /// and never undo the registration.
    fn spawn_notifications(
        &self,
        event: Event,
        user: AuthUser,
        registration: Registration,
        selections: Vec<MenuSelection>,
    ) {
        if !self.email.is_enabled() {
            return;
        }

        let db = self.db.clone();
        let email = self.email.clone();
        let language = self.notification_language.clone();

        tokio::spawn(async move {
            if let Err(e) =
                send_registration_emails(&db, &email, &event, &user, &registration, &selections, &language)
                    .await
            {
                warn!(
                    event_id = %event.id,
                    user_id = %user.id,
                    error = %e,
                    "Registration notification failed"
                );
            }
        });
    }
}

/// Render and deliver the attendee confirmation and organizer notification
async fn send_registration_emails(
    db: &DatabaseService,
    email: &EmailService,
    event: &Event,
    user: &AuthUser,
    registration: &Registration,
    selections: &[MenuSelection],
    language: &str,
) -> Result<()> {
    let items = db.food_items.list_for_event(event.id).await?;
    let food_selections: Vec<(String, i32)> = selections
        .iter()
        .filter_map(|selection| {
            items
                .iter()
                .find(|item| item.id == selection.menu_item_id)
                .map(|item| (item.display_name().to_string(), selection.quantity))
        })
        .collect();

    let attendee_profile = db.profiles.find_by_id(user.id).await?;
    let attendee_name = attendee_profile
        .as_ref()
        .and_then(|p| p.full_name.clone())
        .unwrap_or_else(|| "Қатысушы".to_string());

    if let Some(to) = user
        .email
        .clone()
        .or_else(|| attendee_profile.and_then(|p| p.email))
    {
        let message =
            email.attendee_confirmation(&to, &attendee_name, event, &food_selections, language);
        if let Err(e) = email.send(&message).await {
            logging::log_notification(&to, "attendee_confirmation", false, Some(&e.to_string()));
        } else {
            logging::log_notification(&to, "attendee_confirmation", true, None);
        }
    }

    let organizer_profile = db.profiles.find_by_id(event.organizer_id).await?;
    if let Some(organizer) = organizer_profile {
        if let Some(to) = organizer.email {
            let organizer_name = organizer
                .full_name
                .unwrap_or_else(|| "Ұйымдастырушы".to_string());
            let total_attendees = db.registrations.total_attendees(event.id).await?;
            let message = email.organizer_notification(
                &to,
                &organizer_name,
                &attendee_name,
                event,
                registration.guest_count,
                total_attendees,
                &food_selections,
                language,
            );
            if let Err(e) = email.send(&message).await {
                logging::log_notification(&to, "organizer_notification", false, Some(&e.to_string()));
            } else {
                logging::log_notification(&to, "organizer_notification", true, None);
            }
        }
    }

    info!(event_id = %event.id, user_id = %user.id, "Registration notifications processed");
    Ok(())
}
