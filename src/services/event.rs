//! Event management service implementation
//!
//! Organizer-facing operations: authoring events with their potluck menu
//! manifests, and derived read views with attendance and remaining
//! quantities. Mutation is restricted to the organizer who created the
//! event; deletion cascades registrations, menu items and claims.

use std::collections::HashSet;

use tracing::info;
use uuid::Uuid;

use crate::database::DatabaseService;
use crate::models::event::{CreateEventRequest, Event, EventDetail, UpdateEventRequest};
use crate::models::food::{FoodItemDetail, FoodItemInput};
use crate::services::auth::{AuthService, AuthUser};
use crate::utils::errors::{GatherBuddyError, Result};

/// Event management service
#[derive(Clone)]
pub struct EventService {
    db: DatabaseService,
    auth: AuthService,
}

impl EventService {
    /// Create a new EventService instance
    pub fn new(db: DatabaseService, auth: AuthService) -> Self {
        Self { db, auth }
    }

    /// Create an event together with its menu-item manifest
    pub async fn create_event(
        &self,
        user: &AuthUser,
        request: &CreateEventRequest,
    ) -> Result<EventDetail> {
        validate_event_limits(request.max_attendees, request.max_guests_per_registration)?;
        validate_menu_inputs(&request.menu_items)?;

        let event = self.db.events.create(user.id, request).await?;
        for item in &request.menu_items {
            self.db.food_items.insert(event.id, item).await?;
        }

        info!(event_id = %event.id, organizer_id = %user.id, "Event created");
        self.get_event_detail(event.id).await
    }

    /// Update an event; only its organizer may do so
    pub async fn update_event(
        &self,
        user: &AuthUser,
        event_id: Uuid,
        request: &UpdateEventRequest,
    ) -> Result<EventDetail> {
        let event = self.require_event(event_id).await?;
        self.auth.require_organizer(user, &event)?;

        validate_event_limits(
            request.max_attendees.or(event.max_attendees),
            request
                .max_guests_per_registration
                .unwrap_or(event.max_guests_per_registration),
        )?;

        let event = self.db.events.update(event_id, request).await?;

        if let Some(menu_items) = &request.menu_items {
            validate_menu_inputs(menu_items)?;
            self.reconcile_menu_items(event.id, menu_items).await?;
        }

        info!(event_id = %event.id, organizer_id = %user.id, "Event updated");
        self.get_event_detail(event.id).await
    }

    /// Delete an event; only its organizer may do so
    pub async fn delete_event(&self, user: &AuthUser, event_id: Uuid) -> Result<()> {
        let event = self.require_event(event_id).await?;
        self.auth.require_organizer(user, &event)?;

        self.db.events.delete(event_id).await?;
        info!(event_id = %event_id, organizer_id = %user.id, "Event deleted");
        Ok(())
    }

    /// Event with derived attendance and menu claim state
    pub async fn get_event_detail(&self, event_id: Uuid) -> Result<EventDetail> {
        let event = self.require_event(event_id).await?;
        let total_attendees = self.db.registrations.total_attendees(event_id).await?;
        let spots_left = event
            .max_attendees
            .map(|max| (max as i64 - total_attendees).max(0));

        let items = self.db.food_items.list_for_event(event_id).await?;
        let claimed_totals = self.db.food_items.claimed_totals(event_id).await?;
        let menu_items = items
            .into_iter()
            .map(|item| {
                let claimed = claimed_totals
                    .iter()
                    .find(|(id, _)| *id == item.id)
                    .map(|(_, claimed)| *claimed)
                    .unwrap_or(0);
                FoodItemDetail::new(item, claimed)
            })
            .collect();

        Ok(EventDetail {
            event,
            total_attendees,
            spots_left,
            menu_items,
        })
    }

    /// Upcoming events ordered by start date
    pub async fn list_upcoming(&self, limit: Option<i64>) -> Result<Vec<Event>> {
        self.db.events.list_upcoming(limit).await
    }

    /// Apply a full desired menu manifest: update items that kept their id,
    /// insert new ones, delete the existing items the manifest dropped.
    /// Lowering a quantity below its claimed total is allowed; such an item
    /// simply counts as exhausted from then on.
    async fn reconcile_menu_items(
        &self,
        event_id: Uuid,
        menu_items: &[FoodItemInput],
    ) -> Result<()> {
        let existing = self.db.food_items.list_for_event(event_id).await?;
        let existing_ids: HashSet<Uuid> = existing.iter().map(|item| item.id).collect();
        let kept_ids: HashSet<Uuid> = menu_items.iter().filter_map(|item| item.id).collect();

        for input in menu_items {
            match input.id {
                Some(id) if existing_ids.contains(&id) => {
                    self.db.food_items.update(id, input).await?;
                }
                Some(id) => {
                    return Err(GatherBuddyError::InvalidInput(format!(
                        "menu item {id} does not belong to this event"
                    )));
                }
                None => {
                    self.db.food_items.insert(event_id, input).await?;
                }
            }
        }

        let to_delete: Vec<Uuid> = existing_ids.difference(&kept_ids).copied().collect();
        self.db.food_items.delete_many(&to_delete).await?;

        Ok(())
    }

    async fn require_event(&self, event_id: Uuid) -> Result<Event> {
        self.db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(GatherBuddyError::EventNotFound { event_id })
    }
}

fn validate_event_limits(max_attendees: Option<i32>, max_guests: i32) -> Result<()> {
    if let Some(max) = max_attendees {
        if max < 1 {
            return Err(GatherBuddyError::InvalidInput(
                "max_attendees must be at least 1".to_string(),
            ));
        }
    }
    if max_guests < 0 {
        return Err(GatherBuddyError::InvalidInput(
            "max_guests_per_registration cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_menu_inputs(menu_items: &[FoodItemInput]) -> Result<()> {
    for item in menu_items {
        if item.name_kk.is_empty() && item.name_en.as_deref().unwrap_or("").is_empty() {
            return Err(GatherBuddyError::InvalidInput(
                "menu item needs a name".to_string(),
            ));
        }
        if item.quantity < 1 {
            return Err(GatherBuddyError::InvalidInput(
                "menu item quantity must be at least 1".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event_owned_by(organizer_id: Uuid) -> Event {
        Event {
            id: Uuid::new_v4(),
            title_kk: "Той".to_string(),
            title_en: None,
            description_kk: None,
            description_en: None,
            location: "Hall".to_string(),
            image_url: None,
            start_date: Utc::now(),
            end_date: Utc::now(),
            max_attendees: None,
            max_guests_per_registration: 4,
            organizer_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_only_organizer_may_mutate() {
        let mut settings = crate::config::Settings::default();
        settings.auth.jwt_secret = "test-secret-test-secret-test-secret!".to_string();
        let auth = AuthService::new(&settings);

        let organizer = AuthUser {
            id: Uuid::new_v4(),
            email: None,
        };
        let stranger = AuthUser {
            id: Uuid::new_v4(),
            email: None,
        };
        let event = event_owned_by(organizer.id);

        assert!(auth.require_organizer(&organizer, &event).is_ok());
        let err = auth.require_organizer(&stranger, &event).unwrap_err();
        assert_eq!(err.reason_code(), "PERMISSION_DENIED");
    }

    #[test]
    fn test_menu_inputs_validated() {
        let bad_quantity = FoodItemInput {
            id: None,
            name_kk: "Бауырсақ".to_string(),
            name_en: None,
            quantity: 0,
        };
        assert!(validate_menu_inputs(&[bad_quantity]).is_err());

        let nameless = FoodItemInput {
            id: None,
            name_kk: String::new(),
            name_en: None,
            quantity: 3,
        };
        assert!(validate_menu_inputs(&[nameless]).is_err());
    }

    #[test]
    fn test_event_limits_validated() {
        assert!(validate_event_limits(Some(0), 4).is_err());
        assert!(validate_event_limits(None, -1).is_err());
        assert!(validate_event_limits(Some(10), 0).is_ok());
        assert!(validate_event_limits(None, 4).is_ok());
    }
}
