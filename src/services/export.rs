//! Registration export service implementation
//!
//! Organizer-only projection of an event's registrations, rendered as CSV.
//! Profile reads here are server-privileged so the organizer gets contact
//! emails regardless of member-level visibility.

use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use crate::database::DatabaseService;
use crate::models::registration::RegistrationExportRow;
use crate::services::auth::{AuthService, AuthUser};
use crate::utils::errors::{GatherBuddyError, Result};
use crate::utils::helpers::{csv_escape, format_timestamp};

/// Registration export service
#[derive(Clone)]
pub struct ExportService {
    db: DatabaseService,
    auth: AuthService,
}

impl ExportService {
    /// Create a new ExportService instance
    pub fn new(db: DatabaseService, auth: AuthService) -> Self {
        Self { db, auth }
    }

    /// Projection of an event's registrations for its organizer
    pub async fn event_registrations(
        &self,
        user: &AuthUser,
        event_id: Uuid,
    ) -> Result<Vec<RegistrationExportRow>> {
        let event = self
            .db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(GatherBuddyError::EventNotFound { event_id })?;

        self.auth.require_organizer(user, &event)?;

        let registrations = self.db.registrations.list_for_event(event_id).await?;
        if registrations.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<Uuid> = registrations.iter().map(|r| r.user_id).collect();
        let profiles: HashMap<Uuid, _> = self
            .db
            .profiles
            .find_many(&user_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let registration_ids: Vec<Uuid> = registrations.iter().map(|r| r.id).collect();
        let claims = self
            .db
            .food_items
            .claims_for_registrations(&registration_ids)
            .await?;
        let items = self.db.food_items.list_for_event(event_id).await?;
        let item_names: HashMap<Uuid, String> = items
            .into_iter()
            .map(|item| (item.id, item.display_name().to_string()))
            .collect();

        let rows = registrations
            .into_iter()
            .map(|registration| {
                let profile = profiles.get(&registration.user_id);
                let food_selections = claims
                    .iter()
                    .filter(|claim| claim.registration_id == registration.id)
                    .map(|claim| {
                        let name = item_names
                            .get(&claim.menu_item_id)
                            .cloned()
                            .unwrap_or_default();
                        (name, claim.quantity)
                    })
                    .collect();

                RegistrationExportRow {
                    full_name: profile
                        .and_then(|p| p.full_name.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    email: profile.and_then(|p| p.email.clone()).unwrap_or_default(),
                    guest_count: registration.guest_count,
                    party_size: registration.party_size(),
                    food_selections,
                    registered_at: registration.registered_at,
                }
            })
            .collect();

        info!(event_id = %event_id, organizer_id = %user.id, "Registrations exported");
        Ok(rows)
    }

    /// Render an event's registrations as a CSV document
    pub async fn event_registrations_csv(
        &self,
        user: &AuthUser,
        event_id: Uuid,
    ) -> Result<String> {
        let rows = self.event_registrations(user, event_id).await?;
        Ok(render_csv(&rows))
    }
}

/// Render export rows as CSV with RFC 4180 quoting
fn render_csv(rows: &[RegistrationExportRow]) -> String {
    let mut csv = String::from("Full Name,Email,Guests,Party Size,Food Items,Registered At\n");

    for row in rows {
        let food = row
            .food_selections
            .iter()
            .map(|(name, quantity)| format!("{name} x{quantity}"))
            .collect::<Vec<_>>()
            .join("; ");

        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            csv_escape(&row.full_name),
            csv_escape(&row.email),
            row.guest_count,
            row.party_size,
            csv_escape(&food),
            csv_escape(&format_timestamp(row.registered_at)),
        ));
    }

    csv
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_render_csv_quotes_fields() {
        let rows = vec![RegistrationExportRow {
            full_name: "Aliya, the \"Organizer\"".to_string(),
            email: "aliya@example.org".to_string(),
            guest_count: 2,
            party_size: 3,
            food_selections: vec![("Бауырсақ".to_string(), 2), ("Плов".to_string(), 1)],
            registered_at: Utc.with_ymd_and_hms(2025, 3, 21, 12, 0, 0).unwrap(),
        }];

        let csv = render_csv(&rows);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Full Name,Email,Guests,Party Size,Food Items,Registered At"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("\"Aliya, the \"\"Organizer\"\"\","));
        assert!(row.contains("Бауырсақ x2; Плов x1"));
        assert!(row.contains("2025-03-21"));
    }

    #[test]
    fn test_render_csv_empty_has_header_only() {
        let csv = render_csv(&[]);
        assert_eq!(csv.lines().count(), 1);
    }
}
