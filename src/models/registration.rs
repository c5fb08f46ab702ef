//! Registration model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::food::MenuSelection;

/// One party: the registrant plus their guests
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub guest_count: i32,
    pub registered_at: DateTime<Utc>,
}

impl Registration {
    /// Size of the admitted party
    pub fn party_size(&self) -> i32 {
        1 + self.guest_count
    }
}

/// Registration attempt payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub guest_count: i32,
    #[serde(default)]
    pub menu_selections: Vec<MenuSelection>,
}

/// Organizer-facing export row for one registration
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationExportRow {
    pub full_name: String,
    pub email: String,
    pub guest_count: i32,
    pub party_size: i32,
    /// Pledged items as (display name, quantity)
    pub food_selections: Vec<(String, i32)>,
    pub registered_at: DateTime<Utc>,
}
