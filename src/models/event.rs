//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::food::{FoodItemDetail, FoodItemInput};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title_kk: String,
    pub title_en: Option<String>,
    pub description_kk: Option<String>,
    pub description_en: Option<String>,
    pub location: String,
    pub image_url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// NULL means unlimited attendance
    pub max_attendees: Option<i32>,
    pub max_guests_per_registration: i32,
    pub organizer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Display title, preferring the Kazakh one
    pub fn display_title(&self) -> &str {
        if !self.title_kk.is_empty() {
            &self.title_kk
        } else {
            self.title_en.as_deref().unwrap_or("")
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title_kk: String,
    pub title_en: Option<String>,
    pub description_kk: Option<String>,
    pub description_en: Option<String>,
    pub location: String,
    pub image_url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_attendees: Option<i32>,
    #[serde(default = "default_max_guests")]
    pub max_guests_per_registration: i32,
    #[serde(default)]
    pub menu_items: Vec<FoodItemInput>,
}

fn default_max_guests() -> i32 {
    4
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title_kk: Option<String>,
    pub title_en: Option<String>,
    pub description_kk: Option<String>,
    pub description_en: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub max_attendees: Option<i32>,
    pub max_guests_per_registration: Option<i32>,
    /// Full desired menu-item manifest; items without an id are inserted,
    /// items with an id are updated, missing existing items are deleted.
    pub menu_items: Option<Vec<FoodItemInput>>,
}

/// Event detail view: the event plus derived attendance and menu state
#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub total_attendees: i64,
    /// None when attendance is unlimited
    pub spots_left: Option<i64>,
    pub menu_items: Vec<FoodItemDetail>,
}
