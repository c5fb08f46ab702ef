//! Menu item and menu claim models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FoodItem {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name_kk: String,
    pub name_en: Option<String>,
    /// Total units the organizer needs for this item
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl FoodItem {
    /// Display name, preferring the Kazakh one
    pub fn display_name(&self) -> &str {
        if !self.name_kk.is_empty() {
            &self.name_kk
        } else {
            self.name_en.as_deref().unwrap_or("")
        }
    }
}

/// Organizer-authored menu item as submitted with an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItemInput {
    /// Present when updating an existing item, absent for new ones
    pub id: Option<Uuid>,
    pub name_kk: String,
    pub name_en: Option<String>,
    pub quantity: i32,
}

/// A pledge by one registration to supply units of a menu item
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FoodClaim {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub registration_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
}

/// One entry of a prospective claim set submitted with a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuSelection {
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

/// Menu item with its derived claim state
#[derive(Debug, Clone, Serialize)]
pub struct FoodItemDetail {
    #[serde(flatten)]
    pub item: FoodItem,
    pub claimed: i64,
    /// Clamped at zero for display; the raw claimed total can exceed the
    /// declared quantity after an organizer shrinks it
    pub remaining: i64,
    pub exhausted: bool,
}

impl FoodItemDetail {
    pub fn new(item: FoodItem, claimed: i64) -> Self {
        let remaining = (item.quantity as i64 - claimed).max(0);
        Self {
            exhausted: remaining <= 0,
            item,
            claimed,
            remaining,
        }
    }
}
