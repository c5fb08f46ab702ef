//! Member profile model
//!
//! Profiles mirror the identity provider's subject id and carry the
//! contact details the organizer export needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    /// Same UUID as the identity provider's subject
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertProfileRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
}
