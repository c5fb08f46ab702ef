//! Profile repository implementation
//!
//! Profiles are keyed by the identity provider's subject UUID. Reads here
//! are server-privileged: the organizer export uses them to resolve
//! registrant names and contact emails regardless of the caller's own
//! visibility.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::profile::Profile;
use crate::utils::errors::GatherBuddyError;

#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or refresh a profile; unset fields keep their current value
    pub async fn upsert(
        &self,
        id: Uuid,
        full_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Profile, GatherBuddyError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, full_name, email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (id) DO UPDATE
            SET full_name = COALESCE(EXCLUDED.full_name, profiles.full_name),
                email = COALESCE(EXCLUDED.email, profiles.email),
                updated_at = EXCLUDED.updated_at
            RETURNING id, full_name, email, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(full_name)
        .bind(email)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Find profile by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, GatherBuddyError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, full_name, email, created_at, updated_at FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Fetch a set of profiles by ID
    pub async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Profile>, GatherBuddyError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT id, full_name, email, created_at, updated_at FROM profiles WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }
}
