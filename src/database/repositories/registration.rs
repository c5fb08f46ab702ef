//! Registration repository implementation
//!
//! Holds the commit path of the admission protocol. The service-layer
//! checks are only a fast pre-check; the INSERT statements here re-derive
//! the attendance and remaining-quantity aggregates at write time, inside
//! one transaction, so a registration that would break an invariant fails
//! at the write even if it passed the pre-check under a concurrent race.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::food::MenuSelection;
use crate::models::registration::Registration;
use crate::utils::errors::GatherBuddyError;

const REGISTRATION_COLUMNS: &str = "id, event_id, user_id, guest_count, registered_at";

#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Guest counts of all registrations for an event
    pub async fn guest_counts(&self, event_id: Uuid) -> Result<Vec<i32>, GatherBuddyError> {
        let rows: Vec<(i32,)> =
            sqlx::query_as("SELECT guest_count FROM event_registrations WHERE event_id = $1")
                .bind(event_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(gc,)| gc).collect())
    }

    /// Total admitted attendance for an event: sum of party sizes
    pub async fn total_attendees(&self, event_id: Uuid) -> Result<i64, GatherBuddyError> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(1 + guest_count), 0)::BIGINT FROM event_registrations WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// All registrations for an event, oldest first
    pub async fn list_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<Registration>, GatherBuddyError> {
        let registrations = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM event_registrations WHERE event_id = $1 ORDER BY registered_at ASC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Persist a registration and its menu claims as one atomic unit.
    ///
    /// The transaction first locks the event row, serializing admissions
    /// per event: under READ COMMITTED two concurrent transactions would
    /// otherwise both evaluate the aggregate sub-selects before either
    /// commits and both pass. With the lock held, the registration INSERT
    /// only inserts while the recomputed attendance still fits
    /// `max_attendees`, and each claim INSERT only inserts while the
    /// recomputed remaining quantity still covers the claim. Any guard
    /// failure or storage error rolls the whole transaction back, so a
    /// registration row never survives a failed claim batch.
    pub async fn create_with_claims(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        guest_count: i32,
        selections: &[MenuSelection],
    ) -> Result<Registration, GatherBuddyError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM events WHERE id = $1 FOR UPDATE")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Err(GatherBuddyError::EventNotFound { event_id });
        }

        let inserted = sqlx::query_as::<_, Registration>(&format!(
            r#"
            INSERT INTO event_registrations (id, event_id, user_id, guest_count, registered_at)
            SELECT $1, e.id, $3, $4, $5
            FROM events e
            WHERE e.id = $2
              AND (e.max_attendees IS NULL
                   OR (SELECT COALESCE(SUM(1 + r.guest_count), 0)
                       FROM event_registrations r
                       WHERE r.event_id = e.id) + 1 + $4 <= e.max_attendees)
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(user_id)
        .bind(guest_count)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                GatherBuddyError::AlreadyRegistered { event_id, user_id }
            }
            _ => GatherBuddyError::Database(e),
        })?;

        let registration = match inserted {
            Some(registration) => registration,
            None => {
                tx.rollback().await?;
                return Err(self.capacity_rejection(event_id, guest_count).await?);
            }
        };

        for selection in selections {
            let claim_id: Option<(Uuid,)> = sqlx::query_as(
                r#"
                INSERT INTO menu_claims (id, menu_item_id, registration_id, user_id, quantity)
                SELECT $1, m.id, $3, $4, $5
                FROM menu_items m
                WHERE m.id = $2
                  AND m.event_id = $6
                  AND m.quantity - (SELECT COALESCE(SUM(c.quantity), 0)
                                    FROM menu_claims c
                                    WHERE c.menu_item_id = m.id) >= $5
                RETURNING id
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(selection.menu_item_id)
            .bind(registration.id)
            .bind(user_id)
            .bind(selection.quantity)
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| GatherBuddyError::ClaimPersistFailed(e.to_string()))?;

            if claim_id.is_none() {
                tx.rollback().await?;
                return Err(self
                    .overcommit_rejection(selection.menu_item_id, selection.quantity)
                    .await?);
            }
        }

        tx.commit().await?;
        Ok(registration)
    }

    /// Delete the caller's registration for an event; claims cascade.
    /// Deleting a registration that does not exist is not an error.
    pub async fn delete_by_event_and_user(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, GatherBuddyError> {
        let result =
            sqlx::query("DELETE FROM event_registrations WHERE event_id = $1 AND user_id = $2")
                .bind(event_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Build the capacity rejection for a failed registration guard,
    /// re-reading the current attendance for the spots-left detail
    async fn capacity_rejection(
        &self,
        event_id: Uuid,
        guest_count: i32,
    ) -> Result<GatherBuddyError, GatherBuddyError> {
        let row: Option<(Option<i32>,)> =
            sqlx::query_as("SELECT max_attendees FROM events WHERE id = $1")
                .bind(event_id)
                .fetch_optional(&self.pool)
                .await?;

        let max_attendees = match row {
            Some((max,)) => max,
            None => return Ok(GatherBuddyError::EventNotFound { event_id }),
        };

        let current = self.total_attendees(event_id).await?;
        let spots_left = max_attendees.map(|max| max as i64 - current).unwrap_or(0);

        Ok(GatherBuddyError::CapacityExceeded {
            spots_left,
            party_size: 1 + guest_count,
        })
    }

    /// Build the overcommit rejection for a failed claim guard,
    /// re-reading the item's remaining quantity for the detail
    async fn overcommit_rejection(
        &self,
        item_id: Uuid,
        requested: i32,
    ) -> Result<GatherBuddyError, GatherBuddyError> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT (m.quantity - COALESCE((SELECT SUM(c.quantity)
                                           FROM menu_claims c
                                           WHERE c.menu_item_id = m.id), 0))::BIGINT
            FROM menu_items m
            WHERE m.id = $1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        let remaining = row.map(|(r,)| r.max(0)).unwrap_or(0);

        Ok(GatherBuddyError::ItemOvercommitted {
            item_id,
            requested,
            remaining,
        })
    }
}
