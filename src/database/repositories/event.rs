//! Event repository implementation

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::event::{CreateEventRequest, Event, UpdateEventRequest};
use crate::utils::errors::GatherBuddyError;

const EVENT_COLUMNS: &str = "id, title_kk, title_en, description_kk, description_en, location, image_url, start_date, end_date, max_attendees, max_guests_per_registration, organizer_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event
    pub async fn create(
        &self,
        organizer_id: Uuid,
        request: &CreateEventRequest,
    ) -> Result<Event, GatherBuddyError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (id, title_kk, title_en, description_kk, description_en, location, image_url, start_date, end_date, max_attendees, max_guests_per_registration, organizer_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&request.title_kk)
        .bind(&request.title_en)
        .bind(&request.description_kk)
        .bind(&request.description_en)
        .bind(&request.location)
        .bind(&request.image_url)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.max_attendees)
        .bind(request.max_guests_per_registration)
        .bind(organizer_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, GatherBuddyError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Update event fields; unset fields keep their current value
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateEventRequest,
    ) -> Result<Event, GatherBuddyError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET title_kk = COALESCE($2, title_kk),
                title_en = COALESCE($3, title_en),
                description_kk = COALESCE($4, description_kk),
                description_en = COALESCE($5, description_en),
                location = COALESCE($6, location),
                image_url = COALESCE($7, image_url),
                start_date = COALESCE($8, start_date),
                end_date = COALESCE($9, end_date),
                max_attendees = COALESCE($10, max_attendees),
                max_guests_per_registration = COALESCE($11, max_guests_per_registration),
                updated_at = $12
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.title_kk)
        .bind(&request.title_en)
        .bind(&request.description_kk)
        .bind(&request.description_en)
        .bind(&request.location)
        .bind(&request.image_url)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.max_attendees)
        .bind(request.max_guests_per_registration)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Delete event; registrations, menu items and claims cascade
    pub async fn delete(&self, id: Uuid) -> Result<(), GatherBuddyError> {
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Get upcoming events ordered by start date
    pub async fn list_upcoming(&self, limit: Option<i64>) -> Result<Vec<Event>, GatherBuddyError> {
        let limit = limit.unwrap_or(50);
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE start_date > NOW() ORDER BY start_date ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}
