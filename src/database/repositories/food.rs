//! Menu item and menu claim repository implementation

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::food::{FoodClaim, FoodItem, FoodItemInput};
use crate::utils::errors::GatherBuddyError;

#[derive(Debug, Clone)]
pub struct FoodItemRepository {
    pool: PgPool,
}

impl FoodItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a menu item for an event
    pub async fn insert(
        &self,
        event_id: Uuid,
        input: &FoodItemInput,
    ) -> Result<FoodItem, GatherBuddyError> {
        let item = sqlx::query_as::<_, FoodItem>(
            r#"
            INSERT INTO menu_items (id, event_id, name_kk, name_en, quantity, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, event_id, name_kk, name_en, quantity, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(&input.name_kk)
        .bind(&input.name_en)
        .bind(input.quantity)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    /// Update a menu item in place
    pub async fn update(
        &self,
        id: Uuid,
        input: &FoodItemInput,
    ) -> Result<FoodItem, GatherBuddyError> {
        let item = sqlx::query_as::<_, FoodItem>(
            r#"
            UPDATE menu_items
            SET name_kk = $2, name_en = $3, quantity = $4
            WHERE id = $1
            RETURNING id, event_id, name_kk, name_en, quantity, created_at
            "#,
        )
        .bind(id)
        .bind(&input.name_kk)
        .bind(&input.name_en)
        .bind(input.quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    /// Delete a set of menu items; their claims cascade
    pub async fn delete_many(&self, ids: &[Uuid]) -> Result<(), GatherBuddyError> {
        if ids.is_empty() {
            return Ok(());
        }

        sqlx::query("DELETE FROM menu_items WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List menu items for an event
    pub async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<FoodItem>, GatherBuddyError> {
        let items = sqlx::query_as::<_, FoodItem>(
            "SELECT id, event_id, name_kk, name_en, quantity, created_at FROM menu_items WHERE event_id = $1 ORDER BY created_at ASC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Claimed totals per menu item for an event, zero for unclaimed items
    pub async fn claimed_totals(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<(Uuid, i64)>, GatherBuddyError> {
        let totals: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT m.id, COALESCE(SUM(c.quantity), 0)::BIGINT
            FROM menu_items m
            LEFT JOIN menu_claims c ON c.menu_item_id = m.id
            WHERE m.event_id = $1
            GROUP BY m.id
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }

    /// Claims attached to a set of registrations
    pub async fn claims_for_registrations(
        &self,
        registration_ids: &[Uuid],
    ) -> Result<Vec<FoodClaim>, GatherBuddyError> {
        if registration_ids.is_empty() {
            return Ok(Vec::new());
        }

        let claims = sqlx::query_as::<_, FoodClaim>(
            "SELECT id, menu_item_id, registration_id, user_id, quantity FROM menu_claims WHERE registration_id = ANY($1)",
        )
        .bind(registration_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(claims)
    }
}
