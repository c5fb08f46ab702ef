//! DB-backed tests for the registration commit path: the transactional
//! write with its in-SQL admission guards, rollback behavior, and the
//! idempotent cancellation with cascading claims.

mod helpers;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use serial_test::serial;
use uuid::Uuid;

use helpers::TestDatabase;
use GatherBuddy::database::DatabaseService;
use GatherBuddy::models::event::{CreateEventRequest, Event};
use GatherBuddy::models::food::{FoodItem, FoodItemInput, MenuSelection};
use GatherBuddy::GatherBuddyError;

async fn seed_event(
    db: &DatabaseService,
    max_attendees: Option<i32>,
    item_quantities: &[i32],
) -> (Event, Vec<FoodItem>) {
    let request = CreateEventRequest {
        title_kk: "Наурыз той".to_string(),
        title_en: None,
        description_kk: None,
        description_en: None,
        location: "Community hall".to_string(),
        image_url: None,
        start_date: Utc::now() + Duration::days(7),
        end_date: Utc::now() + Duration::days(7) + Duration::hours(3),
        max_attendees,
        max_guests_per_registration: 4,
        menu_items: Vec::new(),
    };
    let event = db.events.create(Uuid::new_v4(), &request).await.unwrap();

    let mut items = Vec::new();
    for (i, &quantity) in item_quantities.iter().enumerate() {
        let input = FoodItemInput {
            id: None,
            name_kk: format!("Тағам {}", i + 1),
            name_en: None,
            quantity,
        };
        items.push(db.food_items.insert(event.id, &input).await.unwrap());
    }

    (event, items)
}

async fn registration_count(pool: &sqlx::PgPool, event_id: Uuid) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM event_registrations WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(pool)
            .await
            .unwrap();
    count
}

async fn claim_count(pool: &sqlx::PgPool, item_id: Uuid) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM menu_claims WHERE menu_item_id = $1")
            .bind(item_id)
            .fetch_one(pool)
            .await
            .unwrap();
    count
}

#[tokio::test]
#[serial]
async fn second_registration_by_same_user_conflicts() {
    let test_db = TestDatabase::new().await.unwrap();
    let db = DatabaseService::new(test_db.pool.clone());
    let (event, _) = seed_event(&db, None, &[]).await;
    let user_id = Uuid::new_v4();

    let first = db
        .registrations
        .create_with_claims(event.id, user_id, 1, &[])
        .await
        .unwrap();

    let err = db
        .registrations
        .create_with_claims(event.id, user_id, 0, &[])
        .await
        .unwrap_err();
    assert_matches!(err, GatherBuddyError::AlreadyRegistered { .. });

    // The original registration is untouched
    assert_eq!(registration_count(&test_db.pool, event.id).await, 1);
    assert_eq!(db.registrations.total_attendees(event.id).await.unwrap(), 2);
    assert_eq!(first.guest_count, 1);
}

#[tokio::test]
#[serial]
async fn failed_claim_rolls_back_the_registration() {
    let test_db = TestDatabase::new().await.unwrap();
    let db = DatabaseService::new(test_db.pool.clone());
    let (event, items) = seed_event(&db, None, &[2]).await;

    let taker = Uuid::new_v4();
    db.registrations
        .create_with_claims(
            event.id,
            taker,
            1,
            &[MenuSelection {
                menu_item_id: items[0].id,
                quantity: 2,
            }],
        )
        .await
        .unwrap();

    // The item is exhausted; this write's claim guard must fail and take
    // the registration row down with it
    let err = db
        .registrations
        .create_with_claims(
            event.id,
            Uuid::new_v4(),
            0,
            &[MenuSelection {
                menu_item_id: items[0].id,
                quantity: 1,
            }],
        )
        .await
        .unwrap_err();
    assert_matches!(
        err,
        GatherBuddyError::ItemOvercommitted {
            requested: 1,
            remaining: 0,
            ..
        }
    );

    assert_eq!(registration_count(&test_db.pool, event.id).await, 1);
    assert_eq!(claim_count(&test_db.pool, items[0].id).await, 1);
}

#[tokio::test]
#[serial]
async fn cancellation_removes_claims_and_is_idempotent() {
    let test_db = TestDatabase::new().await.unwrap();
    let db = DatabaseService::new(test_db.pool.clone());
    let (event, items) = seed_event(&db, None, &[5]).await;
    let user_id = Uuid::new_v4();

    db.registrations
        .create_with_claims(
            event.id,
            user_id,
            0,
            &[MenuSelection {
                menu_item_id: items[0].id,
                quantity: 1,
            }],
        )
        .await
        .unwrap();
    assert_eq!(claim_count(&test_db.pool, items[0].id).await, 1);

    let removed = db
        .registrations
        .delete_by_event_and_user(event.id, user_id)
        .await
        .unwrap();
    assert!(removed);
    assert_eq!(registration_count(&test_db.pool, event.id).await, 0);
    assert_eq!(claim_count(&test_db.pool, items[0].id).await, 0);

    // Cancelling again is a no-op, not an error
    let removed = db
        .registrations
        .delete_by_event_and_user(event.id, user_id)
        .await
        .unwrap();
    assert!(!removed);
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn concurrent_registrations_cannot_exceed_capacity() {
    let test_db = TestDatabase::new().await.unwrap();
    let db = DatabaseService::new(test_db.pool.clone());
    // 3 spots, two concurrent parties of 2: only one fits
    let (event, _) = seed_event(&db, Some(3), &[]).await;

    let (a, b) = {
        let db_a = db.clone();
        let db_b = db.clone();
        let event_id = event.id;
        tokio::join!(
            tokio::spawn(async move {
                db_a.registrations
                    .create_with_claims(event_id, Uuid::new_v4(), 1, &[])
                    .await
            }),
            tokio::spawn(async move {
                db_b.registrations
                    .create_with_claims(event_id, Uuid::new_v4(), 1, &[])
                    .await
            }),
        )
    };
    let outcomes = [a.unwrap(), b.unwrap()];

    let admitted = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(admitted, 1);
    let rejection = outcomes.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_matches!(
        rejection,
        GatherBuddyError::CapacityExceeded {
            spots_left: 1,
            party_size: 2
        }
    );

    assert_eq!(db.registrations.total_attendees(event.id).await.unwrap(), 2);
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn concurrent_claims_cannot_exceed_item_quantity() {
    let test_db = TestDatabase::new().await.unwrap();
    let db = DatabaseService::new(test_db.pool.clone());
    let (event, items) = seed_event(&db, None, &[1]).await;
    let item_id = items[0].id;

    let (a, b) = {
        let db_a = db.clone();
        let db_b = db.clone();
        let event_id = event.id;
        let selection = MenuSelection {
            menu_item_id: item_id,
            quantity: 1,
        };
        tokio::join!(
            tokio::spawn(async move {
                db_a.registrations
                    .create_with_claims(event_id, Uuid::new_v4(), 0, &[selection])
                    .await
            }),
            tokio::spawn(async move {
                db_b.registrations
                    .create_with_claims(event_id, Uuid::new_v4(), 0, &[selection])
                    .await
            }),
        )
    };
    let outcomes = [a.unwrap(), b.unwrap()];

    let admitted = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(admitted, 1);
    let rejection = outcomes.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_matches!(rejection, GatherBuddyError::ItemOvercommitted { .. });

    // The loser's registration rolled back with its claim
    assert_eq!(registration_count(&test_db.pool, event.id).await, 1);
    assert_eq!(claim_count(&test_db.pool, item_id).await, 1);
}
