//! Database service bundling all repositories

use sqlx::PgPool;

use super::repositories::{
    EventRepository, FoodItemRepository, ProfileRepository, RegistrationRepository,
};

/// Aggregated access point to all repositories, sharing one pool
#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub events: EventRepository,
    pub food_items: FoodItemRepository,
    pub registrations: RegistrationRepository,
    pub profiles: ProfileRepository,
}

impl DatabaseService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            food_items: FoodItemRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            profiles: ProfileRepository::new(pool),
        }
    }
}
