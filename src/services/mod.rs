//! Business logic services

pub mod catalog;
pub mod circulation;
pub mod locations;
pub mod redis;
pub mod staging;

use std::sync::Arc;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub locations: locations::LocationsService,
    pub staging: staging::StagingService,
    pub circulation: circulation::CirculationService,
    pub redis: redis::RedisService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository and cart backend
    pub fn new(repository: Repository, redis_service: redis::RedisService) -> Self {
        let carts: Arc<dyn staging::CartStore> = Arc::new(redis_service.clone());
        let store: Arc<dyn crate::repository::CirculationStore> =
            Arc::new(repository.circulation.clone());

        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            locations: locations::LocationsService::new(repository.clone()),
            staging: staging::StagingService::new(carts.clone(), store.clone()),
            circulation: circulation::CirculationService::new(carts, store),
            redis: redis_service,
            repository,
        }
    }

    /// Check both backing stores (readiness)
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        self.repository.ping().await?;
        self.redis.ping().await
    }
}
