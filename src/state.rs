use std::sync::Arc;

use tracing::info;

use crate::{
    config::{Config, StoreBackend},
    store::{MemoryStore, RedisStore, Store},
};

pub struct AppState {
    pub config: Config,
    pub store: Box<dyn Store>,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let store: Box<dyn Store> = match config.store_backend {
            StoreBackend::Memory => {
                info!("Using in-memory store");
                Box::new(MemoryStore::new())
            }
            StoreBackend::Redis => {
                info!("Connecting to redis at {}", config.redis_url);
                Box::new(RedisStore::connect(&config.redis_url).await)
            }
        };

        Arc::new(Self { config, store })
    }

    pub fn with_store(config: Config, store: Box<dyn Store>) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}
