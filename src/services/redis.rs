//! Redis backend for the borrow/return staging carts

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};

use crate::{
    config::RedisConfig,
    error::{AppError, AppResult},
    models::cart::{CartItem, CartSlot, CartUser},
    services::staging::CartStore,
};

/// Placeholder written over an item before LREM drops it
const REMOVED_MARKER: &str = "__removed__";

#[derive(Clone)]
pub struct RedisService {
    manager: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisService {
    /// Connect to Redis and verify the connection
    pub async fn new(config: &RedisConfig) -> AppResult<Self> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let mut manager = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut manager)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self {
            manager,
            ttl_seconds: config.cart_ttl_seconds,
        })
    }

    /// Readiness check
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.manager.clone();
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }

    fn encode<T: serde::Serialize>(value: &T) -> AppResult<String> {
        serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Failed to encode cart entry: {}", e)))
    }
}

#[async_trait]
impl CartStore for RedisService {
    async fn set_user(&self, slot: CartSlot, user: CartUser) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let payload = Self::encode(&user)?;

        redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(slot.user_key())
            .arg(payload)
            .arg("EX")
            .arg(self.ttl_seconds)
            .ignore()
            .cmd("EXPIRE")
            .arg(slot.items_key())
            .arg(self.ttl_seconds)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn get_user(&self, slot: CartSlot) -> AppResult<Option<CartUser>> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = conn.get(slot.user_key()).await?;

        raw.map(|s| {
            serde_json::from_str(&s)
                .map_err(|e| AppError::Internal(format!("Corrupt {} cart user: {}", slot, e)))
        })
        .transpose()
    }

    async fn push_item(&self, slot: CartSlot, item: CartItem) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let payload = Self::encode(&item)?;

        redis::pipe()
            .atomic()
            .cmd("RPUSH")
            .arg(slot.items_key())
            .arg(payload)
            .ignore()
            .cmd("EXPIRE")
            .arg(slot.items_key())
            .arg(self.ttl_seconds)
            .ignore()
            .cmd("EXPIRE")
            .arg(slot.user_key())
            .arg(self.ttl_seconds)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn items(&self, slot: CartSlot) -> AppResult<Vec<CartItem>> {
        let mut conn = self.manager.clone();
        let raw: Vec<String> = conn.lrange(slot.items_key(), 0, -1).await?;

        let items = raw
            .iter()
            .filter_map(|s| match serde_json::from_str::<CartItem>(s) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(%slot, "Dropping unreadable cart item: {}", e);
                    None
                }
            })
            .collect();
        Ok(items)
    }

    async fn remove_item(&self, slot: CartSlot, index: usize) -> AppResult<()> {
        let mut conn = self.manager.clone();

        // Redis lists have no remove-by-index: mark the position, then drop the mark
        redis::pipe()
            .atomic()
            .cmd("LSET")
            .arg(slot.items_key())
            .arg(index)
            .arg(REMOVED_MARKER)
            .ignore()
            .cmd("LREM")
            .arg(slot.items_key())
            .arg(1)
            .arg(REMOVED_MARKER)
            .ignore()
            .cmd("EXPIRE")
            .arg(slot.items_key())
            .arg(self.ttl_seconds)
            .ignore()
            .cmd("EXPIRE")
            .arg(slot.user_key())
            .arg(self.ttl_seconds)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn clear(&self, slot: CartSlot) -> AppResult<()> {
        let mut conn = self.manager.clone();
        redis::cmd("DEL")
            .arg(slot.user_key())
            .arg(slot.items_key())
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}
