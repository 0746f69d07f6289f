use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{ephemeral::EphemeralStore, error::Result};

#[derive(Clone)]
pub struct RedisClient {
    manager: Arc<Mutex<ConnectionManager>>,
}

impl RedisClient {
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self {
            manager: Arc::new(Mutex::new(manager)),
        })
    }
}

fn session_key(session_id: &str) -> String {
    format!("session:{}", session_id)
}

#[async_trait]
impl EphemeralStore for RedisClient {
    async fn get_counter(&self, key: &str) -> Result<i64> {
        let mut conn = self.manager.lock().await;
        let current: Option<i64> = conn.get(key).await?;
        Ok(current.unwrap_or(0))
    }

    async fn set_counter(&self, key: &str, value: i64, ttl_seconds: u64) -> Result<()> {
        let mut conn = self.manager.lock().await;
        let _: () = conn.set_ex(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn increment(&self, key: &str, ttl_seconds: u64) -> Result<i64> {
        let mut conn = self.manager.lock().await;

        // MULTI/EXEC so the bump and the expiry reset land together
        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, ttl_seconds as i64)
            .ignore()
            .query_async(&mut *conn)
            .await?;

        Ok(count)
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>> {
        let mut conn = self.manager.lock().await;
        let remaining: i64 = conn.ttl(key).await?;

        // -2 means missing, -1 means no expiry
        Ok(u64::try_from(remaining).ok())
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<String>> {
        let mut conn = self.manager.lock().await;
        let user_id: Option<String> = conn.get(session_key(session_id)).await?;
        Ok(user_id)
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        let mut conn = self.manager.lock().await;
        let _: () = conn.del(session_key(session_id)).await?;
        Ok(())
    }
}
