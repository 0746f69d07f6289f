//! Short-lived key/value state: attempt counters and login sessions.

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait EphemeralStore: Send + Sync {
    /// Current value of a counter; absent or expired counters read as 0.
    async fn get_counter(&self, key: &str) -> Result<i64>;

    async fn set_counter(&self, key: &str, value: i64, ttl_seconds: u64) -> Result<()>;

    /// Adds one and restarts the expiry clock in a single step, returning the new value.
    async fn increment(&self, key: &str, ttl_seconds: u64) -> Result<i64>;

    /// Seconds until `key` expires, `None` when it is absent or has no expiry.
    async fn ttl(&self, key: &str) -> Result<Option<u64>>;

    async fn get_session(&self, session_id: &str) -> Result<Option<String>>;

    async fn delete_session(&self, session_id: &str) -> Result<()>;
}
