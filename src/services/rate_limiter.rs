//! Per-user attempt limiter over a rolling window.
//!
//! Every accepted attempt pushes the expiry back by the full window, so the
//! counter only clears after a quiet period of `window_seconds` following the
//! most recent attempt. A rejection never touches the counter.

use std::sync::Arc;
use uuid::Uuid;

use crate::{config::Config, ephemeral::EphemeralStore, error::Result};

const PASSWORD_KEY_PREFIX: &str = "dpi_pw";
const VOTE_KEY_PREFIX: &str = "comment_vote";
const VOTE_MAX_ATTEMPTS: u32 = 30;
const VOTE_WINDOW_SECONDS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimiterState {
    Fresh,
    Warned(u32),
    Exhausted(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    Allowed { attempt: u32 },
    Denied { retry_after: Option<u64> },
}

#[derive(Clone)]
pub struct AttemptLimiter {
    store: Arc<dyn EphemeralStore>,
    prefix: &'static str,
    max_attempts: u32,
    window_seconds: u64,
}

impl AttemptLimiter {
    pub fn new(
        store: Arc<dyn EphemeralStore>,
        prefix: &'static str,
        max_attempts: u32,
        window_seconds: u64,
    ) -> Self {
        Self {
            store,
            prefix,
            max_attempts,
            window_seconds,
        }
    }

    pub fn password_changes(store: Arc<dyn EphemeralStore>, config: &Config) -> Self {
        Self::new(
            store,
            PASSWORD_KEY_PREFIX,
            config.password_max_attempts,
            config.password_window_seconds,
        )
    }

    pub fn comment_votes(store: Arc<dyn EphemeralStore>) -> Self {
        Self::new(store, VOTE_KEY_PREFIX, VOTE_MAX_ATTEMPTS, VOTE_WINDOW_SECONDS)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn window_seconds(&self) -> u64 {
        self.window_seconds
    }

    fn key(&self, user_id: Uuid) -> String {
        format!("{}:{}", self.prefix, user_id)
    }

    pub fn state_for(&self, count: u32) -> LimiterState {
        match count {
            0 => LimiterState::Fresh,
            n if n >= self.max_attempts => LimiterState::Exhausted(n),
            n => LimiterState::Warned(n),
        }
    }

    /// Read-only; never consumes an attempt.
    pub async fn attempts(&self, user_id: Uuid) -> Result<u32> {
        let count = self.store.get_counter(&self.key(user_id)).await?;
        Ok(u32::try_from(count).unwrap_or(0))
    }

    pub async fn increment(&self, user_id: Uuid) -> Result<u32> {
        let count = self
            .store
            .increment(&self.key(user_id), self.window_seconds)
            .await?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// Rejects without consuming when the cap is reached, otherwise consumes one
    /// attempt. The read and the increment are separate round trips, so two
    /// concurrent requests can both pass at `max - 1`.
    pub async fn check_and_reserve(&self, user_id: Uuid) -> Result<Reservation> {
        let current = self.attempts(user_id).await?;

        if let LimiterState::Exhausted(count) = self.state_for(current) {
            let retry_after = self.store.ttl(&self.key(user_id)).await?;
            tracing::warn!(
                user_id = %user_id,
                limiter = self.prefix,
                attempts = count,
                "Attempt limit reached"
            );
            return Ok(Reservation::Denied { retry_after });
        }

        let attempt = self.increment(user_id).await?;
        tracing::debug!(user_id = %user_id, limiter = self.prefix, attempt, "Attempt reserved");

        Ok(Reservation::Allowed { attempt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeral::memory::MemoryEphemeralStore;
    use chrono::Duration;
    use rstest::rstest;

    fn limiter(store: &Arc<MemoryEphemeralStore>) -> AttemptLimiter {
        AttemptLimiter::password_changes(store.clone(), &Config::for_tests())
    }

    #[rstest]
    #[case(0, LimiterState::Fresh)]
    #[case(1, LimiterState::Warned(1))]
    #[case(2, LimiterState::Warned(2))]
    #[case(3, LimiterState::Exhausted(3))]
    #[case(7, LimiterState::Exhausted(7))]
    fn classifies_counts(#[case] count: u32, #[case] expected: LimiterState) {
        let store = Arc::new(MemoryEphemeralStore::new());
        assert_eq!(limiter(&store).state_for(count), expected);
    }

    #[tokio::test]
    async fn fourth_attempt_in_window_is_denied_without_consuming() {
        let store = Arc::new(MemoryEphemeralStore::new());
        let limiter = limiter(&store);
        let user = Uuid::new_v4();

        for expected in 1..=3 {
            assert_eq!(
                limiter.check_and_reserve(user).await.unwrap(),
                Reservation::Allowed { attempt: expected }
            );
        }

        let denied = limiter.check_and_reserve(user).await.unwrap();
        assert!(matches!(denied, Reservation::Denied { retry_after: Some(s) } if s > 0 && s <= 3600));
        assert_eq!(limiter.attempts(user).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn window_is_measured_from_the_last_attempt() {
        let store = Arc::new(MemoryEphemeralStore::new());
        let limiter = limiter(&store);
        let user = Uuid::new_v4();

        limiter.check_and_reserve(user).await.unwrap();
        store.advance(Duration::minutes(50));
        limiter.check_and_reserve(user).await.unwrap();
        store.advance(Duration::minutes(50));
        limiter.check_and_reserve(user).await.unwrap();

        // 100 minutes after the first attempt but only 20 after the third
        store.advance(Duration::minutes(20));
        assert!(matches!(
            limiter.check_and_reserve(user).await.unwrap(),
            Reservation::Denied { .. }
        ));

        store.advance(Duration::minutes(41));
        assert_eq!(limiter.attempts(user).await.unwrap(), 0);
        assert_eq!(
            limiter.check_and_reserve(user).await.unwrap(),
            Reservation::Allowed { attempt: 1 }
        );
    }

    #[tokio::test]
    async fn counters_are_per_user() {
        let store = Arc::new(MemoryEphemeralStore::new());
        let limiter = limiter(&store);
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        for _ in 0..3 {
            limiter.increment(alice).await.unwrap();
        }

        assert_eq!(
            limiter.check_and_reserve(bob).await.unwrap(),
            Reservation::Allowed { attempt: 1 }
        );
    }
}
