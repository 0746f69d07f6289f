//! Persistence boundary of the dashboard.
//!
//! Everything the profile features read or write goes through [`DataStore`].
//! The production implementation is [`postgres::PgStore`]; tests use the
//! in-memory `memory::MemoryStore`.
//!
//! The store trusts the user ids it is handed. Callers must already have
//! resolved them from an authenticated session.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        Comment, CommentRow, ProfileChanges, RatedPost, Subscription, User, VoteCastRow,
        VoteReceivedRow,
    },
};

#[async_trait]
pub trait DataStore: Send + Sync {
    // Identity
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>>;
    async fn find_user_id_by_email(&self, email: &str) -> Result<Option<Uuid>>;
    async fn update_user_profile(&self, user_id: Uuid, changes: &ProfileChanges) -> Result<()>;
    async fn get_user_meta(&self, user_id: Uuid, key: &str) -> Result<Option<String>>;
    async fn set_user_meta(&self, user_id: Uuid, key: &str, value: &str) -> Result<()>;

    // Counters shown in the dashboard header
    async fn count_approved_comments(&self, user_id: Uuid) -> Result<i64>;
    async fn total_karma(&self, user_id: Uuid) -> Result<i64>;

    // Activity sources, each newest first and capped at `limit`
    async fn find_approved_comments(&self, user_id: Uuid, limit: i64) -> Result<Vec<CommentRow>>;
    async fn find_votes_cast(&self, user_id: Uuid, limit: i64) -> Result<Vec<VoteCastRow>>;
    async fn find_own_comment_ids(&self, user_id: Uuid, limit: i64) -> Result<Vec<Uuid>>;
    async fn find_votes_received(
        &self,
        comment_ids: &[Uuid],
        limit: i64,
    ) -> Result<Vec<VoteReceivedRow>>;
    async fn find_replies_to(
        &self,
        comment_ids: &[Uuid],
        exclude_user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<CommentRow>>;
    async fn find_comments_on_posts_by(
        &self,
        author_id: Uuid,
        exclude_user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<CommentRow>>;

    // Optional tables: a missing table is an empty list, not an error
    async fn find_subscriptions(
        &self,
        email: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Subscription>>;
    async fn find_ratings(&self, user_id: Uuid, limit: i64, offset: i64) -> Result<Vec<RatedPost>>;

    // Comments and votes
    async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>>;
    async fn get_post_author(&self, post_id: Uuid) -> Result<Option<Uuid>>;
    async fn upsert_comment_vote(&self, comment_id: Uuid, voter_id: Uuid, score: i16)
    -> Result<()>;
    async fn delete_comment_vote(&self, comment_id: Uuid, voter_id: Uuid) -> Result<()>;
    async fn comment_vote_total(&self, comment_id: Uuid) -> Result<i64>;
    async fn set_comment_meta(&self, comment_id: Uuid, key: &str, value: &str) -> Result<()>;

    // Author statistics
    async fn count_published_posts(&self, author_id: Uuid) -> Result<i64>;
    async fn published_post_contents(&self, author_id: Uuid) -> Result<Vec<String>>;

    // Settings blob
    async fn load_settings(&self, name: &str) -> Result<Option<serde_json::Value>>;
    async fn save_settings(&self, name: &str, value: &serde_json::Value) -> Result<()>;
}
