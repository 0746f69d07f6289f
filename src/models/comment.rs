use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// A comment joined with the title of the post it was left on.
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub post_title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comment meta key holding the net vote score of a comment.
pub const VOTE_SCORE_KEY: &str = "vote_score";

/// Comment meta key holding the time the latest vote landed on a comment.
pub const VOTE_STAMP_KEY: &str = "dpi_vote_time";

/// Storage format of the vote stamp; fixed width so text order equals time order.
pub const VOTE_STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
