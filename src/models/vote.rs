use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentVote {
    pub comment_id: Uuid,
    pub voter_id: Uuid,
    pub score: i16, // -1 for downvote, 1 for upvote
    pub cast_at: DateTime<Utc>,
}

/// A vote the user cast, joined with the comment and post it targeted.
#[derive(Debug, Clone, FromRow)]
pub struct VoteCastRow {
    pub comment_id: Uuid,
    pub post_id: Uuid,
    pub post_title: String,
    pub content: String,
    pub score: i16,
    pub cast_at: DateTime<Utc>,
}

/// Net score of one of the user's comments plus its raw vote stamp.
#[derive(Debug, Clone, FromRow)]
pub struct VoteReceivedRow {
    pub comment_id: Uuid,
    pub post_id: Uuid,
    pub post_title: String,
    pub content: String,
    pub score: i64,
    pub stamped_at: Option<String>,
}

// Vote request
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub vote_type: i16, // -1 for downvote, 0 for remove vote, 1 for upvote
}

// Vote response
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub user_vote: Option<i16>,
    pub score: i64,
    pub stamped_at: DateTime<Utc>,
}
