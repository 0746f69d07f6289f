use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    models::{CommentRow, VoteCastRow, VoteReceivedRow},
    utils::trim_words,
};

const SNIPPET_WORDS: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Comment,
    VoteCast,
    VoteReceived,
    ReplyReceived,
    AuthorComment,
}

impl ActivityKind {
    /// Tie-break rank for events sharing a timestamp; lower sorts first.
    pub fn priority(self) -> u8 {
        match self {
            ActivityKind::Comment => 0,
            ActivityKind::ReplyReceived => 1,
            ActivityKind::AuthorComment => 2,
            ActivityKind::VoteReceived => 3,
            ActivityKind::VoteCast => 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityPayload {
    Snippet { excerpt: String },
    Vote { score: i64 },
}

/// One entry of the activity feed. Built only through the constructors below.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    pub sort_key: DateTime<Utc>,
    pub comment_id: Uuid,
    pub post_id: Uuid,
    pub post_title: String,
    pub badge: String,
    pub payload: ActivityPayload,
}

impl ActivityEvent {
    pub fn comment(row: CommentRow) -> Self {
        Self::snippet(ActivityKind::Comment, "Comment", row)
    }

    pub fn reply_received(row: CommentRow) -> Self {
        Self::snippet(ActivityKind::ReplyReceived, "Reply received", row)
    }

    pub fn author_comment(row: CommentRow) -> Self {
        Self::snippet(ActivityKind::AuthorComment, "Comment on your post", row)
    }

    /// Sorted by the moment the vote was cast, never by the comment's age.
    pub fn vote_received(row: VoteReceivedRow, voted_at: DateTime<Utc>) -> Self {
        let badge = if row.score > 0 { "Upvoted" } else { "Downvoted" };
        Self {
            kind: ActivityKind::VoteReceived,
            sort_key: voted_at,
            comment_id: row.comment_id,
            post_id: row.post_id,
            post_title: row.post_title,
            badge: badge.to_string(),
            payload: ActivityPayload::Vote { score: row.score },
        }
    }

    pub fn vote_cast(row: VoteCastRow) -> Self {
        let badge = if row.score > 0 {
            "You upvoted"
        } else {
            "You downvoted"
        };
        Self {
            kind: ActivityKind::VoteCast,
            sort_key: row.cast_at,
            comment_id: row.comment_id,
            post_id: row.post_id,
            post_title: row.post_title,
            badge: badge.to_string(),
            payload: ActivityPayload::Vote {
                score: i64::from(row.score),
            },
        }
    }

    fn snippet(kind: ActivityKind, badge: &str, row: CommentRow) -> Self {
        Self {
            kind,
            sort_key: row.created_at,
            comment_id: row.id,
            post_id: row.post_id,
            post_title: row.post_title,
            badge: badge.to_string(),
            payload: ActivityPayload::Snippet {
                excerpt: trim_words(&row.content, SNIPPET_WORDS, "..."),
            },
        }
    }
}
