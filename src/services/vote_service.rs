//! Comment voting and the comment-meta write path it runs through.
//!
//! Writing a comment's vote score fires an after-write hook that stamps the
//! moment of the vote into separate meta, which is what the activity feed
//! sorts vote events by. The stamp itself is written through the same path
//! under a suppressed [`WriteContext`], so it cannot fire the hook again.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{VOTE_SCORE_KEY, VOTE_STAMP_FORMAT, VOTE_STAMP_KEY, VoteResponse},
    store::DataStore,
};

/// Call-scoped switch carried down one write; dropped when the write returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteContext {
    suppress_hooks: bool,
}

impl WriteContext {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn suppressed(self) -> Self {
        Self {
            suppress_hooks: true,
        }
    }

    pub fn hooks_suppressed(self) -> bool {
        self.suppress_hooks
    }
}

pub fn update_comment_meta<'a>(
    store: &'a dyn DataStore,
    ctx: WriteContext,
    comment_id: Uuid,
    key: &'a str,
    value: &'a str,
    now: DateTime<Utc>,
) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
    Box::pin(async move {
        store.set_comment_meta(comment_id, key, value).await?;

        if ctx.hooks_suppressed() {
            return Ok(());
        }

        after_comment_meta_written(store, ctx, comment_id, key, now).await
    })
}

async fn after_comment_meta_written(
    store: &dyn DataStore,
    ctx: WriteContext,
    comment_id: Uuid,
    key: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    if key == VOTE_SCORE_KEY {
        record_vote_timestamp(store, ctx.suppressed(), comment_id, now).await?;
    }
    Ok(())
}

/// Stamps when a vote landed on `comment_id`, in the fixed-width UTC format.
pub async fn record_vote_timestamp(
    store: &dyn DataStore,
    ctx: WriteContext,
    comment_id: Uuid,
    at: DateTime<Utc>,
) -> Result<()> {
    let stamp = at.format(VOTE_STAMP_FORMAT).to_string();

    update_comment_meta(store, ctx, comment_id, VOTE_STAMP_KEY, &stamp, at).await?;

    tracing::debug!(comment_id = %comment_id, stamp = %stamp, "Vote time stamped");
    Ok(())
}

/// Applies a vote (`-1`, `1`, or `0` to withdraw) and refreshes the comment's score.
pub async fn vote_comment(
    store: &dyn DataStore,
    voter_id: Uuid,
    comment_id: Uuid,
    vote_type: i16,
    now: DateTime<Utc>,
) -> Result<VoteResponse> {
    if ![-1, 0, 1].contains(&vote_type) {
        return Err(AppError::BadRequest("Invalid vote type".to_string()));
    }

    let comment = store
        .get_comment(comment_id)
        .await?
        .filter(|c| c.approved)
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    if comment.author_id == Some(voter_id) {
        return Err(AppError::BadRequest(
            "Cannot vote on your own comment".to_string(),
        ));
    }

    if vote_type == 0 {
        store.delete_comment_vote(comment_id, voter_id).await?;
    } else {
        store
            .upsert_comment_vote(comment_id, voter_id, vote_type)
            .await?;
    }

    let score = store.comment_vote_total(comment_id).await?;
    update_comment_meta(
        store,
        WriteContext::root(),
        comment_id,
        VOTE_SCORE_KEY,
        &score.to_string(),
        now,
    )
    .await?;

    tracing::info!(comment_id = %comment_id, voter_id = %voter_id, score, "Comment vote recorded");

    Ok(VoteResponse {
        user_vote: (vote_type != 0).then_some(vote_type),
        score,
        stamped_at: now,
    })
}
