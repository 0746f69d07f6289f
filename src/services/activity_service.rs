//! Activity feed: the user's comments, votes, replies and comments left on
//! their posts, merged newest first and paged.
//!
//! Each source is fetched with its own cap and only then merged and sliced, so
//! the caps bound the merge cost rather than implementing pagination. Pages
//! deep enough to run past the caps come back empty.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{ActivityEvent, VOTE_STAMP_FORMAT},
    pagination::{Page, PageIndex, slice_page},
    store::DataStore,
};

const OWN_COMMENTS_CAP: i64 = 100;
const VOTES_CAST_CAP: i64 = 100;
const VOTES_RECEIVED_CAP: i64 = 100;
const OWN_COMMENT_IDS_CAP: i64 = 500;
const REPLIES_CAP: i64 = 50;
const AUTHOR_COMMENTS_CAP: i64 = 50;

pub async fn get_activity(
    store: &dyn DataStore,
    user_id: Uuid,
    page: PageIndex,
    page_size: usize,
) -> Result<Page<ActivityEvent>> {
    let batches = collect_activity(store, user_id).await?;
    let merged = merge_newest_first(batches);
    let items = slice_page(merged, page, page_size);

    tracing::debug!(
        user_id = %user_id,
        page = page.get(),
        returned = items.len(),
        "Activity page assembled"
    );

    Ok(Page::new(items, page, page_size))
}

async fn collect_activity(store: &dyn DataStore, user_id: Uuid) -> Result<Vec<Vec<ActivityEvent>>> {
    let (own_comments, votes_cast, own_ids, author_comments) = futures::try_join!(
        store.find_approved_comments(user_id, OWN_COMMENTS_CAP),
        store.find_votes_cast(user_id, VOTES_CAST_CAP),
        store.find_own_comment_ids(user_id, OWN_COMMENT_IDS_CAP),
        store.find_comments_on_posts_by(user_id, user_id, AUTHOR_COMMENTS_CAP),
    )?;

    let (votes_received, replies) = if own_ids.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        futures::try_join!(
            store.find_votes_received(&own_ids, VOTES_RECEIVED_CAP),
            store.find_replies_to(&own_ids, user_id, REPLIES_CAP),
        )?
    };

    let received = votes_received
        .into_iter()
        .filter(|row| row.score != 0)
        .filter_map(|row| {
            let voted_at = row.stamped_at.as_deref().and_then(parse_vote_stamp)?;
            Some(ActivityEvent::vote_received(row, voted_at))
        })
        .collect();

    Ok(vec![
        own_comments.into_iter().map(ActivityEvent::comment).collect(),
        received,
        votes_cast.into_iter().map(ActivityEvent::vote_cast).collect(),
        replies.into_iter().map(ActivityEvent::reply_received).collect(),
        author_comments
            .into_iter()
            .map(ActivityEvent::author_comment)
            .collect(),
    ])
}

/// Vote stamps are stored as UTC `YYYY-MM-DD HH:MM:SS`; anything else is skipped.
pub fn parse_vote_stamp(raw: &str) -> Option<DateTime<Utc>> {
    match NaiveDateTime::parse_from_str(raw.trim(), VOTE_STAMP_FORMAT) {
        Ok(naive) => Some(naive.and_utc()),
        Err(e) => {
            tracing::warn!(stamp = raw, error = %e, "Ignoring malformed vote stamp");
            None
        }
    }
}

/// Newest first. Equal timestamps fall back to kind priority and then comment
/// id, so the order never depends on how the sources happened to be fetched.
pub fn merge_newest_first(batches: Vec<Vec<ActivityEvent>>) -> Vec<ActivityEvent> {
    let mut merged: Vec<ActivityEvent> = batches.into_iter().flatten().collect();
    merged.sort_by(compare_events);
    merged
}

fn compare_events(a: &ActivityEvent, b: &ActivityEvent) -> Ordering {
    b.sort_key
        .cmp(&a.sort_key)
        .then_with(|| a.kind.priority().cmp(&b.kind.priority()))
        .then_with(|| a.comment_id.cmp(&b.comment_id))
}
