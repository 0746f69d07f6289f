use uuid::Uuid;

use crate::{error::Result, models::NOTIFY_NEW_COMMENTS_KEY, store::DataStore};

/// Gate the host consults before mailing a post author about a new comment.
///
/// Only an explicit `"0"` opt-out on the author turns the mail off; in every
/// other case the host's own decision stands.
pub async fn should_notify_post_author(
    store: &dyn DataStore,
    comment_id: Uuid,
    default: bool,
) -> Result<bool> {
    let Some(comment) = store.get_comment(comment_id).await? else {
        return Ok(default);
    };
    let Some(author_id) = store.get_post_author(comment.post_id).await? else {
        return Ok(default);
    };

    let preference = store.get_user_meta(author_id, NOTIFY_NEW_COMMENTS_KEY).await?;
    if preference.as_deref() == Some("0") {
        tracing::debug!(comment_id = %comment_id, author_id = %author_id, "Author opted out of comment mail");
        return Ok(false);
    }

    Ok(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::UserRole, store::memory::MemoryStore};
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    #[case(None, true, true)]
    #[case(None, false, false)]
    #[case(Some("1"), true, true)]
    #[case(Some("1"), false, false)]
    #[case(Some("0"), true, false)]
    #[tokio::test]
    async fn only_an_explicit_opt_out_suppresses_mail(
        #[case] preference: Option<&str>,
        #[case] default: bool,
        #[case] expected: bool,
    ) {
        let store = MemoryStore::new();
        let author = store.add_user("ava", "ava@example.com", UserRole::Author);
        let post = store.add_post(author, "Post", "body");
        let comment = store.add_comment(post, None, None, "hi", Utc::now());
        if let Some(value) = preference {
            store.set_user_meta(author, NOTIFY_NEW_COMMENTS_KEY, value).await.unwrap();
        }

        assert_eq!(
            should_notify_post_author(&store, comment, default).await.unwrap(),
            expected
        );
    }

    #[tokio::test]
    async fn unknown_comment_keeps_the_default() {
        let store = MemoryStore::new();
        assert!(should_notify_post_author(&store, Uuid::new_v4(), true).await.unwrap());
    }
}
