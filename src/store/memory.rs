//! In-memory [`DataStore`] used by the unit and router tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        Comment, CommentRow, CommentVote, ProfileChanges, RatedPost, Subscription, User, UserRole,
        VOTE_SCORE_KEY, VOTE_STAMP_KEY, VoteCastRow, VoteReceivedRow,
    },
    store::DataStore,
};

struct MemoryPost {
    id: Uuid,
    author_id: Uuid,
    title: String,
    content: String,
    published: bool,
}

struct MemorySubscription {
    email: String,
    subscription: Subscription,
}

struct MemoryRating {
    user_id: Uuid,
    post_id: Uuid,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct MemoryData {
    users: Vec<User>,
    user_meta: HashMap<(Uuid, String), String>,
    posts: Vec<MemoryPost>,
    comments: Vec<Comment>,
    comment_meta: HashMap<(Uuid, String), String>,
    votes: Vec<CommentVote>,
    subscriptions: Option<Vec<MemorySubscription>>,
    ratings: Option<Vec<MemoryRating>>,
    settings: HashMap<String, serde_json::Value>,
    meta_writes: Vec<(Uuid, String, String)>,
    profile_update_failure: Option<String>,
}

impl MemoryData {
    fn post_title(&self, post_id: Uuid) -> String {
        self.posts
            .iter()
            .find(|p| p.id == post_id)
            .map(|p| p.title.clone())
            .unwrap_or_default()
    }

    fn comment_row(&self, comment: &Comment) -> CommentRow {
        CommentRow {
            id: comment.id,
            post_id: comment.post_id,
            post_title: self.post_title(comment.post_id),
            content: comment.content.clone(),
            created_at: comment.created_at,
        }
    }

    fn newest_rows<'a>(
        &self,
        comments: impl Iterator<Item = &'a Comment>,
        limit: i64,
    ) -> Vec<CommentRow> {
        let mut matching: Vec<&Comment> = comments.collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|c| self.comment_row(c))
            .collect()
    }
}

/// Optional tables (subscriptions, ratings) start out absent.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<MemoryData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> std::sync::MutexGuard<'_, MemoryData> {
        self.data.lock().expect("memory store lock poisoned")
    }

    pub fn add_user(&self, username: &str, email: &str, role: UserRole) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.data().users.push(User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            display_name: username.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            url: String::new(),
            description: String::new(),
            password_hash: None,
            role,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn user(&self, user_id: Uuid) -> User {
        self.data()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .expect("user exists")
    }

    pub fn add_post(&self, author_id: Uuid, title: &str, content: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.data().posts.push(MemoryPost {
            id,
            author_id,
            title: title.to_string(),
            content: content.to_string(),
            published: true,
        });
        id
    }

    pub fn add_draft(&self, author_id: Uuid, title: &str, content: &str) -> Uuid {
        let id = self.add_post(author_id, title, content);
        if let Some(post) = self.data().posts.iter_mut().find(|p| p.id == id) {
            post.published = false;
        }
        id
    }

    pub fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Option<Uuid>,
        parent_id: Option<Uuid>,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.data().comments.push(Comment {
            id,
            post_id,
            author_id,
            parent_id,
            content: content.to_string(),
            approved: true,
            created_at,
        });
        id
    }

    pub fn unapprove(&self, comment_id: Uuid) {
        if let Some(comment) = self.data().comments.iter_mut().find(|c| c.id == comment_id) {
            comment.approved = false;
        }
    }

    pub fn add_vote(&self, comment_id: Uuid, voter_id: Uuid, score: i16, cast_at: DateTime<Utc>) {
        self.data().votes.push(CommentVote {
            comment_id,
            voter_id,
            score,
            cast_at,
        });
    }

    pub fn put_comment_meta(&self, comment_id: Uuid, key: &str, value: &str) {
        self.data()
            .comment_meta
            .insert((comment_id, key.to_string()), value.to_string());
    }

    pub fn comment_meta(&self, comment_id: Uuid, key: &str) -> Option<String> {
        self.data()
            .comment_meta
            .get(&(comment_id, key.to_string()))
            .cloned()
    }

    pub fn meta_writes(&self) -> Vec<(Uuid, String, String)> {
        self.data().meta_writes.clone()
    }

    pub fn create_subscriptions_table(&self) {
        self.data().subscriptions.get_or_insert_with(Vec::new);
    }

    pub fn add_subscription(
        &self,
        email: &str,
        post_id: Uuid,
        subscription_type: Option<&str>,
        created_at: DateTime<Utc>,
    ) {
        let mut data = self.data();
        let post_title = data.post_title(post_id);
        data.subscriptions
            .get_or_insert_with(Vec::new)
            .push(MemorySubscription {
                email: email.to_string(),
                subscription: Subscription {
                    id: Uuid::new_v4(),
                    post_id,
                    post_title,
                    subscription_type: subscription_type.map(str::to_string),
                    created_at,
                },
            });
    }

    pub fn create_ratings_table(&self) {
        self.data().ratings.get_or_insert_with(Vec::new);
    }

    pub fn add_rating(&self, user_id: Uuid, post_id: Uuid, created_at: DateTime<Utc>) {
        self.data()
            .ratings
            .get_or_insert_with(Vec::new)
            .push(MemoryRating {
                user_id,
                post_id,
                created_at,
            });
    }

    pub fn fail_profile_updates(&self, message: &str) {
        self.data().profile_update_failure = Some(message.to_string());
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.data().users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_user_id_by_email(&self, email: &str) -> Result<Option<Uuid>> {
        Ok(self
            .data()
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .map(|u| u.id))
    }

    async fn update_user_profile(&self, user_id: Uuid, changes: &ProfileChanges) -> Result<()> {
        let mut data = self.data();
        if let Some(message) = &data.profile_update_failure {
            return Err(AppError::UpstreamWrite(message.clone()));
        }
        if let Some(email) = &changes.email {
            if data
                .users
                .iter()
                .any(|u| u.id != user_id && u.email.eq_ignore_ascii_case(email))
            {
                return Err(AppError::Conflict("Email already in use.".to_string()));
            }
        }

        let user = data
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::UpstreamWrite("Invalid user ID.".to_string()))?;

        let apply = |target: &mut String, value: &Option<String>| {
            if let Some(value) = value {
                *target = value.clone();
            }
        };
        apply(&mut user.first_name, &changes.first_name);
        apply(&mut user.last_name, &changes.last_name);
        apply(&mut user.display_name, &changes.display_name);
        apply(&mut user.email, &changes.email);
        apply(&mut user.url, &changes.url);
        apply(&mut user.description, &changes.description);
        if changes.password_hash.is_some() {
            user.password_hash = changes.password_hash.clone();
        }
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn get_user_meta(&self, user_id: Uuid, key: &str) -> Result<Option<String>> {
        Ok(self.data().user_meta.get(&(user_id, key.to_string())).cloned())
    }

    async fn set_user_meta(&self, user_id: Uuid, key: &str, value: &str) -> Result<()> {
        self.data()
            .user_meta
            .insert((user_id, key.to_string()), value.to_string());
        Ok(())
    }

    async fn count_approved_comments(&self, user_id: Uuid) -> Result<i64> {
        Ok(self
            .data()
            .comments
            .iter()
            .filter(|c| c.author_id == Some(user_id) && c.approved)
            .count() as i64)
    }

    async fn total_karma(&self, user_id: Uuid) -> Result<i64> {
        let data = self.data();
        Ok(data
            .comments
            .iter()
            .filter(|c| c.author_id == Some(user_id))
            .filter_map(|c| data.comment_meta.get(&(c.id, VOTE_SCORE_KEY.to_string())))
            .filter_map(|v| v.parse::<i64>().ok())
            .sum())
    }

    async fn find_approved_comments(&self, user_id: Uuid, limit: i64) -> Result<Vec<CommentRow>> {
        let data = self.data();
        Ok(data.newest_rows(
            data.comments
                .iter()
                .filter(|c| c.author_id == Some(user_id) && c.approved),
            limit,
        ))
    }

    async fn find_votes_cast(&self, user_id: Uuid, limit: i64) -> Result<Vec<VoteCastRow>> {
        let data = self.data();
        let mut rows: Vec<VoteCastRow> = data
            .votes
            .iter()
            .filter(|v| v.voter_id == user_id)
            .filter_map(|v| {
                let comment = data
                    .comments
                    .iter()
                    .find(|c| c.id == v.comment_id && c.approved)?;
                Some(VoteCastRow {
                    comment_id: v.comment_id,
                    post_id: comment.post_id,
                    post_title: data.post_title(comment.post_id),
                    content: comment.content.clone(),
                    score: v.score,
                    cast_at: v.cast_at,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.cast_at.cmp(&a.cast_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn find_own_comment_ids(&self, user_id: Uuid, limit: i64) -> Result<Vec<Uuid>> {
        let data = self.data();
        let mut own: Vec<&Comment> = data
            .comments
            .iter()
            .filter(|c| c.author_id == Some(user_id))
            .collect();
        own.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(own
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|c| c.id)
            .collect())
    }

    async fn find_votes_received(
        &self,
        comment_ids: &[Uuid],
        limit: i64,
    ) -> Result<Vec<VoteReceivedRow>> {
        let data = self.data();
        let mut rows: Vec<VoteReceivedRow> = data
            .comments
            .iter()
            .filter(|c| comment_ids.contains(&c.id) && c.approved)
            .filter_map(|c| {
                let score = data
                    .comment_meta
                    .get(&(c.id, VOTE_SCORE_KEY.to_string()))?
                    .parse::<i64>()
                    .ok()?;
                Some(VoteReceivedRow {
                    comment_id: c.id,
                    post_id: c.post_id,
                    post_title: data.post_title(c.post_id),
                    content: c.content.clone(),
                    score,
                    stamped_at: data
                        .comment_meta
                        .get(&(c.id, VOTE_STAMP_KEY.to_string()))
                        .cloned(),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.stamped_at.cmp(&a.stamped_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn find_replies_to(
        &self,
        comment_ids: &[Uuid],
        exclude_user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<CommentRow>> {
        let data = self.data();
        Ok(data.newest_rows(
            data.comments.iter().filter(|c| {
                c.approved
                    && c.author_id != Some(exclude_user_id)
                    && c.parent_id.is_some_and(|p| comment_ids.contains(&p))
            }),
            limit,
        ))
    }

    async fn find_comments_on_posts_by(
        &self,
        author_id: Uuid,
        exclude_user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<CommentRow>> {
        let data = self.data();
        let own_posts: Vec<Uuid> = data
            .posts
            .iter()
            .filter(|p| p.author_id == author_id)
            .map(|p| p.id)
            .collect();
        Ok(data.newest_rows(
            data.comments.iter().filter(|c| {
                c.approved && c.author_id != Some(exclude_user_id) && own_posts.contains(&c.post_id)
            }),
            limit,
        ))
    }

    async fn find_subscriptions(
        &self,
        email: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Subscription>> {
        let data = self.data();
        let Some(table) = &data.subscriptions else {
            return Ok(Vec::new());
        };
        let mut rows: Vec<Subscription> = table
            .iter()
            .filter(|s| s.email == email)
            .map(|s| s.subscription.clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn find_ratings(&self, user_id: Uuid, limit: i64, offset: i64) -> Result<Vec<RatedPost>> {
        let data = self.data();
        let Some(table) = &data.ratings else {
            return Ok(Vec::new());
        };
        let mut rows: Vec<&MemoryRating> = table.iter().filter(|r| r.user_id == user_id).collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|r| RatedPost {
                post_id: r.post_id,
                post_title: data.post_title(r.post_id),
            })
            .collect())
    }

    async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        Ok(self
            .data()
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .cloned())
    }

    async fn get_post_author(&self, post_id: Uuid) -> Result<Option<Uuid>> {
        Ok(self
            .data()
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .map(|p| p.author_id))
    }

    async fn upsert_comment_vote(
        &self,
        comment_id: Uuid,
        voter_id: Uuid,
        score: i16,
    ) -> Result<()> {
        let mut data = self.data();
        data.votes
            .retain(|v| !(v.comment_id == comment_id && v.voter_id == voter_id));
        data.votes.push(CommentVote {
            comment_id,
            voter_id,
            score,
            cast_at: Utc::now(),
        });
        Ok(())
    }

    async fn delete_comment_vote(&self, comment_id: Uuid, voter_id: Uuid) -> Result<()> {
        self.data()
            .votes
            .retain(|v| !(v.comment_id == comment_id && v.voter_id == voter_id));
        Ok(())
    }

    async fn comment_vote_total(&self, comment_id: Uuid) -> Result<i64> {
        Ok(self
            .data()
            .votes
            .iter()
            .filter(|v| v.comment_id == comment_id)
            .map(|v| i64::from(v.score))
            .sum())
    }

    async fn set_comment_meta(&self, comment_id: Uuid, key: &str, value: &str) -> Result<()> {
        let mut data = self.data();
        data.meta_writes
            .push((comment_id, key.to_string(), value.to_string()));
        data.comment_meta
            .insert((comment_id, key.to_string()), value.to_string());
        Ok(())
    }

    async fn count_published_posts(&self, author_id: Uuid) -> Result<i64> {
        Ok(self
            .data()
            .posts
            .iter()
            .filter(|p| p.author_id == author_id && p.published)
            .count() as i64)
    }

    async fn published_post_contents(&self, author_id: Uuid) -> Result<Vec<String>> {
        Ok(self
            .data()
            .posts
            .iter()
            .filter(|p| p.author_id == author_id && p.published)
            .map(|p| p.content.clone())
            .collect())
    }

    async fn load_settings(&self, name: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.data().settings.get(name).cloned())
    }

    async fn save_settings(&self, name: &str, value: &serde_json::Value) -> Result<()> {
        self.data().settings.insert(name.to_string(), value.clone());
        Ok(())
    }
}
