use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        Comment, CommentRow, ProfileChanges, RatedPost, Subscription, User, VOTE_SCORE_KEY,
        VOTE_STAMP_KEY, VoteCastRow, VoteReceivedRow,
    },
    store::DataStore,
};

const SUBSCRIPTIONS_TABLE: &str = "comment_subscriptions";
const RATINGS_TABLE: &str = "users_rated";

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn table_exists(&self, table: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT to_regclass($1::text) IS NOT NULL")
            .bind(table)
            .fetch_one(&self.db)
            .await?;

        Ok(exists)
    }
}

fn map_profile_write_error(error: sqlx::Error) -> AppError {
    match error {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
            AppError::Conflict("Email already in use.".to_string())
        }
        sqlx::Error::Database(db_error) => AppError::UpstreamWrite(db_error.message().to_string()),
        other => AppError::Database(other),
    }
}

#[async_trait]
impl DataStore for PgStore {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, display_name, first_name, last_name, url,
                   description, password_hash, role, created_at, updated_at
            FROM users WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn find_user_id_by_email(&self, email: &str) -> Result<Option<Uuid>> {
        let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(id)
    }

    async fn update_user_profile(&self, user_id: Uuid, changes: &ProfileChanges) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = COALESCE($1, first_name),
                last_name = COALESCE($2, last_name),
                display_name = COALESCE($3, display_name),
                email = COALESCE($4, email),
                url = COALESCE($5, url),
                description = COALESCE($6, description),
                password_hash = COALESCE($7, password_hash),
                updated_at = $8
            WHERE id = $9
            "#,
        )
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.display_name)
        .bind(&changes.email)
        .bind(&changes.url)
        .bind(&changes.description)
        .bind(&changes.password_hash)
        .bind(Utc::now())
        .bind(user_id)
        .execute(&self.db)
        .await
        .map_err(map_profile_write_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::UpstreamWrite("Invalid user ID.".to_string()));
        }

        Ok(())
    }

    async fn get_user_meta(&self, user_id: Uuid, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT meta_value FROM user_meta WHERE user_id = $1 AND meta_key = $2",
        )
        .bind(user_id)
        .bind(key)
        .fetch_optional(&self.db)
        .await?;

        Ok(value)
    }

    async fn set_user_meta(&self, user_id: Uuid, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_meta (user_id, meta_key, meta_value)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, meta_key)
            DO UPDATE SET meta_value = EXCLUDED.meta_value
            "#,
        )
        .bind(user_id)
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn count_approved_comments(&self, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM comments WHERE author_id = $1 AND approved",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    async fn total_karma(&self, user_id: Uuid) -> Result<i64> {
        let karma = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(CAST(m.meta_value AS BIGINT)), 0)::BIGINT
            FROM comment_meta m
            JOIN comments c ON m.comment_id = c.id
            WHERE c.author_id = $1 AND m.meta_key = $2
            "#,
        )
        .bind(user_id)
        .bind(VOTE_SCORE_KEY)
        .fetch_one(&self.db)
        .await?;

        Ok(karma)
    }

    async fn find_approved_comments(&self, user_id: Uuid, limit: i64) -> Result<Vec<CommentRow>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.post_id, p.title AS post_title, c.content, c.created_at
            FROM comments c
            JOIN posts p ON c.post_id = p.id
            WHERE c.author_id = $1 AND c.approved
            ORDER BY c.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn find_votes_cast(&self, user_id: Uuid, limit: i64) -> Result<Vec<VoteCastRow>> {
        let rows = sqlx::query_as::<_, VoteCastRow>(
            r#"
            SELECT v.comment_id, c.post_id, p.title AS post_title, c.content, v.score, v.cast_at
            FROM comment_votes v
            JOIN comments c ON v.comment_id = c.id
            JOIN posts p ON c.post_id = p.id
            WHERE v.voter_id = $1 AND c.approved
            ORDER BY v.cast_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn find_own_comment_ids(&self, user_id: Uuid, limit: i64) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM comments WHERE author_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(ids)
    }

    async fn find_votes_received(
        &self,
        comment_ids: &[Uuid],
        limit: i64,
    ) -> Result<Vec<VoteReceivedRow>> {
        let rows = sqlx::query_as::<_, VoteReceivedRow>(
            r#"
            SELECT c.id AS comment_id, c.post_id, p.title AS post_title, c.content,
                   CAST(mv.meta_value AS BIGINT) AS score,
                   vt.meta_value AS stamped_at
            FROM comments c
            JOIN posts p ON c.post_id = p.id
            JOIN comment_meta mv ON mv.comment_id = c.id AND mv.meta_key = $2
            LEFT JOIN comment_meta vt ON vt.comment_id = c.id AND vt.meta_key = $3
            WHERE c.id = ANY($1) AND c.approved
              AND CAST(mv.meta_value AS BIGINT) <> 0
              AND vt.meta_value IS NOT NULL
            ORDER BY vt.meta_value DESC
            LIMIT $4
            "#,
        )
        .bind(comment_ids)
        .bind(VOTE_SCORE_KEY)
        .bind(VOTE_STAMP_KEY)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn find_replies_to(
        &self,
        comment_ids: &[Uuid],
        exclude_user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<CommentRow>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.post_id, p.title AS post_title, c.content, c.created_at
            FROM comments c
            JOIN posts p ON c.post_id = p.id
            WHERE c.parent_id = ANY($1)
              AND c.author_id IS DISTINCT FROM $2
              AND c.approved
            ORDER BY c.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(comment_ids)
        .bind(exclude_user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn find_comments_on_posts_by(
        &self,
        author_id: Uuid,
        exclude_user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<CommentRow>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.post_id, p.title AS post_title, c.content, c.created_at
            FROM comments c
            JOIN posts p ON c.post_id = p.id
            WHERE p.author_id = $1
              AND c.author_id IS DISTINCT FROM $2
              AND c.approved
            ORDER BY c.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(author_id)
        .bind(exclude_user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn find_subscriptions(
        &self,
        email: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Subscription>> {
        if !self.table_exists(SUBSCRIPTIONS_TABLE).await? {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT s.id, s.post_id, COALESCE(p.title, '') AS post_title,
                   s.subscription_type, s.created_at
            FROM comment_subscriptions s
            LEFT JOIN posts p ON s.post_id = p.id
            WHERE s.email = $1
            ORDER BY s.created_at DESC, s.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(email)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn find_ratings(&self, user_id: Uuid, limit: i64, offset: i64) -> Result<Vec<RatedPost>> {
        if !self.table_exists(RATINGS_TABLE).await? {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, RatedPost>(
            r#"
            SELECT r.post_id, COALESCE(p.title, '') AS post_title
            FROM users_rated r
            LEFT JOIN posts p ON r.post_id = p.id
            WHERE r.user_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, parent_id, content, approved, created_at
            FROM comments WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(comment)
    }

    async fn get_post_author(&self, post_id: Uuid) -> Result<Option<Uuid>> {
        let author = sqlx::query_scalar::<_, Uuid>("SELECT author_id FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(author)
    }

    async fn upsert_comment_vote(
        &self,
        comment_id: Uuid,
        voter_id: Uuid,
        score: i16,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comment_votes (comment_id, voter_id, score, cast_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (comment_id, voter_id)
            DO UPDATE SET score = EXCLUDED.score, cast_at = NOW()
            "#,
        )
        .bind(comment_id)
        .bind(voter_id)
        .bind(score)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn delete_comment_vote(&self, comment_id: Uuid, voter_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM comment_votes WHERE comment_id = $1 AND voter_id = $2")
            .bind(comment_id)
            .bind(voter_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn comment_vote_total(&self, comment_id: Uuid) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(score), 0)::BIGINT FROM comment_votes WHERE comment_id = $1",
        )
        .bind(comment_id)
        .fetch_one(&self.db)
        .await?;

        Ok(total)
    }

    async fn set_comment_meta(&self, comment_id: Uuid, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comment_meta (comment_id, meta_key, meta_value)
            VALUES ($1, $2, $3)
            ON CONFLICT (comment_id, meta_key)
            DO UPDATE SET meta_value = EXCLUDED.meta_value
            "#,
        )
        .bind(comment_id)
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn count_published_posts(&self, author_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM posts WHERE author_id = $1 AND status = 'publish' AND post_type = 'post'",
        )
        .bind(author_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    async fn published_post_contents(&self, author_id: Uuid) -> Result<Vec<String>> {
        let contents = sqlx::query_scalar::<_, String>(
            "SELECT content FROM posts WHERE author_id = $1 AND status = 'publish' AND post_type = 'post'",
        )
        .bind(author_id)
        .fetch_all(&self.db)
        .await?;

        Ok(contents)
    }

    async fn load_settings(&self, name: &str) -> Result<Option<serde_json::Value>> {
        let value =
            sqlx::query_scalar::<_, serde_json::Value>("SELECT value FROM settings WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.db)
                .await?;

        Ok(value)
    }

    async fn save_settings(&self, name: &str, value: &serde_json::Value) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (name, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (name)
            DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(name)
        .bind(value)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
