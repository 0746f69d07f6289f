use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Subscriber,
    Author,
    Administrator,
}

impl UserRole {
    pub fn can_edit_posts(self) -> bool {
        matches!(self, UserRole::Author | UserRole::Administrator)
    }

    pub fn can_manage_options(self) -> bool {
        matches!(self, UserRole::Administrator)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub url: String,
    pub description: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column updates issued to the identity store. `None` leaves a column as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub password_hash: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self == &ProfileChanges::default()
    }
}

/// Extra contact links offered on every profile, keyed by user meta name.
pub const CONTACT_METHODS: &[(&str, &str)] = &[("linkedin", "LinkedIn URL"), ("github", "GitHub URL")];

/// User meta key holding the "email me about comments on my posts" switch.
pub const NOTIFY_NEW_COMMENTS_KEY: &str = "dpi_notify_new_comments";

#[derive(Debug, Clone, Serialize)]
pub struct ContactLink {
    pub key: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileHeader {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub url: String,
    pub description: String,
}

impl From<&User> for ProfileHeader {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            url: user.url.clone(),
            description: user.description.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthorStats {
    pub total_posts: i64,
    pub word_count: usize,
    pub read_time_minutes: usize,
    pub notify_new_comments: bool,
}
