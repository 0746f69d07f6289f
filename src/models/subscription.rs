use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub post_id: Uuid,
    pub post_title: String,
    pub subscription_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Human label such as "All Comment Subscription"; untyped rows count as posts.
    pub fn label(&self) -> String {
        let kind = self
            .subscription_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or("post");

        let words: Vec<String> = kind
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect();

        format!("{} Subscription", words.join(" "))
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RatedPost {
    pub post_id: Uuid,
    pub post_title: String,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionItem {
    pub label: String,
    #[serde(flatten)]
    pub subscription: Subscription,
}

impl From<Subscription> for SubscriptionItem {
    fn from(subscription: Subscription) -> Self {
        Self {
            label: subscription.label(),
            subscription,
        }
    }
}
