//! Read side of the dashboard: the overview payload, the "load more" lists
//! and the author statistics tab.

use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        ActivityEvent, AuthorStats, CONTACT_METHODS, CatalogEntry, ContactLink, DashboardSettings,
        DashboardTab, NOTIFY_NEW_COMMENTS_KEY, ProfileField, ProfileHeader, RatedPost,
        SubscriptionItem, Theme, User,
    },
    pagination::{Page, PageIndex},
    services::{activity_service, rate_limiter::AttemptLimiter, settings_service},
    store::DataStore,
    utils::word_count,
};

const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub comments: i64,
    pub karma: i64,
    pub subscriptions: usize,
}

#[derive(Debug, Serialize)]
pub struct PasswordPolicy {
    pub max_attempts: u32,
    pub window_seconds: u64,
    pub min_length: usize,
    pub attempts_remaining: u32,
}

#[derive(Debug, Serialize)]
pub struct DashboardOverview {
    pub header: ProfileHeader,
    pub stats: DashboardStats,
    pub tabs: Vec<CatalogEntry>,
    pub fields: Vec<CatalogEntry>,
    pub contact_links: Vec<ContactLink>,
    pub password_policy: PasswordPolicy,
    pub theme: Theme,
    pub activity: Option<Page<ActivityEvent>>,
    pub subscriptions: Option<Page<SubscriptionItem>>,
    pub ratings: Option<Page<RatedPost>>,
}

pub async fn load_user(store: &dyn DataStore, user_id: Uuid) -> Result<User> {
    store
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Enabled tabs, minus the author tab for users who cannot write posts.
pub fn visible_tabs(settings: &DashboardSettings, user: &User) -> Vec<DashboardTab> {
    settings
        .tabs_enabled
        .iter()
        .copied()
        .filter(|tab| *tab != DashboardTab::Author || user.role.can_edit_posts())
        .collect()
}

pub fn tab_catalog(tabs: &[DashboardTab]) -> Vec<CatalogEntry> {
    tabs.iter()
        .map(|tab| CatalogEntry {
            id: tab.id(),
            label: tab.label(),
        })
        .collect()
}

pub fn field_catalog(fields: &[ProfileField]) -> Vec<CatalogEntry> {
    fields
        .iter()
        .map(|field| CatalogEntry {
            id: field.id(),
            label: field.label(),
        })
        .collect()
}

pub async fn contact_links(store: &dyn DataStore, user_id: Uuid) -> Result<Vec<ContactLink>> {
    let mut links = Vec::with_capacity(CONTACT_METHODS.len());
    for (key, label) in CONTACT_METHODS {
        let value = store.get_user_meta(user_id, key).await?.unwrap_or_default();
        links.push(ContactLink {
            key: key.to_string(),
            label: label.to_string(),
            value,
        });
    }
    Ok(links)
}

pub async fn get_subscriptions(
    store: &dyn DataStore,
    user: &User,
    page: PageIndex,
    page_size: usize,
) -> Result<Page<SubscriptionItem>> {
    let rows = store
        .find_subscriptions(&user.email, page_size as i64, page.offset(page_size) as i64)
        .await?;
    Ok(Page::new(rows, page, page_size).map(SubscriptionItem::from))
}

pub async fn get_ratings(
    store: &dyn DataStore,
    user_id: Uuid,
    page: PageIndex,
    page_size: usize,
) -> Result<Page<RatedPost>> {
    let rows = store
        .find_ratings(user_id, page_size as i64, page.offset(page_size) as i64)
        .await?;
    Ok(Page::new(rows, page, page_size))
}

pub struct Dashboard<'a> {
    pub store: &'a dyn DataStore,
    pub limiter: &'a AttemptLimiter,
    pub settings: &'a DashboardSettings,
    pub min_password_length: usize,
}

impl Dashboard<'_> {
    pub async fn overview(&self, user_id: Uuid) -> Result<DashboardOverview> {
        let user = load_user(self.store, user_id).await?;
        let tabs = visible_tabs(self.settings, &user);
        let page_size = self.settings.page_size();
        let first = PageIndex::default();

        let (comments, karma, attempts) = futures::try_join!(
            self.store.count_approved_comments(user_id),
            self.store.total_karma(user_id),
            self.limiter.attempts(user_id),
        )?;

        let activity = if tabs.contains(&DashboardTab::Activity) {
            Some(activity_service::get_activity(self.store, user_id, first, page_size).await?)
        } else {
            None
        };

        // The header counter shows what the first page holds whether or not
        // the tab itself is visible.
        let subscriptions = get_subscriptions(self.store, &user, first, page_size).await?;
        let subscription_count = subscriptions.items.len();
        let subscriptions = tabs.contains(&DashboardTab::Subs).then_some(subscriptions);

        let ratings = if tabs.contains(&DashboardTab::Ratings) {
            Some(get_ratings(self.store, user_id, first, page_size).await?)
        } else {
            None
        };

        let contact_links = if self.settings.field_enabled(ProfileField::ContactMethods) {
            contact_links(self.store, user_id).await?
        } else {
            Vec::new()
        };

        Ok(DashboardOverview {
            header: ProfileHeader::from(&user),
            stats: DashboardStats {
                comments,
                karma,
                subscriptions: subscription_count,
            },
            tabs: tab_catalog(&tabs),
            fields: field_catalog(&self.settings.fields_enabled),
            contact_links,
            password_policy: PasswordPolicy {
                max_attempts: self.limiter.max_attempts(),
                window_seconds: self.limiter.window_seconds(),
                min_length: self.min_password_length,
                attempts_remaining: self.limiter.max_attempts().saturating_sub(attempts),
            },
            theme: settings_service::theme(self.settings),
            activity,
            subscriptions,
            ratings,
        })
    }
}

pub fn read_time_minutes(words: usize) -> usize {
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

fn require_author(user: &User) -> Result<()> {
    if user.role.can_edit_posts() {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "Author statistics are only available to authors".to_string(),
        ))
    }
}

pub async fn get_author_stats(store: &dyn DataStore, user_id: Uuid) -> Result<AuthorStats> {
    let user = load_user(store, user_id).await?;
    require_author(&user)?;

    let (total_posts, contents, notify) = futures::try_join!(
        store.count_published_posts(user_id),
        store.published_post_contents(user_id),
        store.get_user_meta(user_id, NOTIFY_NEW_COMMENTS_KEY),
    )?;
    let words: usize = contents.iter().map(|content| word_count(content)).sum();

    Ok(AuthorStats {
        total_posts,
        word_count: words,
        read_time_minutes: read_time_minutes(words),
        notify_new_comments: notify.as_deref() != Some("0"),
    })
}

pub async fn save_author_preferences(
    store: &dyn DataStore,
    user_id: Uuid,
    notify_new_comments: bool,
) -> Result<&'static str> {
    let user = load_user(store, user_id).await?;
    require_author(&user)?;

    let value = if notify_new_comments { "1" } else { "0" };
    store
        .set_user_meta(user_id, NOTIFY_NEW_COMMENTS_KEY, value)
        .await?;

    tracing::info!(user_id = %user_id, notify_new_comments, "Author preferences saved");
    Ok("Preferences saved!")
}
