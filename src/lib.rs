pub mod auth;
pub mod config;
pub mod database;
pub mod ephemeral;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod redis;
pub mod services;
pub mod store;
pub mod utils;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post, put},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config, ephemeral::EphemeralStore, models::DashboardSettings,
    services::rate_limiter::AttemptLimiter, store::DataStore,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub cache: Arc<dyn EphemeralStore>,
    pub config: Arc<Config>,
    pub settings: Arc<RwLock<DashboardSettings>>,
    pub password_limiter: AttemptLimiter,
    pub vote_limiter: AttemptLimiter,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DataStore>,
        cache: Arc<dyn EphemeralStore>,
        config: Config,
        settings: DashboardSettings,
    ) -> Self {
        let password_limiter = AttemptLimiter::password_changes(cache.clone(), &config);
        let vote_limiter = AttemptLimiter::comment_votes(cache.clone());

        Self {
            store,
            cache,
            config: Arc::new(config),
            settings: Arc::new(RwLock::new(settings)),
            password_limiter,
            vote_limiter,
        }
    }

    /// Settings as of now; an admin save mid-request does not affect the copy.
    pub async fn settings_snapshot(&self) -> DashboardSettings {
        self.settings.read().await.clone()
    }
}

pub fn create_app(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    // Called by the host platform, not by browsers
    let hook_routes = Router::new().route(
        "/api/hooks/comments/{comment_id}/notify-author",
        get(handlers::hooks::notify_post_author),
    );

    // Protected routes
    let protected_routes = Router::new()
        // Profile dashboard
        .route(
            "/api/profile/me",
            get(handlers::profile::get_dashboard).put(handlers::profile::update_profile),
        )
        .route(
            "/api/profile/me/activity",
            get(handlers::profile::get_activity),
        )
        .route(
            "/api/profile/me/subscriptions",
            get(handlers::profile::get_subscriptions),
        )
        .route(
            "/api/profile/me/ratings",
            get(handlers::profile::get_ratings),
        )
        .route(
            "/api/profile/me/author-stats",
            get(handlers::profile::get_author_stats),
        )
        .route(
            "/api/profile/me/preferences",
            put(handlers::profile::update_preferences),
        )
        // Comment routes
        .route(
            "/api/comments/{comment_id}/vote",
            post(handlers::comments::vote_comment),
        )
        // Admin routes
        .route(
            "/api/admin/settings",
            get(handlers::admin::get_settings).put(handlers::admin::update_settings),
        );

    Router::new()
        .merge(hook_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
