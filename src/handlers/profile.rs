use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{ActivityEvent, AuthorStats, DashboardSettings, DashboardTab, RatedPost, SubscriptionItem},
    pagination::{Page, PageIndex},
    services::{
        activity_service,
        dashboard_service::{self, Dashboard, DashboardOverview},
        profile_service::{ProfileUpdate, ProfileUpdateRequest},
    },
};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PreferencesRequest {
    pub notify_new_comments: bool,
}

fn ensure_tab(settings: &DashboardSettings, tab: DashboardTab) -> Result<()> {
    if settings.tab_enabled(tab) {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("The {} tab is disabled", tab.id())))
    }
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<DashboardOverview>> {
    let settings = state.settings_snapshot().await;

    let overview = Dashboard {
        store: state.store.as_ref(),
        limiter: &state.password_limiter,
        settings: &settings,
        min_password_length: state.config.password_min_length,
    }
    .overview(auth_user.user_id)
    .await?;

    Ok(Json(overview))
}

pub async fn get_activity(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<PageQuery>,
) -> Result<Json<Page<ActivityEvent>>> {
    let settings = state.settings_snapshot().await;
    ensure_tab(&settings, DashboardTab::Activity)?;

    let page = activity_service::get_activity(
        state.store.as_ref(),
        auth_user.user_id,
        PageIndex::new(params.page),
        settings.page_size(),
    )
    .await?;

    Ok(Json(page))
}

pub async fn get_subscriptions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<PageQuery>,
) -> Result<Json<Page<SubscriptionItem>>> {
    let settings = state.settings_snapshot().await;
    ensure_tab(&settings, DashboardTab::Subs)?;

    let user = dashboard_service::load_user(state.store.as_ref(), auth_user.user_id).await?;
    let page = dashboard_service::get_subscriptions(
        state.store.as_ref(),
        &user,
        PageIndex::new(params.page),
        settings.page_size(),
    )
    .await?;

    Ok(Json(page))
}

pub async fn get_ratings(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<PageQuery>,
) -> Result<Json<Page<RatedPost>>> {
    let settings = state.settings_snapshot().await;
    ensure_tab(&settings, DashboardTab::Ratings)?;

    let page = dashboard_service::get_ratings(
        state.store.as_ref(),
        auth_user.user_id,
        PageIndex::new(params.page),
        settings.page_size(),
    )
    .await?;

    Ok(Json(page))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<ProfileUpdateRequest>,
) -> Result<Json<Value>> {
    let settings = state.settings_snapshot().await;

    let outcome = ProfileUpdate {
        store: state.store.as_ref(),
        limiter: &state.password_limiter,
        settings: &settings,
        min_password_length: state.config.password_min_length,
    }
    .apply(auth_user.user_id, payload)
    .await?;

    // New password invalidates the session that changed it
    if outcome.password_changed {
        state.cache.delete_session(&auth_user.jti).await?;
        tracing::info!(user_id = %auth_user.user_id, "Session ended after password change");
    }

    Ok(Json(json!({
        "message": outcome.message,
        "logged_out": outcome.password_changed
    })))
}

pub async fn get_author_stats(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<AuthorStats>> {
    let settings = state.settings_snapshot().await;
    ensure_tab(&settings, DashboardTab::Author)?;

    let stats = dashboard_service::get_author_stats(state.store.as_ref(), auth_user.user_id).await?;
    Ok(Json(stats))
}

pub async fn update_preferences(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<PreferencesRequest>,
) -> Result<Json<Value>> {
    let message = dashboard_service::save_author_preferences(
        state.store.as_ref(),
        auth_user.user_id,
        payload.notify_new_comments,
    )
    .await?;

    Ok(Json(json!({ "message": message })))
}
