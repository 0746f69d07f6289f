use axum::{extract::State, response::Json};
use serde::Serialize;
use serde_json::Value;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{CatalogEntry, DashboardSettings, DashboardTab, ProfileField},
    services::{dashboard_service, settings_service},
};

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub settings: DashboardSettings,
    pub available_tabs: Vec<CatalogEntry>,
    pub available_fields: Vec<CatalogEntry>,
}

impl From<DashboardSettings> for SettingsResponse {
    fn from(settings: DashboardSettings) -> Self {
        Self {
            settings,
            available_tabs: dashboard_service::tab_catalog(&DashboardTab::ALL),
            available_fields: dashboard_service::field_catalog(&ProfileField::ALL),
        }
    }
}

async fn require_admin(state: &AppState, auth_user: &AuthUser) -> Result<()> {
    let user = dashboard_service::load_user(state.store.as_ref(), auth_user.user_id).await?;
    if !user.role.can_manage_options() {
        return Err(AppError::Authorization(
            "Only administrators can manage dashboard settings".to_string(),
        ));
    }
    Ok(())
}

pub async fn get_settings(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<SettingsResponse>> {
    require_admin(&state, &auth_user).await?;

    Ok(Json(state.settings_snapshot().await.into()))
}

pub async fn update_settings(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<Value>,
) -> Result<Json<SettingsResponse>> {
    require_admin(&state, &auth_user).await?;

    let saved = settings_service::save_settings(
        state.store.as_ref(),
        &state.config.settings_option_name,
        &payload,
    )
    .await?;
    *state.settings.write().await = saved.clone();

    tracing::info!(user_id = %auth_user.user_id, "Dashboard settings replaced");
    Ok(Json(saved.into()))
}
