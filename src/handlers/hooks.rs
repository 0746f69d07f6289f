//! Endpoints the host platform calls back into while handling its own events.

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{AppState, error::Result, services::notification_service};

#[derive(Debug, Deserialize)]
pub struct NotifyQuery {
    pub default: Option<bool>,
}

pub async fn notify_post_author(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    Query(params): Query<NotifyQuery>,
) -> Result<Json<Value>> {
    let notify = notification_service::should_notify_post_author(
        state.store.as_ref(),
        comment_id,
        params.default.unwrap_or(true),
    )
    .await?;

    Ok(Json(json!({ "notify": notify })))
}
