use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{VoteRequest, VoteResponse},
    services::{rate_limiter::Reservation, vote_service},
};

pub async fn vote_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(comment_id): Path<Uuid>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<VoteResponse>> {
    // Check rate limiting
    if let Reservation::Denied { retry_after } =
        state.vote_limiter.check_and_reserve(auth_user.user_id).await?
    {
        return Err(AppError::RateLimit {
            message: "Too many votes. Please slow down.".to_string(),
            retry_after,
        });
    }

    let vote_response = vote_service::vote_comment(
        state.store.as_ref(),
        auth_user.user_id,
        comment_id,
        payload.vote_type,
        Utc::now(),
    )
    .await?;

    Ok(Json(vote_response))
}
