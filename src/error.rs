use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    // Identity store refused the write; the message goes back to the caller as-is.
    #[error("{0}")]
    UpstreamWrite(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("{message}")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },
}

impl AppError {
    /// Stable machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "invalid_input",
            AppError::Authentication(_) | AppError::Jwt(_) => "not_authenticated",
            AppError::Authorization(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::BadRequest(_) => "bad_request",
            AppError::UpstreamWrite(_) => "upstream_write_failure",
            AppError::RateLimit { .. } => "rate_limited",
            AppError::Database(_)
            | AppError::Redis(_)
            | AppError::Internal(_)
            | AppError::Bcrypt(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let mut retry_header = None;

        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Redis(ref e) => {
                tracing::error!("Redis error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Authentication(message) => (StatusCode::UNAUTHORIZED, message),
            AppError::Authorization(message) => (StatusCode::FORBIDDEN, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Conflict(message) => (StatusCode::CONFLICT, message),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::UpstreamWrite(message) => {
                tracing::warn!("Identity store rejected update: {}", message);
                (StatusCode::BAD_GATEWAY, message)
            }
            AppError::Internal(ref message) => {
                tracing::error!("Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Jwt(ref e) => {
                tracing::error!("JWT error: {:?}", e);
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
            AppError::Bcrypt(ref e) => {
                tracing::error!("Bcrypt error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::RateLimit {
                message,
                retry_after,
            } => {
                retry_header = retry_after;
                (StatusCode::TOO_MANY_REQUESTS, message)
            }
        };

        let body = Json(json!({
            "error": error_message,
            "code": code,
            "status": status.as_u16()
        }));

        let mut response = (status, body).into_response();
        if let Some(seconds) = retry_header {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

// Validation helper
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let error_messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&"Invalid value".into())
                    )
                })
            })
            .collect();

        AppError::Validation(error_messages.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Validation("bad".into()), StatusCode::BAD_REQUEST, "invalid_input")]
    #[case(AppError::Conflict("taken".into()), StatusCode::CONFLICT, "conflict")]
    #[case(AppError::Authentication("nope".into()), StatusCode::UNAUTHORIZED, "not_authenticated")]
    #[case(AppError::UpstreamWrite("refused".into()), StatusCode::BAD_GATEWAY, "upstream_write_failure")]
    #[case(AppError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR, "internal")]
    fn maps_errors_to_status_and_code(
        #[case] error: AppError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        assert_eq!(error.code(), code);
        assert_eq!(error.into_response().status(), status);
    }

    #[test]
    fn rate_limit_sets_retry_after_header() {
        let response = AppError::RateLimit {
            message: "slow down".into(),
            retry_after: Some(120),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(RETRY_AFTER).and_then(|v| v.to_str().ok()),
            Some("120")
        );
    }
}
