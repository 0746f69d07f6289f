pub mod activity_service;
pub mod dashboard_service;
pub mod notification_service;
pub mod profile_service;
pub mod rate_limiter;
pub mod settings_service;
pub mod vote_service;
