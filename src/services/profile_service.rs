use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    auth::hash_password,
    error::{AppError, Result},
    models::{CONTACT_METHODS, DashboardSettings, ProfileChanges, ProfileField},
    services::rate_limiter::{AttemptLimiter, Reservation},
    store::DataStore,
    utils::{is_valid_email, sanitize_text, sanitize_textarea, sanitize_url},
};

const UPDATED_MESSAGE: &str = "Profile updated!";
const LOGOUT_SUFFIX: &str = " Logging you out...";

/// Fields a user may submit from the settings tab. Absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub user_email: Option<String>,
    pub user_url: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub contact_methods: HashMap<String, String>,
    pub new_password: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ProfileUpdateOutcome {
    pub message: String,
    pub password_changed: bool,
}

pub struct ProfileUpdate<'a> {
    pub store: &'a dyn DataStore,
    pub limiter: &'a AttemptLimiter,
    pub settings: &'a DashboardSettings,
    pub min_password_length: usize,
}

impl ProfileUpdate<'_> {
    /// Validates every submitted field, then writes them in one update.
    ///
    /// A new password is checked against the attempt limiter before its length
    /// is looked at, so a too-short password still spends an attempt.
    pub async fn apply(
        &self,
        user_id: Uuid,
        request: ProfileUpdateRequest,
    ) -> Result<ProfileUpdateOutcome> {
        let enabled = |field| self.settings.field_enabled(field);
        let mut changes = ProfileChanges::default();

        if enabled(ProfileField::FirstName) {
            changes.first_name = request.first_name.as_deref().map(sanitize_text);
        }
        if enabled(ProfileField::LastName) {
            changes.last_name = request.last_name.as_deref().map(sanitize_text);
        }

        if enabled(ProfileField::DisplayName) {
            if let Some(raw) = request.display_name.as_deref() {
                let display_name = sanitize_text(raw);
                if display_name.is_empty() {
                    return Err(AppError::Validation(
                        "Display name cannot be empty.".to_string(),
                    ));
                }
                changes.display_name = Some(display_name);
            }
        }

        if enabled(ProfileField::UserEmail) {
            if let Some(raw) = request.user_email.as_deref() {
                changes.email = Some(self.checked_email(user_id, raw).await?);
            }
        }

        if enabled(ProfileField::UserUrl) {
            changes.url = request.user_url.as_deref().map(sanitize_url);
        }
        if enabled(ProfileField::Description) {
            changes.description = request.description.as_deref().map(sanitize_textarea);
        }

        let contact_links: Vec<(&str, String)> = if enabled(ProfileField::ContactMethods) {
            CONTACT_METHODS
                .iter()
                .filter_map(|(key, _)| {
                    let value = request.contact_methods.get(*key)?;
                    Some((*key, sanitize_url(value)))
                })
                .collect()
        } else {
            Vec::new()
        };

        if enabled(ProfileField::Password) {
            let new_password = request.new_password.as_deref().map(str::trim).unwrap_or("");
            if !new_password.is_empty() {
                self.reserve_password_attempt(user_id).await?;

                if new_password.chars().count() < self.min_password_length {
                    return Err(AppError::Validation(format!(
                        "Password must be at least {} characters long.",
                        self.min_password_length
                    )));
                }
                changes.password_hash = Some(hash_password(new_password)?);
            }
        }

        let password_changed = changes.password_hash.is_some();
        if !changes.is_empty() {
            self.store.update_user_profile(user_id, &changes).await?;
        }

        for (key, value) in &contact_links {
            self.store.set_user_meta(user_id, key, value).await?;
        }

        tracing::info!(user_id = %user_id, password_changed, "Profile updated");

        let mut message = UPDATED_MESSAGE.to_string();
        if password_changed {
            message.push_str(LOGOUT_SUFFIX);
        }

        Ok(ProfileUpdateOutcome {
            message,
            password_changed,
        })
    }

    async fn checked_email(&self, user_id: Uuid, raw: &str) -> Result<String> {
        let email = raw.trim().to_string();
        if !is_valid_email(&email) {
            return Err(AppError::Validation(
                "Please enter a valid email address.".to_string(),
            ));
        }

        match self.store.find_user_id_by_email(&email).await? {
            Some(owner) if owner != user_id => {
                Err(AppError::Conflict("Email already in use.".to_string()))
            }
            _ => Ok(email),
        }
    }

    async fn reserve_password_attempt(&self, user_id: Uuid) -> Result<()> {
        match self.limiter.check_and_reserve(user_id).await? {
            Reservation::Allowed { .. } => Ok(()),
            Reservation::Denied { retry_after } => Err(AppError::RateLimit {
                message: "Too many password change attempts. Please try again later.".to_string(),
                retry_after,
            }),
        }
    }
}
