use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};
use validator::Validate;

use crate::{
    client::{filter_eq, Client, ListQuery},
    config::HearthConfig,
    error::{Result, ServiceError},
    migrations::{PRESETS, PREFERENCES, USERS, USER_PROFILES},
    record::{AuthSession, ListResult, Preferences, Preset, User, UserProfile},
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 72))]
    pub password: String,
    #[validate(must_match = "password")]
    pub password_confirm: String,
    #[validate(length(max = 255))]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileInput {
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(default)]
    pub content_types: Value,
    #[serde(default)]
    pub preferences: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct PasswordResetInput {
    #[validate(email)]
    email: String,
}

/// Account, profile and preference operations of the application.
#[derive(Clone)]
pub struct ProfileService {
    client: Client,
}

impl ProfileService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Service talking to the backend named by the environment.
    pub fn from_env() -> Result<Self> {
        let config = HearthConfig::from_env()?;

        Ok(Self::new(Client::from_config(&config)))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn register(&self, input: RegisterInput) -> Result<User> {
        input.validate()?;

        let user: User = self.client.create_record(USERS, &input)?;
        info!(user = %user.id, "registered user");

        Ok(user)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let session = self.client.auth_with_password(USERS, email, password)?;
        info!(user = %session.record.id, "user logged in");

        Ok(session)
    }

    pub fn logout(&self) {
        self.client.logout();
    }

    pub fn current_user(&self) -> Option<User> {
        self.client.auth().map(|auth| auth.record)
    }

    pub fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        self.client
            .first_record(USER_PROFILES, filter_eq("user", user_id))
    }

    /// Creates the profile of the logged in user.
    pub fn create_profile(&self, input: ProfileInput) -> Result<UserProfile> {
        input.validate()?;

        let Some(user) = self.current_user() else {
            return Err(ServiceError::Unauthorized);
        };

        let mut body = serde_json::to_value(&input)?;
        body["user"] = json!(user.id);

        let profile: UserProfile = self.client.create_record(USER_PROFILES, &body)?;
        info!(profile = %profile.id, user = %user.id, "created profile");

        Ok(profile)
    }

    pub fn update_profile(&self, profile_id: &str, input: ProfileInput) -> Result<UserProfile> {
        input.validate()?;

        let profile: UserProfile = self
            .client
            .update_record(USER_PROFILES, profile_id, &input)?;
        debug!(profile = %profile.id, "updated profile");

        Ok(profile)
    }

    pub fn delete_profile(&self, profile_id: &str) -> Result<()> {
        self.client.delete_record(USER_PROFILES, profile_id)?;
        info!(profile = %profile_id, "deleted profile");

        Ok(())
    }

    pub fn get_preferences(&self, user_id: &str) -> Result<Option<Preferences>> {
        self.client
            .first_record(PREFERENCES, filter_eq("userID", user_id))
    }

    /// Stores `preferences` for `user_id`, creating the record on first save.
    pub fn save_preferences(&self, user_id: &str, preferences: Value) -> Result<Preferences> {
        let saved: Preferences = match self.get_preferences(user_id)? {
            Some(existing) => self.client.update_record(
                PREFERENCES,
                &existing.id,
                &json!({ "preferences": preferences }),
            )?,
            _ => self.client.create_record(
                PREFERENCES,
                &json!({ "userID": user_id, "preferences": preferences }),
            )?,
        };

        debug!(record = %saved.id, user = %user_id, "saved preferences");

        Ok(saved)
    }

    pub fn list_presets(&self, page: u32, per_page: u32) -> Result<ListResult<Preset>> {
        let query = ListQuery {
            page: page.max(1),
            per_page,
            sort: Some("name".to_owned()),
            filter: None,
        };

        self.client.list_records(PRESETS, &query)
    }

    pub fn request_password_reset(&self, email: &str) -> Result<()> {
        let input = PasswordResetInput {
            email: email.to_owned(),
        };
        input.validate()?;

        self.client.request_password_reset(USERS, &input.email)
    }
}
