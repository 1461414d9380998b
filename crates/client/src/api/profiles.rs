//! Profile API client methods

use reqwest::Method;

use atelier_core::types::UserProfile;

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::types::UserProfileUpdate;

impl ApiClient {
    /// Fetch the logged-in account's profile (created on first access)
    pub async fn my_profile(&self) -> Result<UserProfile, ClientError> {
        self.execute_authed(Method::GET, "/api/v1/accounts/profiles/me/", None)
            .await
    }

    /// Update the logged-in account's profile
    pub async fn update_my_profile(
        &self,
        request: UserProfileUpdate,
    ) -> Result<UserProfile, ClientError> {
        let body = serde_json::to_value(&request)?;
        self.execute_authed(
            Method::PATCH,
            "/api/v1/accounts/profiles/update_me/",
            Some(&body),
        )
        .await
    }
}
