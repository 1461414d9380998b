//! System settings API client methods
//!
//! The settings resource is a server-side singleton, always primary key 1.

use reqwest::Method;

use atelier_core::types::SystemSettings;

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::types::SystemSettingsUpdate;

const SETTINGS_PATH: &str = "/api/v1/settings/settings/1/";

impl ApiClient {
    /// Fetch the system settings
    pub async fn system_settings(&self) -> Result<SystemSettings, ClientError> {
        self.execute_authed(Method::GET, SETTINGS_PATH, None).await
    }

    /// Partially update the system settings
    pub async fn update_system_settings(
        &self,
        request: SystemSettingsUpdate,
    ) -> Result<SystemSettings, ClientError> {
        let body = serde_json::to_value(&request)?;
        self.execute_authed(Method::PATCH, SETTINGS_PATH, Some(&body))
            .await
    }
}
