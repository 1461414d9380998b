//! Request/response bodies for the admin API
//!
//! WebAuthn payloads stay opaque `serde_json::Value` blobs: the browser or
//! OS authenticator produces and consumes them, the client only transports
//! them.

use atelier_core::types::{User, UserRole};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Login response carrying the initial credential pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: User,
    #[serde(default)]
    pub remember_me: bool,
}

/// Token refresh request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRefreshRequest {
    pub refresh: String,
}

/// Token refresh response
///
/// `refresh` is present only when the server rotates refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Account self-registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub password_confirm: String,
}

/// Password change for the logged-in account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

/// Password reset initiation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Password reset completion with the emailed token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetConfirmRequest {
    pub token: String,
    pub password: String,
    pub password_confirm: String,
}

/// Generic status/message acknowledgement body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusMessage {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// WebAuthn ceremony options plus the server-side state to echo back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasskeyOptionsResponse {
    /// Options blob handed to `navigator.credentials` as-is
    pub options: JsonValue,
    /// Opaque ceremony state; must accompany the verify call
    #[serde(default)]
    pub session_data: JsonValue,
}

/// Passkey registration verification request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasskeyRegisterVerifyRequest {
    pub credential: JsonValue,
    #[serde(default)]
    pub session_data: JsonValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
}

/// Passkey registration verification response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasskeyRegisterVerifyResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub credential_id: String,
}

/// Passkey authentication options request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PasskeyAuthenticateOptionsRequest {
    /// Restrict the ceremony to one account's credentials
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Passkey authentication verification request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasskeyAuthenticateVerifyRequest {
    pub credential: JsonValue,
    #[serde(default)]
    pub session_data: JsonValue,
}

/// Admin-side account creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub password: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Partial account update; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// Partial profile update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_widgets: Option<JsonValue>,
}

/// Partial system settings update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_agent_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_email_verification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_reset_token_expiry_hours: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_loss_factor_oil_percent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_second_batch_scan_on_insufficient: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_older_batch_warning: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_defaults: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scraper_settings: Option<JsonValue>,
}

/// Audit log listing filters
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub page: Option<u32>,
    /// Exact action code, e.g. `USER_UPDATE`
    pub action: Option<String>,
    /// Free-text search over description/action/subject
    pub search: Option<String>,
}

impl AuditQuery {
    pub(crate) fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(action) = &self.action {
            pairs.push(("action".to_string(), action.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        pairs
    }
}

/// Session revocation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRevokeRequest {
    pub session_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_update_skips_unset_fields() {
        let update = UserUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"is_active":false}"#);
    }

    #[test]
    fn refresh_response_tolerates_missing_rotation() {
        let resp: TokenRefreshResponse = serde_json::from_str(r#"{"access":"a1"}"#).unwrap();
        assert_eq!(resp.access, "a1");
        assert!(resp.refresh.is_none());
    }

    #[test]
    fn audit_query_builds_pairs_in_order() {
        let query = AuditQuery {
            page: Some(2),
            action: Some("USER_UPDATE".to_string()),
            search: None,
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("action".to_string(), "USER_UPDATE".to_string()),
            ]
        );
    }
}
