//! Wire types shared by the client and its consumers
//!
//! Field sets mirror what the admin API serializes. Optional fields use
//! `Option` / `serde(default)` so responses from older server builds still
//! decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Role assigned to an account, in ascending order of privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Guest,
    User,
    Manager,
    Admin,
    SuperAdmin,
}

impl UserRole {
    /// Whether this role may manage other accounts
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

/// An account as the API serializes it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: UserRole,
    pub is_active: bool,
    /// Absolute URL of the avatar image, if one is set
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub email_verified_at: Option<DateTime<Utc>>,
}

impl User {
    /// Display name: full name when present, email otherwise
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

/// Extended per-account profile data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub notifications_enabled: bool,
    /// Dashboard widget layout, opaque to the client
    #[serde(default)]
    pub dashboard_widgets: JsonValue,
    #[serde(default)]
    pub last_login_ip: Option<String>,
    #[serde(default)]
    pub last_login_user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A registered passkey credential (public metadata only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasskeyInfo {
    pub id: i64,
    pub credential_id: String,
    #[serde(default)]
    pub attestation_type: Option<String>,
    pub sign_count: u32,
    #[serde(default)]
    pub transports: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// One active login session for the current account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: i64,
    pub session_id: String,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    /// True for the session the request was made with
    #[serde(default)]
    pub is_current: bool,
}

/// System-wide settings singleton
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSettings {
    pub id: i64,
    pub company_name: String,
    pub currency: String,
    pub qr_base_url: String,
    pub print_agent_url: String,
    pub registration_enabled: bool,
    pub require_email_verification: bool,
    pub password_reset_token_expiry_hours: u32,
    /// Decimal rendered as a string by the API
    pub default_loss_factor_oil_percent: String,
    pub require_second_batch_scan_on_insufficient: bool,
    pub show_older_batch_warning: bool,
    #[serde(default)]
    pub analytics_defaults: JsonValue,
    #[serde(default)]
    pub scraper_settings: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal actor reference embedded in audit entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditActor {
    pub id: i64,
    pub email: String,
}

/// One audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: i64,
    #[serde(default)]
    pub actor: Option<AuditActor>,
    pub action: String,
    #[serde(default)]
    pub subject_type: Option<String>,
    #[serde(default)]
    pub subject_id: Option<i64>,
    #[serde(default)]
    pub payload_before: Option<JsonValue>,
    #[serde(default)]
    pub payload_after: Option<JsonValue>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Pagination envelope used by every list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Whether another page follows this one
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_decodes_with_missing_optionals() {
        let user: User = serde_json::from_value(json!({
            "id": 7,
            "email": "ops@example.com",
            "role": "MANAGER",
            "is_active": true,
            "created_at": "2025-03-01T10:00:00Z",
            "updated_at": "2025-03-02T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(user.role, UserRole::Manager);
        assert!(user.avatar.is_none());
        assert!(!user.email_verified);
        assert_eq!(user.display_name(), "ops@example.com");
    }

    #[test]
    fn role_roundtrips_screaming_snake() {
        let json = serde_json::to_string(&UserRole::SuperAdmin).unwrap();
        assert_eq!(json, "\"SUPER_ADMIN\"");
        let back: UserRole = serde_json::from_str(&json).unwrap();
        assert_eq!(back, UserRole::SuperAdmin);
        assert!(back.is_admin());
        assert!(!UserRole::Manager.is_admin());
    }

    #[test]
    fn page_envelope_decodes() {
        let page: Page<User> = serde_json::from_value(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{
                "id": 1,
                "email": "a@b.c",
                "first_name": "Ada",
                "last_name": "Byron",
                "role": "ADMIN",
                "is_active": true,
                "created_at": "2025-01-01T00:00:00Z",
                "updated_at": "2025-01-01T00:00:00Z"
            }]
        }))
        .unwrap();

        assert_eq!(page.count, 1);
        assert!(!page.has_next());
        assert_eq!(page.results[0].display_name(), "Ada Byron");
    }
}
