//! Authentication and session API client methods

use reqwest::Method;
use tracing::debug;

use atelier_core::credentials::{StoredSession, TokenPair};
use atelier_core::types::SessionInfo;
use serde::Deserialize;

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::types::{
    ChangePasswordRequest, LoginRequest, LoginResponse, PasswordResetConfirmRequest,
    PasswordResetRequest, RegisterRequest, SessionRevokeRequest, StatusMessage,
};

/// Session listing response
#[derive(Debug, Clone, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionInfo>,
    #[serde(default)]
    pub total_count: u32,
}

impl ApiClient {
    /// Log in with email and password, persisting the issued credential pair
    pub async fn login(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
        remember_me: bool,
    ) -> Result<LoginResponse, ClientError> {
        let req = self
            .request(Method::POST, "/api/v1/accounts/auth/login/")
            .json(&LoginRequest {
                email: email.into(),
                password: password.into(),
                remember_me,
            });
        let response: LoginResponse = self.execute(req).await?;

        self.store_session(&StoredSession {
            tokens: TokenPair {
                access: response.access.clone(),
                refresh: response.refresh.clone(),
            },
            user: Some(response.user.clone()),
        })?;

        Ok(response)
    }

    /// Log out: notify the server best-effort, then always clear credentials
    ///
    /// The server call is advisory; a dead session must not survive locally
    /// just because the network or the access token already failed.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let Some(session) = self.stored_session()? else {
            return Ok(());
        };

        let req = self
            .request(Method::POST, "/api/v1/accounts/auth/logout/")
            .bearer_auth(&session.tokens.access);
        if let Err(err) = self.execute::<StatusMessage>(req).await {
            debug!(error = %err, "logout endpoint call failed, clearing session anyway");
        }

        self.clear_session()
    }

    /// Register a new account (subject to the server's registration toggle)
    pub async fn register(&self, request: RegisterRequest) -> Result<StatusMessage, ClientError> {
        let req = self
            .request(Method::POST, "/api/v1/accounts/auth/register/")
            .json(&request);
        self.execute(req).await
    }

    /// Change the logged-in account's password
    pub async fn change_password(
        &self,
        request: ChangePasswordRequest,
    ) -> Result<StatusMessage, ClientError> {
        let body = serde_json::to_value(&request)?;
        self.execute_authed(
            Method::POST,
            "/api/v1/accounts/auth/change-password/",
            Some(&body),
        )
        .await
    }

    /// Request a password-reset email
    pub async fn request_password_reset(
        &self,
        email: impl Into<String>,
    ) -> Result<StatusMessage, ClientError> {
        let req = self
            .request(Method::POST, "/api/v1/accounts/auth/password-reset/")
            .json(&PasswordResetRequest {
                email: email.into(),
            });
        self.execute(req).await
    }

    /// Complete a password reset with the emailed token
    pub async fn confirm_password_reset(
        &self,
        request: PasswordResetConfirmRequest,
    ) -> Result<StatusMessage, ClientError> {
        let req = self
            .request(Method::POST, "/api/v1/accounts/auth/password-reset/confirm/")
            .json(&request);
        self.execute(req).await
    }

    /// List the account's active sessions (one per device)
    pub async fn sessions(&self) -> Result<SessionListResponse, ClientError> {
        self.execute_authed(Method::GET, "/api/v1/accounts/auth/sessions/", None)
            .await
    }

    /// Revoke the session with the given server-side id
    pub async fn revoke_session(
        &self,
        session_id: impl Into<String>,
    ) -> Result<StatusMessage, ClientError> {
        let body = serde_json::to_value(SessionRevokeRequest {
            session_id: session_id.into(),
        })?;
        self.execute_authed(
            Method::DELETE,
            "/api/v1/accounts/auth/sessions/",
            Some(&body),
        )
        .await
    }

    /// End every session for this account, local one included
    pub async fn logout_all(&self) -> Result<(), ClientError> {
        self.execute_authed_unit(Method::POST, "/api/v1/accounts/auth/logout-all/", None)
            .await?;
        self.clear_session()
    }
}
