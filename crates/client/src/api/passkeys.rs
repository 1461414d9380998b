//! Passkey (WebAuthn) API client methods
//!
//! The cryptographic ceremony happens in the host's authenticator; every
//! credential payload passes through untouched.

use reqwest::Method;

use atelier_core::credentials::{StoredSession, TokenPair};
use atelier_core::types::{Page, PasskeyInfo};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::types::{
    LoginResponse, PasskeyAuthenticateOptionsRequest, PasskeyAuthenticateVerifyRequest,
    PasskeyOptionsResponse, PasskeyRegisterVerifyRequest, PasskeyRegisterVerifyResponse,
    StatusMessage,
};

impl ApiClient {
    /// Fetch registration ceremony options for the logged-in account
    pub async fn passkey_register_options(&self) -> Result<PasskeyOptionsResponse, ClientError> {
        self.execute_authed(
            Method::POST,
            "/api/v1/accounts/auth/passkey/register/options/",
            None,
        )
        .await
    }

    /// Submit the authenticator's registration response for verification
    pub async fn passkey_register_verify(
        &self,
        request: PasskeyRegisterVerifyRequest,
    ) -> Result<PasskeyRegisterVerifyResponse, ClientError> {
        let body = serde_json::to_value(&request)?;
        self.execute_authed(
            Method::POST,
            "/api/v1/accounts/auth/passkey/register/verify/",
            Some(&body),
        )
        .await
    }

    /// Fetch authentication ceremony options (no session required)
    pub async fn passkey_authenticate_options(
        &self,
        email: Option<String>,
    ) -> Result<PasskeyOptionsResponse, ClientError> {
        let req = self
            .request(
                Method::POST,
                "/api/v1/accounts/auth/passkey/authenticate/options/",
            )
            .json(&PasskeyAuthenticateOptionsRequest { email });
        self.execute(req).await
    }

    /// Complete passkey login, persisting the issued credential pair
    pub async fn passkey_authenticate_verify(
        &self,
        request: PasskeyAuthenticateVerifyRequest,
    ) -> Result<LoginResponse, ClientError> {
        let req = self
            .request(
                Method::POST,
                "/api/v1/accounts/auth/passkey/authenticate/verify/",
            )
            .json(&request);
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

    /// List the account's registered passkeys
    pub async fn passkeys(&self) -> Result<Page<PasskeyInfo>, ClientError> {
        self.execute_authed(Method::GET, "/api/v1/accounts/passkeys/", None)
            .await
    }

    /// Delete a registered passkey
    pub async fn delete_passkey(&self, id: i64) -> Result<(), ClientError> {
        self.execute_authed_unit(
            Method::DELETE,
            &format!("/api/v1/accounts/passkeys/{id}/"),
            None,
        )
        .await
    }

    /// Rename a passkey via the management endpoint
    pub async fn rename_passkey(
        &self,
        credential_id: impl Into<String>,
        device_name: impl Into<String>,
    ) -> Result<StatusMessage, ClientError> {
        let body = serde_json::json!({
            "credential_id": credential_id.into(),
            "device_name": device_name.into(),
        });
        self.execute_authed(
            Method::POST,
            "/api/v1/accounts/auth/passkey/manage/",
            Some(&body),
        )
        .await
    }
}
