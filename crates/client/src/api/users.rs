//! User management API client methods

use reqwest::Method;

use atelier_core::types::{Page, User};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::types::{StatusMessage, UserCreate, UserUpdate};

impl ApiClient {
    /// List accounts, one page at a time
    pub async fn users(&self, page: Option<u32>) -> Result<Page<User>, ClientError> {
        let query: Vec<(String, String)> = page
            .map(|p| vec![("page".to_string(), p.to_string())])
            .unwrap_or_default();
        self.execute_authed_query(Method::GET, "/api/v1/accounts/users/", None, &query)
            .await
    }

    /// Fetch a single account
    pub async fn user(&self, id: i64) -> Result<User, ClientError> {
        self.execute_authed(Method::GET, &format!("/api/v1/accounts/users/{id}/"), None)
            .await
    }

    /// Create an account (admin only)
    pub async fn create_user(&self, request: UserCreate) -> Result<User, ClientError> {
        let body = serde_json::to_value(&request)?;
        self.execute_authed(Method::POST, "/api/v1/accounts/users/", Some(&body))
            .await
    }

    /// Partially update an account (admin only)
    pub async fn update_user(&self, id: i64, request: UserUpdate) -> Result<User, ClientError> {
        let body = serde_json::to_value(&request)?;
        self.execute_authed(
            Method::PATCH,
            &format!("/api/v1/accounts/users/{id}/"),
            Some(&body),
        )
        .await
    }

    /// Delete an account through the plain resource endpoint (admin only)
    pub async fn delete_user(&self, id: i64) -> Result<(), ClientError> {
        self.execute_authed_unit(
            Method::DELETE,
            &format!("/api/v1/accounts/users/{id}/"),
            None,
        )
        .await
    }

    /// Mark an account deleted while keeping its rows (admin only)
    pub async fn soft_delete_user(&self, id: i64) -> Result<StatusMessage, ClientError> {
        self.execute_authed(
            Method::POST,
            &format!("/api/v1/accounts/users/{id}/soft_delete/"),
            None,
        )
        .await
    }

    /// Restore a soft-deleted account (admin only)
    pub async fn restore_user(&self, id: i64) -> Result<StatusMessage, ClientError> {
        self.execute_authed(
            Method::POST,
            &format!("/api/v1/accounts/users/{id}/restore/"),
            None,
        )
        .await
    }

    /// Permanently delete an account and its data (admin only)
    pub async fn hard_delete_user(&self, id: i64) -> Result<StatusMessage, ClientError> {
        self.execute_authed(
            Method::POST,
            &format!("/api/v1/accounts/users/{id}/hard_delete/"),
            None,
        )
        .await
    }

    /// Fetch the logged-in account
    pub async fn me(&self) -> Result<User, ClientError> {
        self.execute_authed(Method::GET, "/api/v1/accounts/users/me/", None)
            .await
    }

    /// Update the logged-in account
    pub async fn update_me(&self, request: UserUpdate) -> Result<User, ClientError> {
        let body = serde_json::to_value(&request)?;
        self.execute_authed(
            Method::PATCH,
            "/api/v1/accounts/users/update_me/",
            Some(&body),
        )
        .await
    }
}
