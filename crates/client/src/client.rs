//! Admin API client and its refresh-aware request coordinator
//!
//! All authenticated traffic funnels through [`ApiClient::authed_response`]:
//! it attaches the stored bearer token and on a 401 runs the refresh
//! protocol. At most one refresh call is in flight at any time; requests
//! that hit 401 while a refresh is outstanding park on a oneshot channel and
//! are woken FIFO when the refresh settles. A failed refresh clears the
//! stored credentials, fires [`SessionSink::session_expired`] once, and
//! rejects every parked request with the same cause.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Method, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use atelier_core::credentials::{
    CredentialStore, MemoryCredentialStore, StoredSession, TokenPair, mask_token,
};

use crate::error::{ClientError, RefreshError};
use crate::types::{TokenRefreshRequest, TokenRefreshResponse};

/// Refresh endpoint, relative to the base URL
const TOKEN_REFRESH_PATH: &str = "/api/v1/accounts/auth/token/refresh/";

/// Default user agent for outgoing requests
const USER_AGENT: &str = concat!("atelier-client/", env!("CARGO_PKG_VERSION"));

/// Host-supplied reaction to an unrecoverable session failure
///
/// The client never owns navigation; when refresh fails it clears the
/// credentials and hands control here. A UI host would route to its login
/// screen, a CLI prints a re-login hint.
pub trait SessionSink: Send + Sync {
    fn session_expired(&self);
}

/// Sink that ignores session teardown notifications
pub struct NoopSessionSink;

impl SessionSink for NoopSessionSink {
    fn session_expired(&self) {}
}

/// Outcome of one refresh cycle, fanned out to every parked request
type RefreshOutcome = Result<String, RefreshError>;

/// Refresh coordination state; the mutex is never held across an await
#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

struct ClientInner {
    http: Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    sink: Arc<dyn SessionSink>,
    refresh: Mutex<RefreshState>,
}

/// Atelier admin API client
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    /// Create a client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Read the persisted session, if any
    pub fn stored_session(&self) -> Result<Option<StoredSession>, ClientError> {
        Ok(self.inner.store.load()?)
    }

    /// Persist a freshly issued credential pair (login, passkey verify)
    pub(crate) fn store_session(&self, session: &StoredSession) -> Result<(), ClientError> {
        self.inner.store.save(session)?;
        Ok(())
    }

    /// Drop the persisted session without notifying the sink (explicit logout)
    pub(crate) fn clear_session(&self) -> Result<(), ClientError> {
        self.inner.store.clear()?;
        Ok(())
    }

    /// Replace the stored session with an existing token pair
    pub fn set_tokens(&self, tokens: TokenPair) -> Result<(), ClientError> {
        self.store_session(&StoredSession::new(tokens))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    /// Request builder for public (unauthenticated) endpoints
    pub(crate) fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.inner.http.request(method, self.url(path))
    }

    /// Execute a public request and decode the response
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(ClientError::from_status(status, message))
        }
    }

    /// Execute an authenticated request and decode the response
    pub(crate) async fn execute_authed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&JsonValue>,
    ) -> Result<T, ClientError> {
        self.execute_authed_query(method, path, body, &[]).await
    }

    /// Execute an authenticated request with query parameters
    pub(crate) async fn execute_authed_query<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&JsonValue>,
        query: &[(String, String)],
    ) -> Result<T, ClientError> {
        let response = self.authed_response(method, path, body, query).await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(ClientError::from_status(status, message))
        }
    }

    /// Authenticated request whose success response carries no body
    pub(crate) async fn execute_authed_unit(
        &self,
        method: Method,
        path: &str,
        body: Option<&JsonValue>,
    ) -> Result<(), ClientError> {
        let response = self.authed_response(method, path, body, &[]).await?;
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(ClientError::from_status(status, message))
        }
    }

    /// Issue an authenticated request, refreshing the access token once on 401
    ///
    /// The attempt counter is carried by value: the request descriptor is
    /// rebuilt for the retry, never mutated. A second 401 for the same
    /// request is a hard failure, so a refresh loop cannot form.
    pub(crate) async fn authed_response(
        &self,
        method: Method,
        path: &str,
        body: Option<&JsonValue>,
        query: &[(String, String)],
    ) -> Result<Response, ClientError> {
        let mut bearer = self
            .inner
            .store
            .load()?
            .map(|session| session.tokens.access);
        let mut attempt: u8 = 0;

        loop {
            let mut request = self.inner.http.request(method.clone(), self.url(path));
            if let Some(token) = &bearer {
                request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await?;
            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            if attempt >= 1 {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "access token rejected after refresh".to_string());
                return Err(ClientError::AuthenticationFailed(message));
            }
            attempt += 1;

            debug!(path, "access token rejected, entering refresh protocol");
            bearer = Some(self.refresh_access().await?);
        }
    }

    /// Obtain a fresh access token, joining any refresh already in flight
    ///
    /// Exactly one caller per cycle performs the HTTP refresh; everyone else
    /// parks on a oneshot and receives the settled outcome in FIFO order.
    async fn refresh_access(&self) -> Result<String, ClientError> {
        let parked = {
            let mut state = self.inner.refresh.lock().expect("refresh state poisoned");
            if state.in_flight {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Some(rx)
            } else {
                state.in_flight = true;
                None
            }
        };

        if let Some(rx) = parked {
            return match rx.await {
                Ok(Ok(access)) => Ok(access),
                Ok(Err(err)) => Err(ClientError::SessionExpired(err.to_string())),
                // The refreshing task can only vanish mid-cycle if its future
                // was dropped; treat that as a failed refresh.
                Err(_) => Err(ClientError::SessionExpired(
                    "refresh was abandoned".to_string(),
                )),
            };
        }

        let outcome = self.perform_refresh().await;

        let waiters = {
            let mut state = self.inner.refresh.lock().expect("refresh state poisoned");
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }

        outcome.map_err(|err| ClientError::SessionExpired(err.to_string()))
    }

    /// Call the refresh endpoint and persist the rotated credential pair
    ///
    /// Any failure here is fatal to the session: credentials are cleared and
    /// the sink is notified exactly once, before the queue is drained.
    async fn perform_refresh(&self) -> RefreshOutcome {
        let session = self
            .inner
            .store
            .load()
            .map_err(|err| self.teardown(RefreshError::new(err.to_string())))?;

        let Some(mut session) = session else {
            return Err(self.teardown(RefreshError::new("no refresh token stored")));
        };

        let request = TokenRefreshRequest {
            refresh: session.tokens.refresh.clone(),
        };
        let response = self
            .inner
            .http
            .post(self.url(TOKEN_REFRESH_PATH))
            .json(&request)
            .send()
            .await
            .map_err(|err| self.teardown(RefreshError::new(format!("refresh request: {err}"))))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(self.teardown(RefreshError::new(format!(
                "refresh rejected ({status}): {body}"
            ))));
        }

        let tokens: TokenRefreshResponse = response
            .json()
            .await
            .map_err(|err| self.teardown(RefreshError::new(format!("refresh response: {err}"))))?;

        session.tokens.access = tokens.access.clone();
        if let Some(rotated) = tokens.refresh {
            session.tokens.refresh = rotated;
        }
        self.inner
            .store
            .save(&session)
            .map_err(|err| self.teardown(RefreshError::new(format!("persist tokens: {err}"))))?;

        debug!(access = %mask_token(&tokens.access), "access token refreshed");
        Ok(tokens.access)
    }

    /// Tear the session down: clear credentials, signal the host
    fn teardown(&self, err: RefreshError) -> RefreshError {
        warn!(error = %err, "token refresh failed, ending session");
        if let Err(clear_err) = self.inner.store.clear() {
            warn!(error = %clear_err, "failed to clear stored credentials");
        }
        self.inner.sink.session_expired();
        err
    }
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    store: Option<Arc<dyn CredentialStore>>,
    sink: Option<Arc<dyn SessionSink>>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ApiClientBuilder {
    /// Set the base URL (scheme + host, no trailing slash required)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the credential store (defaults to an in-memory store)
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the session-expiry sink (defaults to a no-op)
    pub fn session_sink(mut self, sink: Arc<dyn SessionSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;
        let base_url = base_url.trim_end_matches('/').to_string();

        url::Url::parse(&base_url)
            .map_err(|err| ClientError::Configuration(format!("invalid base_url: {err}")))?;

        let mut http = ClientBuilder::new()
            .user_agent(self.user_agent.unwrap_or_else(|| USER_AGENT.to_string()));
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http.build()?;

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                store: self
                    .store
                    .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new())),
                sink: self.sink.unwrap_or_else(|| Arc::new(NoopSessionSink)),
                refresh: Mutex::new(RefreshState::default()),
            }),
        })
    }
}
