//! Atelier admin API client
//!
//! A typed async client for the atelier administration API. Authenticated
//! requests go through a refresh-aware coordinator: concurrent 401s collapse
//! into a single token-refresh call, requests arriving mid-refresh queue and
//! replay afterwards, and an unrecoverable refresh tears the session down and
//! notifies the host through a [`SessionSink`].
//!
//! ```no_run
//! use atelier_client::ApiClient;
//!
//! # async fn run() -> Result<(), atelier_client::ClientError> {
//! let client = ApiClient::new("https://admin.example.com")?;
//! client.login("ops@example.com", "secret", false).await?;
//! let settings = client.system_settings().await?;
//! println!("{}", settings.company_name);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::auth::SessionListResponse;
pub use client::{ApiClient, ApiClientBuilder, NoopSessionSink, SessionSink};
pub use error::{ClientError, RefreshError};
