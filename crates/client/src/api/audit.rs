//! Audit log API client methods

use reqwest::Method;

use atelier_core::types::{AuditLogEntry, Page};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::types::AuditQuery;

impl ApiClient {
    /// List audit log entries, newest first
    pub async fn audit_logs(&self, query: AuditQuery) -> Result<Page<AuditLogEntry>, ClientError> {
        self.execute_authed_query(Method::GET, "/api/v1/audit/logs/", None, &query.to_pairs())
            .await
    }
}
