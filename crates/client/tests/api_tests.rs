//! Integration tests for the typed API surface

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use atelier_client::types::{
    AuditQuery, PasskeyAuthenticateVerifyRequest, SystemSettingsUpdate, UserUpdate,
};
use atelier_client::{ApiClient, ClientError};
use atelier_core::credentials::{CredentialStore, MemoryCredentialStore, StoredSession, TokenPair};
use atelier_core::types::UserRole;

fn seeded_store() -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with_session(StoredSession::new(
        TokenPair {
            access: "valid".to_string(),
            refresh: "r1".to_string(),
        },
    )))
}

fn authed_client(server: &MockServer, store: Arc<MemoryCredentialStore>) -> ApiClient {
    ApiClient::builder()
        .base_url(server.uri())
        .credential_store(store)
        .build()
        .unwrap()
}

fn user_body(id: i64, email: &str) -> serde_json::Value {
    json!({
        "id": id,
        "email": email,
        "first_name": "Nina",
        "last_name": "Vetiver",
        "role": "MANAGER",
        "is_active": true,
        "created_at": "2025-02-01T08:00:00Z",
        "updated_at": "2025-02-01T08:00:00Z"
    })
}

#[tokio::test]
async fn login_persists_tokens_and_user() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryCredentialStore::new());

    Mock::given(method("POST"))
        .and(path("/api/v1/accounts/auth/login/"))
        .and(body_partial_json(
            json!({"email": "nina@example.com", "password": "pw", "remember_me": true}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "a1",
            "refresh": "r1",
            "user": user_body(3, "nina@example.com"),
            "remember_me": true
        })))
        .mount(&server)
        .await;

    let client = authed_client(&server, store.clone());
    let response = client.login("nina@example.com", "pw", true).await.unwrap();

    assert_eq!(response.user.email, "nina@example.com");
    let session = store.load().unwrap().unwrap();
    assert_eq!(session.tokens.access, "a1");
    assert_eq!(session.tokens.refresh, "r1");
    assert_eq!(session.user.unwrap().id, 3);
}

#[tokio::test]
async fn login_rejection_maps_to_authentication_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/accounts/auth/login/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri()).unwrap();
    let result = client.login("x@example.com", "wrong", false).await;
    assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));
}

#[tokio::test]
async fn logout_clears_session_even_when_endpoint_fails() {
    let server = MockServer::start().await;
    let store = seeded_store();

    Mock::given(method("POST"))
        .and(path("/api/v1/accounts/auth/logout/"))
        .and(header("authorization", "Bearer valid"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = authed_client(&server, store.clone());
    client.logout().await.unwrap();

    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn users_list_decodes_pagination() {
    let server = MockServer::start().await;
    let store = seeded_store();

    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/users/"))
        .and(query_param("page", "2"))
        .and(header("authorization", "Bearer valid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 21,
            "next": null,
            "previous": "http://x/api/v1/accounts/users/?page=1",
            "results": [user_body(20, "a@b.c"), user_body(21, "d@e.f")]
        })))
        .mount(&server)
        .await;

    let client = authed_client(&server, store);
    let page = client.users(Some(2)).await.unwrap();

    assert_eq!(page.count, 21);
    assert!(!page.has_next());
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.results[1].id, 21);
}

#[tokio::test]
async fn update_user_sends_only_set_fields() {
    let server = MockServer::start().await;
    let store = seeded_store();

    Mock::given(method("PATCH"))
        .and(path("/api/v1/accounts/users/9/"))
        .and(body_partial_json(json!({"role": "ADMIN"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(9, "p@q.r")))
        .mount(&server)
        .await;

    let client = authed_client(&server, store);
    let update = UserUpdate {
        role: Some(UserRole::Admin),
        ..Default::default()
    };
    let user = client.update_user(9, update).await.unwrap();
    assert_eq!(user.id, 9);
}

#[tokio::test]
async fn user_fetch_maps_404() {
    let server = MockServer::start().await;
    let store = seeded_store();

    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/users/404/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such user"))
        .mount(&server)
        .await;

    let client = authed_client(&server, store);
    let result = client.user(404).await;
    assert!(matches!(result, Err(ClientError::NotFound(_))));
}

#[tokio::test]
async fn settings_patch_roundtrip() {
    let server = MockServer::start().await;
    let store = seeded_store();

    let settings_body = json!({
        "id": 1,
        "company_name": "Maison Vetiver",
        "currency": "EUR",
        "qr_base_url": "https://qr.example.com",
        "print_agent_url": "https://print.example.com",
        "registration_enabled": false,
        "require_email_verification": true,
        "password_reset_token_expiry_hours": 24,
        "default_loss_factor_oil_percent": "2.50",
        "require_second_batch_scan_on_insufficient": true,
        "show_older_batch_warning": true,
        "analytics_defaults": {},
        "scraper_settings": {},
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-06-01T00:00:00Z"
    });

    Mock::given(method("PATCH"))
        .and(path("/api/v1/settings/settings/1/"))
        .and(body_partial_json(
            json!({"company_name": "Maison Vetiver", "registration_enabled": false}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(&settings_body))
        .mount(&server)
        .await;

    let client = authed_client(&server, store);
    let update = SystemSettingsUpdate {
        company_name: Some("Maison Vetiver".to_string()),
        registration_enabled: Some(false),
        ..Default::default()
    };
    let settings = client.update_system_settings(update).await.unwrap();
    assert_eq!(settings.company_name, "Maison Vetiver");
    assert_eq!(settings.default_loss_factor_oil_percent, "2.50");
}

#[tokio::test]
async fn audit_list_passes_filters_as_query() {
    let server = MockServer::start().await;
    let store = seeded_store();

    Mock::given(method("GET"))
        .and(path("/api/v1/audit/logs/"))
        .and(query_param("action", "USER_UPDATE"))
        .and(query_param("search", "vetiver"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{
                "id": 11,
                "actor": {"id": 3, "email": "nina@example.com"},
                "action": "USER_UPDATE",
                "subject_type": "User",
                "subject_id": 9,
                "payload_before": {"is_active": true},
                "payload_after": {"is_active": false},
                "description": "deactivated",
                "ip": "10.0.0.1",
                "user_agent": "atelier-cli",
                "created_at": "2025-06-01T12:00:00Z"
            }]
        })))
        .mount(&server)
        .await;

    let client = authed_client(&server, store);
    let page = client
        .audit_logs(AuditQuery {
            page: None,
            action: Some("USER_UPDATE".to_string()),
            search: Some("vetiver".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(page.count, 1);
    let entry = &page.results[0];
    assert_eq!(entry.action, "USER_UPDATE");
    assert_eq!(entry.actor.as_ref().unwrap().id, 3);
}

#[tokio::test]
async fn passkey_login_persists_tokens() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryCredentialStore::new());

    Mock::given(method("POST"))
        .and(path("/api/v1/accounts/auth/passkey/authenticate/verify/"))
        .and(body_partial_json(json!({"credential": {"id": "cred-1"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "pk-access",
            "refresh": "pk-refresh",
            "user": user_body(5, "key@example.com")
        })))
        .mount(&server)
        .await;

    let client = authed_client(&server, store.clone());
    let response = client
        .passkey_authenticate_verify(PasskeyAuthenticateVerifyRequest {
            credential: json!({"id": "cred-1", "type": "public-key"}),
            session_data: json!({"challenge": "c1"}),
        })
        .await
        .unwrap();

    assert_eq!(response.user.id, 5);
    let session = store.load().unwrap().unwrap();
    assert_eq!(session.tokens.access, "pk-access");
    assert_eq!(session.tokens.refresh, "pk-refresh");
}

#[tokio::test]
async fn delete_passkey_accepts_no_content() {
    let server = MockServer::start().await;
    let store = seeded_store();

    Mock::given(method("DELETE"))
        .and(path("/api/v1/accounts/passkeys/4/"))
        .and(header("authorization", "Bearer valid"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = authed_client(&server, store);
    client.delete_passkey(4).await.unwrap();
}
