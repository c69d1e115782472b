//! OAuth access-token refresh for the Drive API

use crate::error::{DriveError, Result};
use crate::types::{AccessToken, TokenErrorResponse, TokenResponse};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Credentials the refresher reads from (and writes back to) persistent config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    ClientId,
    ClientSecret,
    RefreshToken,
}

impl CredentialKey {
    fn describe(&self) -> &'static str {
        match self {
            CredentialKey::ClientId => "OAuth client id",
            CredentialKey::ClientSecret => "OAuth client secret",
            CredentialKey::RefreshToken => "refresh token",
        }
    }
}

/// Persistent storage for OAuth credentials
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>>;
    async fn set(&self, key: CredentialKey, value: &str) -> Result<()>;
}

/// In-process credential store, for local development and tests
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: RwLock<HashMap<CredentialKey, String>>,
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        Ok(self.values.read().await.get(&key).cloned())
    }

    async fn set(&self, key: CredentialKey, value: &str) -> Result<()> {
        self.values.write().await.insert(key, value.to_string());
        Ok(())
    }
}

/// Maintains the process-wide Drive access token.
///
/// The token cell is only locked to read or replace it, never across the
/// network call, so concurrent callers that all find the token stale may each
/// refresh. The provider treats refreshes as idempotent and the last write wins.
pub struct TokenRefresher {
    http: Client,
    token_url: String,
    store: Arc<dyn CredentialStore>,
    current: RwLock<Option<AccessToken>>,
    margin: Duration,
}

impl TokenRefresher {
    pub const DEFAULT_TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";
    /// Tokens this close to expiry are treated as expired
    pub const DEFAULT_MARGIN_SECS: i64 = 60;
    /// Lifetime assumed when the provider omits `expires_in`
    const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self::with_token_url(store, Self::DEFAULT_TOKEN_URL)
    }

    pub fn with_token_url(store: Arc<dyn CredentialStore>, token_url: &str) -> Self {
        Self {
            http: Client::new(),
            token_url: token_url.to_string(),
            store,
            current: RwLock::new(None),
            margin: Duration::seconds(Self::DEFAULT_MARGIN_SECS),
        }
    }

    /// Return a token that is not expired, refreshing first if the cached one is
    /// missing or inside the safety margin.
    pub async fn ensure_valid_token(&self) -> Result<AccessToken> {
        let cached = self.current.read().await.clone();
        if let Some(token) = cached {
            if token.is_fresh(self.margin) {
                return Ok(token);
            }
            debug!(expires_at = %token.expires_at, "Access token stale, refreshing");
        }
        self.refresh().await
    }

    /// Drop the cached token so the next caller refreshes
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
    }

    /// Exchange the stored refresh credential for a new access token
    pub async fn refresh(&self) -> Result<AccessToken> {
        let client_id = self.credential(CredentialKey::ClientId).await?;
        let client_secret = self.credential(CredentialKey::ClientSecret).await?;
        let refresh_token = self.credential(CredentialKey::RefreshToken).await?;

        let body = format!(
            "grant_type=refresh_token&client_id={}&client_secret={}&refresh_token={}",
            urlencoding::encode(&client_id),
            urlencoding::encode(&client_secret),
            urlencoding::encode(&refresh_token),
        );

        let response = self
            .http
            .post(&self.token_url)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body)
            .send()
            .await
            .map_err(|e| DriveError::Auth(format!("token endpoint unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<TokenErrorResponse>(&text)
                .map(|e| match e.error_description {
                    Some(desc) => format!("{} ({})", e.error, desc),
                    None => e.error,
                })
                .unwrap_or_else(|_| status.to_string());
            warn!(status = %status, reason = %reason, "Token refresh rejected");
            return Err(DriveError::Auth(format!(
                "token refresh rejected: {}",
                reason
            )));
        }

        let grant: TokenResponse = response
            .json()
            .await
            .map_err(|e| DriveError::Auth(format!("invalid token response: {}", e)))?;

        let expires_in = grant.expires_in.unwrap_or(Self::DEFAULT_EXPIRES_IN_SECS);
        let token = AccessToken::new(grant.access_token, Utc::now() + Duration::seconds(expires_in));
        if token.is_expired() {
            return Err(DriveError::Auth(format!(
                "provider issued a token expiring in {}s",
                expires_in
            )));
        }

        if let Some(rotated) = grant.refresh_token.filter(|t| *t != refresh_token) {
            match self.store.set(CredentialKey::RefreshToken, &rotated).await {
                Ok(()) => info!("Stored rotated refresh token"),
                Err(e) => warn!(error = %e, "Failed to persist rotated refresh token"),
            }
        }

        *self.current.write().await = Some(token.clone());
        info!(expires_in, "Refreshed Drive access token");
        Ok(token)
    }

    async fn credential(&self, key: CredentialKey) -> Result<String> {
        self.store
            .get(key)
            .await?
            .filter(|v| !v.is_empty())
            .ok_or_else(|| DriveError::Auth(format!("missing {}", key.describe())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seeded_store, spawn};
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Clone)]
    struct FakeOAuth {
        calls: Arc<AtomicUsize>,
        last_body: Arc<Mutex<Option<String>>>,
        status: StatusCode,
        reply: Value,
    }

    impl FakeOAuth {
        fn new(status: StatusCode, reply: Value) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                last_body: Arc::new(Mutex::new(None)),
                status,
                reply,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn serve(&self) -> String {
            let router = Router::new()
                .route("/token", post(token_endpoint))
                .with_state(self.clone());
            format!("{}/token", spawn(router).await)
        }
    }

    async fn token_endpoint(
        State(fake): State<FakeOAuth>,
        body: String,
    ) -> (StatusCode, Json<Value>) {
        fake.calls.fetch_add(1, Ordering::SeqCst);
        *fake.last_body.lock().unwrap() = Some(body);
        (fake.status, Json(fake.reply.clone()))
    }

    #[tokio::test]
    async fn test_ensure_valid_token_refreshes_once_then_caches() {
        let fake = FakeOAuth::new(
            StatusCode::OK,
            json!({ "access_token": "ya29.first", "expires_in": 3599, "token_type": "Bearer" }),
        );
        let url = fake.serve().await;
        let refresher = TokenRefresher::with_token_url(seeded_store().await, &url);

        let first = refresher.ensure_valid_token().await.unwrap();
        let second = refresher.ensure_valid_token().await.unwrap();

        assert_eq!(first.value, "ya29.first");
        assert_eq!(first, second);
        assert!(!second.is_expired());
        assert_eq!(fake.calls(), 1);

        let body = fake.last_body.lock().unwrap().clone().unwrap();
        assert!(body.contains("grant_type=refresh_token"));
        assert!(body.contains("refresh_token=1%2F%2Frefresh-original"));
        assert!(body.contains("client_secret=client-secret"));
    }

    #[tokio::test]
    async fn test_token_inside_margin_is_refreshed() {
        // 30s lifetime is shorter than the 60s margin, so every call refreshes
        let fake = FakeOAuth::new(
            StatusCode::OK,
            json!({ "access_token": "ya29.short", "expires_in": 30 }),
        );
        let url = fake.serve().await;
        let refresher = TokenRefresher::with_token_url(seeded_store().await, &url);

        let token = refresher.ensure_valid_token().await.unwrap();
        assert!(!token.is_expired());
        refresher.ensure_valid_token().await.unwrap();

        assert_eq!(fake.calls(), 2);
    }

    #[tokio::test]
    async fn test_already_expired_grant_is_rejected() {
        let fake = FakeOAuth::new(
            StatusCode::OK,
            json!({ "access_token": "ya29.dead", "expires_in": 0 }),
        );
        let url = fake.serve().await;
        let refresher = TokenRefresher::with_token_url(seeded_store().await, &url);

        let err = refresher.ensure_valid_token().await.unwrap_err();
        assert!(matches!(err, DriveError::Auth(_)));
    }

    #[tokio::test]
    async fn test_rotated_refresh_token_is_persisted() {
        let fake = FakeOAuth::new(
            StatusCode::OK,
            json!({
                "access_token": "ya29.rotated",
                "expires_in": 3599,
                "refresh_token": "1//refresh-rotated"
            }),
        );
        let url = fake.serve().await;
        let store = seeded_store().await;
        let refresher = TokenRefresher::with_token_url(store.clone(), &url);

        refresher.refresh().await.unwrap();

        let stored = store.get(CredentialKey::RefreshToken).await.unwrap();
        assert_eq!(stored.as_deref(), Some("1//refresh-rotated"));
    }

    #[tokio::test]
    async fn test_rejected_grant_is_auth_error() {
        let fake = FakeOAuth::new(
            StatusCode::BAD_REQUEST,
            json!({ "error": "invalid_grant", "error_description": "Token has been expired or revoked." }),
        );
        let url = fake.serve().await;
        let refresher = TokenRefresher::with_token_url(seeded_store().await, &url);

        let err = refresher.ensure_valid_token().await.unwrap_err();
        match err {
            DriveError::Auth(msg) => assert!(msg.contains("invalid_grant")),
            other => panic!("expected auth error, got {:?}", other),
        }
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_refresh_token_fails_without_request() {
        let fake = FakeOAuth::new(StatusCode::OK, json!({ "access_token": "unused" }));
        let url = fake.serve().await;
        let store = Arc::new(MemoryCredentialStore::default());
        store.set(CredentialKey::ClientId, "id").await.unwrap();
        store.set(CredentialKey::ClientSecret, "secret").await.unwrap();
        let refresher = TokenRefresher::with_token_url(store, &url);

        let err = refresher.ensure_valid_token().await.unwrap_err();
        match err {
            DriveError::Auth(msg) => assert_eq!(msg, "missing refresh token"),
            other => panic!("expected auth error, got {:?}", other),
        }
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let fake = FakeOAuth::new(
            StatusCode::OK,
            json!({ "access_token": "ya29.again", "expires_in": 3599 }),
        );
        let url = fake.serve().await;
        let refresher = TokenRefresher::with_token_url(seeded_store().await, &url);

        refresher.ensure_valid_token().await.unwrap();
        refresher.invalidate().await;
        refresher.ensure_valid_token().await.unwrap();

        assert_eq!(fake.calls(), 2);
    }
}
