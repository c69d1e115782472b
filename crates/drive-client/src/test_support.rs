//! Throwaway HTTP servers standing in for Google's endpoints in tests

use crate::token::{CredentialKey, CredentialStore, MemoryCredentialStore};
use axum::Router;
use std::sync::Arc;

/// Serve `router` on an ephemeral localhost port and return its base URL
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A credential store holding a complete set of OAuth credentials
pub async fn seeded_store() -> Arc<MemoryCredentialStore> {
    let store = Arc::new(MemoryCredentialStore::default());
    store
        .set(CredentialKey::ClientId, "client-id.apps.googleusercontent.com")
        .await
        .unwrap();
    store
        .set(CredentialKey::ClientSecret, "client-secret")
        .await
        .unwrap();
    store
        .set(CredentialKey::RefreshToken, "1//refresh-original")
        .await
        .unwrap();
    store
}
