//! Drive OAuth credentials backed by the `app_config` table

use async_trait::async_trait;
use drive_client::{CredentialKey, CredentialStore, DriveError};
use songbook_db::ConfigKey;
use sqlx::PgPool;

/// Reads and persists the Drive client id, secret and refresh token through
/// the database config store.
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub fn config_key(key: CredentialKey) -> ConfigKey {
    match key {
        CredentialKey::ClientId => ConfigKey::GoogleDriveClientId,
        CredentialKey::ClientSecret => ConfigKey::GoogleDriveClientSecret,
        CredentialKey::RefreshToken => ConfigKey::GoogleDriveRefreshToken,
    }
}

fn store_error(e: sqlx::Error) -> DriveError {
    DriveError::Store(e.to_string())
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn get(&self, key: CredentialKey) -> drive_client::Result<Option<String>> {
        songbook_db::config::get(&self.pool, config_key(key).as_str())
            .await
            .map_err(store_error)
    }

    async fn set(&self, key: CredentialKey, value: &str) -> drive_client::Result<()> {
        songbook_db::config::set(&self.pool, config_key(key).as_str(), value)
            .await
            .map_err(store_error)
    }
}
