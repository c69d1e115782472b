//! Runs migrations, seeds the default genres and copies provider credentials
//! from the environment into the config store.

use songbook_db::{ConfigKey, PgPool};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Genres every install starts with
const DEFAULT_GENRES: [(&str, &str); 10] = [
    ("k-pop", "케이팝"),
    ("ballad", "발라드"),
    ("rock", "락"),
    ("hip-hop", "힙합"),
    ("r-and-b", "R&B"),
    ("indie", "인디"),
    ("ccm", "CCM"),
    ("gospel", "가스펠"),
    ("praise", "찬양"),
    ("hymn", "찬송가"),
];

/// Config keys with a non-empty value from `lookup`
fn config_from_env(lookup: impl Fn(&str) -> Option<String>) -> Vec<(ConfigKey, String)> {
    ConfigKey::ALL
        .into_iter()
        .filter_map(|key| {
            lookup(key.as_str())
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        })
        .collect()
}

async fn seed_genres(pool: &PgPool) -> Result<(), sqlx::Error> {
    for (id, name) in DEFAULT_GENRES {
        songbook_db::genres::upsert(pool, id, name).await?;
    }
    info!(count = DEFAULT_GENRES.len(), "Default genres seeded");
    Ok(())
}

async fn seed_config(pool: &PgPool) -> Result<(), sqlx::Error> {
    let values = config_from_env(|k| std::env::var(k).ok());
    for (key, value) in &values {
        songbook_db::config::set(pool, key.as_str(), value).await?;
        info!(key = key.as_str(), "Config value stored");
    }

    let stored = songbook_db::config::get_all(pool).await?;
    for key in [
        ConfigKey::GoogleDriveClientId,
        ConfigKey::GoogleDriveClientSecret,
        ConfigKey::GoogleDriveRefreshToken,
    ] {
        if !stored.iter().any(|row| row.key == key.as_str()) {
            warn!(key = key.as_str(), "Drive credential not configured");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("songbook_db=info".parse()?)
        .add_directive("songbook_migrate=info".parse()?);

    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/songbook".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;

    songbook_db::migrate::migrate(&pool).await?;
    seed_genres(&pool).await?;
    seed_config(&pool).await?;

    info!("Migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn test_default_genre_ids_are_unique() {
        let ids: HashSet<_> = DEFAULT_GENRES.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids.len(), DEFAULT_GENRES.len());
        assert!(ids.contains("k-pop"));
        assert!(ids.contains("hymn"));
    }

    #[test]
    fn test_config_from_env_skips_missing_and_empty() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GOOGLE_DRIVE_CLIENT_ID", "client-id"),
            ("GOOGLE_DRIVE_REFRESH_TOKEN", ""),
            ("UNRELATED", "x"),
        ]);

        let values = config_from_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(
            values,
            vec![(ConfigKey::GoogleDriveClientId, "client-id".to_string())]
        );
    }
}
