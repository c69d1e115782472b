// Key/value runtime configuration (the `app_config` table)

use crate::types::ConfigRow;

/// Get a config value
pub async fn get(
    executor: impl sqlx::PgExecutor<'_>,
    key: &str,
) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM app_config WHERE key = $1")
        .bind(key)
        .fetch_optional(executor)
        .await?;
    Ok(row.map(|r| r.0))
}

/// Insert or overwrite a config value
pub async fn set(
    executor: impl sqlx::PgExecutor<'_>,
    key: &str,
    value: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO app_config (key, value)
        VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET value = $2
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(executor)
    .await?;
    Ok(())
}

/// Update an existing config value. Returns `None` when the key does not exist.
pub async fn update(
    executor: impl sqlx::PgExecutor<'_>,
    key: &str,
    value: &str,
) -> Result<Option<ConfigRow>, sqlx::Error> {
    sqlx::query_as::<_, ConfigRow>(
        "UPDATE app_config SET value = $2 WHERE key = $1 RETURNING key, value",
    )
    .bind(key)
    .bind(value)
    .fetch_optional(executor)
    .await
}

/// All config rows, ordered by key
pub async fn get_all(executor: impl sqlx::PgExecutor<'_>) -> Result<Vec<ConfigRow>, sqlx::Error> {
    sqlx::query_as::<_, ConfigRow>("SELECT key, value FROM app_config ORDER BY key")
        .fetch_all(executor)
        .await
}
