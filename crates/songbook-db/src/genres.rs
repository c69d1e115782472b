use crate::types::GenreRow;
use sqlx::PgPool;

/// All genres ordered by name
pub async fn list(pool: &PgPool) -> Result<Vec<GenreRow>, sqlx::Error> {
    sqlx::query_as::<_, GenreRow>("SELECT id, name FROM genres ORDER BY name ASC")
        .fetch_all(pool)
        .await
}

/// Create a genre. Returns `None` if the id is already taken.
pub async fn create(pool: &PgPool, id: &str, name: &str) -> Result<Option<GenreRow>, sqlx::Error> {
    sqlx::query_as::<_, GenreRow>(
        r#"
        INSERT INTO genres (id, name)
        VALUES ($1, $2)
        ON CONFLICT (id) DO NOTHING
        RETURNING id, name
        "#,
    )
    .bind(id)
    .bind(name)
    .fetch_optional(pool)
    .await
}

/// Insert a genre, leaving an existing row untouched (used by seeding)
pub async fn upsert(pool: &PgPool, id: &str, name: &str) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO genres (id, name) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(())
}

/// Rename a genre. Returns `None` if it does not exist.
pub async fn update(pool: &PgPool, id: &str, name: &str) -> Result<Option<GenreRow>, sqlx::Error> {
    sqlx::query_as::<_, GenreRow>("UPDATE genres SET name = $2 WHERE id = $1 RETURNING id, name")
        .bind(id)
        .bind(name)
        .fetch_optional(pool)
        .await
}

/// Delete a genre. Returns whether a row was removed.
pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM genres WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
