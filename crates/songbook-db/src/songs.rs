use crate::types::SongRow;
use sqlx::PgPool;

const SONG_COLUMNS: &str = r#"
    s.id, s.title, s.file_name, s.artist, s.drive_file_id, s.file_url,
    s.duration, s.image_id, s.image_url, s.lyrics, s.chapter_id, s.genre_id,
    s.is_new, s.created_at, s.updated_at
"#;

/// A page of songs, ordered by chapter then file name
pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<SongRow>, sqlx::Error> {
    let query = format!(
        r#"
        SELECT {SONG_COLUMNS}
        FROM songs s
        JOIN chapters c ON c.id = s.chapter_id
        ORDER BY c.chapter_order ASC, s.file_name ASC
        LIMIT $1 OFFSET $2
        "#
    );
    sqlx::query_as::<_, SongRow>(&query)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Get a single song
pub async fn get(pool: &PgPool, id: i32) -> Result<Option<SongRow>, sqlx::Error> {
    let query = format!("SELECT {SONG_COLUMNS} FROM songs s WHERE s.id = $1");
    sqlx::query_as::<_, SongRow>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// All songs in a chapter, ordered by file name
pub async fn list_for_chapter(pool: &PgPool, chapter_id: i32) -> Result<Vec<SongRow>, sqlx::Error> {
    let query = format!(
        "SELECT {SONG_COLUMNS} FROM songs s WHERE s.chapter_id = $1 ORDER BY s.file_name ASC"
    );
    sqlx::query_as::<_, SongRow>(&query)
        .bind(chapter_id)
        .fetch_all(pool)
        .await
}

/// Replace a song's lyrics. Returns `None` if the song does not exist.
pub async fn update_lyrics(
    pool: &PgPool,
    id: i32,
    lyrics: &str,
) -> Result<Option<SongRow>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE songs s SET lyrics = $2, updated_at = NOW()
        WHERE s.id = $1
        RETURNING {SONG_COLUMNS}
        "#
    );
    sqlx::query_as::<_, SongRow>(&query)
        .bind(id)
        .bind(lyrics)
        .fetch_optional(pool)
        .await
}

/// Clear the "new" badge on a song. Returns `None` if the song does not exist.
pub async fn clear_new_flag(pool: &PgPool, id: i32) -> Result<Option<SongRow>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE songs s SET is_new = FALSE, updated_at = NOW()
        WHERE s.id = $1
        RETURNING {SONG_COLUMNS}
        "#
    );
    sqlx::query_as::<_, SongRow>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}
