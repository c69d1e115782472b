use crate::types::{ChapterRow, ChapterWithSongs};
use sqlx::PgPool;

/// Get a chapter row
pub async fn get(pool: &PgPool, id: i32) -> Result<Option<ChapterRow>, sqlx::Error> {
    sqlx::query_as::<_, ChapterRow>(
        "SELECT id, name, chapter_order, created_at, updated_at FROM chapters WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Get a chapter together with its songs
pub async fn get_with_songs(
    pool: &PgPool,
    id: i32,
) -> Result<Option<ChapterWithSongs>, sqlx::Error> {
    let Some(chapter) = get(pool, id).await? else {
        return Ok(None);
    };
    let songs = crate::songs::list_for_chapter(pool, id).await?;
    Ok(Some(ChapterWithSongs { chapter, songs }))
}
