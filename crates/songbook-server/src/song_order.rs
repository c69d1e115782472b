//! The song ordering file: a JSON array of song ids in display order

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::debug;

/// Distinguishes temp files of writes racing inside one process
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Replace the ordering file with `ids`.
///
/// The array is written to a sibling temp file and renamed over the target, so
/// readers see either the previous order or the new one. Concurrent writers
/// race and the last rename wins.
pub async fn write(path: &Path, ids: &[String]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_vec_pretty(ids)?;
    let tmp = temp_path(path);
    fs::write(&tmp, json).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }

    debug!(path = ?path, count = ids.len(), "Song order written");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "songs.json".into());
    let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
    name.push(format!(".{}.{}.tmp", std::process::id(), seq));
    path.with_file_name(name)
}
