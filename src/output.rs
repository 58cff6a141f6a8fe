use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::Local;
use regex::Regex;

use crate::extract::CanonicalTrack;

static STRIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\s-]").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Write the playlist as pretty-printed UTF-8 JSON, non-ASCII left as-is.
pub fn write_playlist(path: &Path, playlist: &[CanonicalTrack]) -> Result<()> {
    let payload =
        serde_json::to_string_pretty(playlist).context("Failed to serialize playlist")?;
    std::fs::write(path, payload)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Auto-generated output name: sanitized playlist name plus a timestamp.
pub fn default_output_path(playlist_name: &str) -> PathBuf {
    let timestamp = Local::now().format("%d%m%Y_%H_%M_%S");
    PathBuf::from(format!("{}_{}.json", sanitize_name(playlist_name), timestamp))
}

/// Create debug/<timestamp>/ for page-source artifacts.
pub fn create_debug_dir() -> Result<PathBuf> {
    let dir = PathBuf::from("debug").join(Local::now().format("%Y%m%d_%H%M%S").to_string());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create debug folder {}", dir.display()))?;
    Ok(dir)
}

/// Keep letters, digits, underscores and dashes; collapse whitespace to `_`.
fn sanitize_name(name: &str) -> String {
    let stripped = STRIP_RE.replace_all(name, "");
    let joined = WHITESPACE_RE.replace_all(&stripped, "_");
    let trimmed = joined.trim_matches('_');
    if trimmed.is_empty() {
        "playlist".to_string()
    } else {
        trimmed.to_string()
    }
}

// ── Tests ──
