//! Upload validation and saving.
//!
//! Uploads are validated by file extension, sanitized, and written under a
//! timestamped name. Files are never deleted once written; the only size
//! limit is the global request-body cap applied at the router.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::error::Result;

/// Image extensions accepted for upload.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Whether the filename's final extension is in the allow-list
/// (case-insensitive). Filenames without an extension are rejected.
pub fn has_allowed_extension(filename: &str, allowed: &[&str]) -> bool {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            allowed.iter().any(|allowed| *allowed == ext)
        }
        _ => false,
    }
}

/// Sanitize a client-supplied filename for safe storage.
///
/// Strips any path components, replaces characters outside
/// `[A-Za-z0-9._-]` with underscores, and trims leading dots so the result
/// can neither traverse directories nor hide as a dotfile. An empty result
/// falls back to `"upload"`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Save upload bytes under a unique timestamped name and return the path.
///
/// The saved name is `{stem}_{YYYYMMDD_HHMMSS}{.ext}`; if that path already
/// exists (two uploads of the same name within one second) a numeric suffix
/// is appended until the name is free, so repeated saves of the same
/// original filename always produce distinct paths.
pub async fn save_upload(dir: &Path, original_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let safe = sanitize_filename(original_name);
    let (stem, ext) = match safe.rsplit_once('.') {
        Some((stem, ext)) => (stem.to_string(), Some(ext.to_string())),
        None => (safe, None),
    };

    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let mut candidate = dir.join(join_name(&stem, &timestamp, None, ext.as_deref()));
    let mut counter = 1u32;
    while tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
        candidate = dir.join(join_name(&stem, &timestamp, Some(counter), ext.as_deref()));
        counter += 1;
    }

    tokio::fs::write(&candidate, bytes).await?;
    info!(path = %candidate.display(), size = bytes.len(), "Saved uploaded file");
    Ok(candidate)
}

fn join_name(stem: &str, timestamp: &str, counter: Option<u32>, ext: Option<&str>) -> String {
    let mut name = match counter {
        Some(n) => format!("{stem}_{timestamp}_{n}"),
        None => format!("{stem}_{timestamp}"),
    };
    if let Some(ext) = ext {
        name.push('.');
        name.push_str(ext);
    }
    name
}
