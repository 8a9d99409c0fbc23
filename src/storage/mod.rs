//! Upload-directory file storage for profile images, complaint evidence
//! and emergency media.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::config;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Empty upload")]
    EmptyUpload,
    #[error("Upload exceeds size limit of {0} bytes")]
    TooLarge(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Where a stored file lives relative to the upload dir, e.g.
/// `evidence/3f2a....jpg`. Serialized into media URLs, never absolute paths.
pub type RelativePath = String;

fn absolute(rel: &str) -> PathBuf {
    Path::new(&config::config().uploads.upload_dir).join(rel)
}

/// Public URL for a stored file, served by the `/media` route
pub fn media_url(rel: &str) -> String {
    format!("/media/{}", rel)
}

/// Keep only a safe extension from the client-supplied filename
fn safe_extension(original_name: &str) -> Option<String> {
    let ext = Path::new(original_name).extension()?.to_str()?;
    if !ext.is_empty()
        && ext.len() <= 8
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        Some(ext.to_ascii_lowercase())
    } else {
        None
    }
}

/// Write an uploaded file under `{upload_dir}/{subdir}/{uuid}[.ext]` and
/// return its relative path.
pub async fn save_upload(
    subdir: &str,
    original_name: &str,
    data: &[u8],
) -> Result<RelativePath, StorageError> {
    if data.is_empty() {
        return Err(StorageError::EmptyUpload);
    }

    let max = config::config().uploads.max_upload_size_bytes;
    if data.len() > max {
        return Err(StorageError::TooLarge(max));
    }

    let file_name = match safe_extension(original_name) {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    };
    let rel = format!("{}/{}", subdir, file_name);

    let abs = absolute(&rel);
    if let Some(parent) = abs.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&abs, data).await?;

    Ok(rel)
}

/// Remove a stored file. Missing files are not an error: the row is the
/// source of truth and the file may already be gone.
pub async fn delete_file(rel: &str) {
    let abs = absolute(rel);
    if let Err(e) = tokio::fs::remove_file(&abs).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("failed to remove stored file {}: {}", abs.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_url_prefixes_relative_path() {
        assert_eq!(media_url("evidence/a.jpg"), "/media/evidence/a.jpg");
    }

    #[test]
    fn extension_is_sanitized() {
        assert_eq!(safe_extension("photo.JPG"), Some("jpg".to_string()));
        assert_eq!(safe_extension("report.pdf"), Some("pdf".to_string()));
        assert_eq!(safe_extension("no_extension"), None);
        assert_eq!(safe_extension("weird.j/p..g"), Some("g".to_string()));
        assert_eq!(safe_extension("dotfile."), None);
    }
}
