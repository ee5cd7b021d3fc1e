//! Profile picture storage on the local filesystem.
//!
//! Files are written under a configured directory and served statically; the
//! database stores the relative path. Replacing or removing a picture also
//! unlinks the old file, tolerating one that has already disappeared.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;

use bakehouse_core::UserId;

/// Maximum accepted upload size (2 MiB).
pub const MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

/// Errors from avatar storage.
#[derive(Debug, Error)]
pub enum AvatarError {
    /// Upload exceeds the size limit.
    #[error("file too large (max {max} bytes)")]
    TooLarge {
        /// The enforced limit in bytes.
        max: usize,
    },

    /// Filesystem error.
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

/// Filesystem-backed store for profile pictures.
#[derive(Debug, Clone)]
pub struct AvatarStore {
    dir: PathBuf,
}

impl AvatarStore {
    /// Create a store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write an uploaded picture and return its stored path.
    ///
    /// The filename is derived from the user ID and upload instant, with the
    /// extension sanitized from the original filename, so a user's uploads
    /// never collide with anyone else's.
    ///
    /// # Errors
    ///
    /// Returns `AvatarError::TooLarge` if the payload exceeds
    /// [`MAX_AVATAR_BYTES`], or `AvatarError::Io` on filesystem failure.
    pub async fn save(
        &self,
        user_id: UserId,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, AvatarError> {
        if bytes.len() > MAX_AVATAR_BYTES {
            return Err(AvatarError::TooLarge {
                max: MAX_AVATAR_BYTES,
            });
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let ext = sanitized_extension(original_name);
        let filename = format!("{user_id}_{}{ext}", Utc::now().timestamp_millis());
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, bytes).await?;

        Ok(path.to_string_lossy().into_owned())
    }

    /// Delete a previously stored picture.
    ///
    /// A path outside the store directory is ignored, as is a file that no
    /// longer exists; the database record is the source of truth and stale
    /// entries should not block the caller.
    ///
    /// # Errors
    ///
    /// Returns `AvatarError::Io` on filesystem failure other than the file
    /// being absent.
    pub async fn remove(&self, stored_path: &str) -> Result<(), AvatarError> {
        let path = Path::new(stored_path);
        if !path.starts_with(&self.dir) {
            tracing::warn!(path = stored_path, "refusing to remove file outside avatar dir");
            return Ok(());
        }

        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AvatarError::Io(e)),
        }
    }
}

/// Lowercased extension of the original filename, dot included, restricted
/// to short alphanumeric suffixes. Anything else gets no extension.
fn sanitized_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_extension() {
        assert_eq!(sanitized_extension("me.PNG"), ".png");
        assert_eq!(sanitized_extension("photo.jpeg"), ".jpeg");
        assert_eq!(sanitized_extension("no-extension"), "");
        assert_eq!(sanitized_extension("weird.j/pg"), "");
        assert_eq!(sanitized_extension("dotfile."), "");
    }

    #[tokio::test]
    async fn test_save_rejects_oversized_payload() {
        let store = AvatarStore::new(std::env::temp_dir().join("bakehouse-avatar-test"));
        let oversized = vec![0u8; MAX_AVATAR_BYTES + 1];
        let err = store
            .save(UserId::new(1), "big.png", &oversized)
            .await
            .unwrap_err();
        assert!(matches!(err, AvatarError::TooLarge { .. }));
    }

    #[tokio::test]
    async fn test_save_and_remove_roundtrip() {
        let dir = std::env::temp_dir().join(format!(
            "bakehouse-avatar-test-{}",
            Utc::now().timestamp_nanos_opt().unwrap()
        ));
        let store = AvatarStore::new(&dir);

        let path = store
            .save(UserId::new(7), "me.png", b"not really a png")
            .await
            .unwrap();
        assert!(Path::new(&path).exists());

        store.remove(&path).await.unwrap();
        assert!(!Path::new(&path).exists());

        // Removing again is fine
        store.remove(&path).await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_ignores_path_outside_dir() {
        let store = AvatarStore::new("uploads/profile-pics");
        store.remove("/etc/hostname").await.unwrap();
    }
}
