//! Cover image storage on local disk

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

use crate::error::{AppError, AppResult};

const MAX_NAME_ATTEMPTS: i64 = 16;

/// Uploaded cover as received from the client
#[derive(Debug, Clone)]
pub struct CoverUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Writes covers as `<unix millis>.<ext>` under one directory and returns
/// the file name as the reference stored on the book. The extension follows
/// the declared image type.
#[derive(Debug, Clone)]
pub struct CoverStorage {
    dir: PathBuf,
}

impl CoverStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Store an upload and return its reference
    pub async fn store(&self, upload: &CoverUpload) -> AppResult<String> {
        if upload.bytes.is_empty() {
            return Err(AppError::Validation("Cover image is empty".to_string()));
        }
        let extension = extension_for(upload.content_type.as_deref()).ok_or_else(|| {
            AppError::Validation(format!(
                "Cover must be a PNG, JPEG, GIF or WebP image, got {}",
                upload.content_type.as_deref().unwrap_or("no content type")
            ))
        })?;

        self.ensure_dir().await?;

        let stamp = Utc::now().timestamp_millis();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = format!("{}.{}", stamp + attempt, extension);
            let opened = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.dir.join(&name))
                .await;

            match opened {
                Ok(mut file) => {
                    file.write_all(&upload.bytes).await?;
                    file.flush().await?;
                    tracing::debug!(
                        "Stored cover {} from {:?} ({} bytes)",
                        name,
                        upload.file_name,
                        upload.bytes.len()
                    );
                    return Ok(name);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Internal("Could not allocate a cover file name".to_string()))
    }

    /// Best-effort removal of a stored cover
    pub async fn remove(&self, reference: &str) {
        if let Err(e) = tokio::fs::remove_file(self.dir.join(reference)).await {
            tracing::warn!("Failed to remove cover {}: {}", reference, e);
        }
    }
}

/// File extension for an accepted cover content type. The client's file name
/// never decides what the static file server will send back.
fn extension_for(content_type: Option<&str>) -> Option<&'static str> {
    let essence = content_type?.split(';').next()?.trim().to_ascii_lowercase();
    match essence.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, content_type: &str, bytes: &[u8]) -> CoverUpload {
        CoverUpload {
            file_name: Some(name.to_string()),
            content_type: Some(content_type.to_string()),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for(Some("image/png")), Some("png"));
        assert_eq!(extension_for(Some("IMAGE/JPEG")), Some("jpg"));
        assert_eq!(extension_for(Some("image/gif; charset=binary")), Some("gif"));
        assert_eq!(extension_for(Some("image/webp")), Some("webp"));
        assert_eq!(extension_for(Some("image/svg+xml")), None);
        assert_eq!(extension_for(Some("text/html")), None);
        assert_eq!(extension_for(None), None);
    }

    #[tokio::test]
    async fn test_store_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CoverStorage::new(dir.path().join("covers"));

        let reference = storage
            .store(&upload("capa.jpg", "image/jpeg", b"\xff\xd8\xff"))
            .await
            .unwrap();
        assert!(reference.ends_with(".jpg"));
        assert!(!reference.contains('/'));

        let path = storage.dir().join(&reference);
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"\xff\xd8\xff");

        storage.remove(&reference).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_names_do_not_clash() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CoverStorage::new(dir.path());

        let first = storage.store(&upload("a.png", "image/png", b"1")).await.unwrap();
        let second = storage.store(&upload("a.png", "image/png", b"2")).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(tokio::fs::read(dir.path().join(&first)).await.unwrap(), b"1");
    }

    #[tokio::test]
    async fn test_rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CoverStorage::new(dir.path());

        let err = storage
            .store(&upload("notes.txt", "text/plain", b"hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = storage.store(&upload("a.png", "image/png", b"")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = storage
            .store(&upload("logo.svg", "image/svg+xml", b"<svg/>"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_name_follows_content_type_not_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CoverStorage::new(dir.path());

        let reference = storage
            .store(&upload("evil.html", "image/png", b"<script>alert(1)</script>"))
            .await
            .unwrap();
        assert!(reference.ends_with(".png"));
        assert!(!reference.contains("html"));
    }

    #[tokio::test]
    async fn test_rejects_missing_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let storage = CoverStorage::new(dir.path());

        let cover = CoverUpload {
            file_name: Some("page.htm".to_string()),
            content_type: None,
            bytes: b"<p>hi</p>".to_vec(),
        };
        let err = storage.store(&cover).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
