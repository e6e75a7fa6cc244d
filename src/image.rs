use anyhow::{Context, Result};
use axum::body::Bytes;
use chrono::Utc;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Image as it arrives with a create request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageInput {
    /// A multipart file upload
    Upload {
        file_name: Option<String>,
        bytes: Bytes,
    },
    /// An encoded image (base64 or data URI) sent as a plain field
    Inline(String),
    #[default]
    Absent,
}

/// Turns an incoming image into the value stored in an entry's `imagem` field
#[derive(Debug, Clone)]
pub struct ImageResolver {
    upload_dir: PathBuf,
    public_prefix: String,
}

impl ImageResolver {
    /// # Arguments
    /// * `upload_dir` - Directory uploaded files are written to
    /// * `public_prefix` - URL prefix the directory is served under, e.g. `/uploads`
    pub fn new(upload_dir: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Resolve an image into its stored reference
    ///
    /// Uploads are written to the upload directory, created on first use,
    /// and referenced by their public path. Inline payloads pass through
    /// unchanged; a missing image resolves to an empty string.
    ///
    /// # Errors
    /// Returns an error if the upload directory or file cannot be written
    pub async fn resolve(&self, image: ImageInput) -> Result<String> {
        match image {
            ImageInput::Upload { file_name, bytes } => {
                self.store_upload(file_name.as_deref(), &bytes).await
            }
            ImageInput::Inline(payload) => Ok(payload),
            ImageInput::Absent => Ok(String::new()),
        }
    }

    /// Remove a previously stored upload by its public reference
    ///
    /// References outside the public prefix (inline payloads, empty values)
    /// are ignored. A failed delete is logged, not returned.
    pub async fn discard(&self, reference: &str) {
        let Some(file_name) = reference
            .strip_prefix(self.public_prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return;
        };
        if file_name.is_empty() || file_name.contains('/') {
            return;
        }

        let path = self.upload_dir.join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::info!("Discarded upload {}", file_name),
            Err(e) => tracing::warn!("Failed to discard upload {}: {}", path.display(), e),
        }
    }

    async fn store_upload(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String> {
        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .with_context(|| {
                format!("Failed to create upload directory {}", self.upload_dir.display())
            })?;

        let file_name = stored_file_name(original_name);
        let path = self.upload_dir.join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write upload {}", path.display()))?;

        tracing::info!("Stored upload {} ({} bytes)", file_name, bytes.len());
        Ok(format!("{}/{}", self.public_prefix, file_name))
    }
}

/// Millisecond timestamp plus a random suffix, keeping the original extension
fn stored_file_name(original_name: Option<&str>) -> String {
    let token = Uuid::new_v4().simple().to_string();
    let stem = format!("{}-{}", Utc::now().timestamp_millis(), &token[..8]);

    match original_name.and_then(sanitized_extension) {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

fn sanitized_extension(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_creates_directory_and_file() {
        let temp = tempfile::tempdir().unwrap();
        let upload_dir = temp.path().join("nested").join("uploads");
        let resolver = ImageResolver::new(&upload_dir, "/uploads");

        let reference = resolver
            .resolve(ImageInput::Upload {
                file_name: Some("margherita.JPG".to_string()),
                bytes: Bytes::from_static(b"\xff\xd8\xff fake jpeg"),
            })
            .await
            .unwrap();

        assert!(reference.starts_with("/uploads/"));
        assert!(reference.ends_with(".jpg"));

        let stored_name = reference.trim_start_matches("/uploads/");
        let written = std::fs::read(upload_dir.join(stored_name)).unwrap();
        assert_eq!(written, b"\xff\xd8\xff fake jpeg");
    }

    #[tokio::test]
    async fn test_repeated_uploads_get_distinct_names() {
        let temp = tempfile::tempdir().unwrap();
        let resolver = ImageResolver::new(temp.path(), "/uploads/");

        let first = resolver
            .resolve(ImageInput::Upload {
                file_name: Some("a.png".to_string()),
                bytes: Bytes::from_static(b"one"),
            })
            .await
            .unwrap();
        let second = resolver
            .resolve(ImageInput::Upload {
                file_name: Some("a.png".to_string()),
                bytes: Bytes::from_static(b"two"),
            })
            .await
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_inline_passes_through() {
        let resolver = ImageResolver::new("unused", "/uploads");
        let payload = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUg==".to_string();

        let reference = resolver.resolve(ImageInput::Inline(payload.clone())).await.unwrap();
        assert_eq!(reference, payload);
    }

    #[tokio::test]
    async fn test_absent_resolves_to_empty() {
        let resolver = ImageResolver::new("unused", "/uploads");
        assert_eq!(resolver.resolve(ImageInput::Absent).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_unwritable_directory_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let blocker = temp.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let resolver = ImageResolver::new(blocker.join("uploads"), "/uploads");

        let result = resolver
            .resolve(ImageInput::Upload {
                file_name: Some("x.png".to_string()),
                bytes: Bytes::from_static(b"x"),
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_discard_removes_only_uploads() {
        let temp = tempfile::tempdir().unwrap();
        let resolver = ImageResolver::new(temp.path(), "/uploads");

        let reference = resolver
            .resolve(ImageInput::Upload {
                file_name: Some("x.png".to_string()),
                bytes: Bytes::from_static(b"x"),
            })
            .await
            .unwrap();
        std::fs::write(temp.path().join("keep.txt"), b"keep").unwrap();

        resolver.discard("data:image/png;base64,AAAA").await;
        resolver.discard("").await;
        resolver.discard(&reference).await;

        let left: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(left, ["keep.txt"]);
    }

    #[test]
    fn test_extension_sanitizing() {
        assert_eq!(sanitized_extension("foto.PNG"), Some("png".to_string()));
        assert_eq!(sanitized_extension("semextensao"), None);
        assert_eq!(sanitized_extension("x.p/ng"), None);
        assert_eq!(sanitized_extension("../../etc/passwd"), None);
        assert!(!stored_file_name(Some("../evil.sh")).contains('/'));
    }
}
