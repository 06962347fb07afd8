use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("invalid file name")]
    InvalidName,

    #[error("file not found")]
    NotFound,

    #[error("storage i/o error")]
    Io(#[from] std::io::Error),
}

/// Poster image storage on the local filesystem.
///
/// Stored names are server-generated (`<uuid>.<ext>`), so uploads cannot
/// choose their own path. Reads accept only bare file names.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub async fn init(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Persist uploaded bytes under a fresh name, keeping the original
    /// extension when it is a plain alphanumeric one. Returns the stored
    /// file name.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, FileStoreError> {
        if !is_simple_name(original_name) {
            return Err(FileStoreError::InvalidName);
        }

        let stored = match extension_of(original_name) {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };
        tokio::fs::write(self.dir.join(&stored), bytes).await?;
        Ok(stored)
    }

    pub async fn open(&self, name: &str) -> Result<Vec<u8>, FileStoreError> {
        if !is_simple_name(name) {
            return Err(FileStoreError::InvalidName);
        }

        match tokio::fs::read(self.dir.join(name)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FileStoreError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}

/// A bare file name: no separators, no parent-directory hops.
fn is_simple_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && !name.contains("..")
}

fn extension_of(name: &str) -> Option<&str> {
    let (_, ext) = name.rsplit_once('.')?;
    if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext)
    } else {
        None
    }
}

/// Content type for downloads, from the stored extension.
pub fn content_type_for(name: &str) -> &'static str {
    match extension_of(name).map(str::to_ascii_lowercase).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> FileStore {
        let dir = std::env::temp_dir().join(format!("popcorn-files-{}", Uuid::new_v4()));
        FileStore::init(dir).await.unwrap()
    }

    #[tokio::test]
    async fn save_then_open_roundtrips_bytes() {
        let store = temp_store().await;

        let name = store.save("poster.png", b"fake-png").await.unwrap();
        assert!(name.ends_with(".png"));
        assert_ne!(name, "poster.png");

        let bytes = store.open(&name).await.unwrap();
        assert_eq!(bytes, b"fake-png");
    }

    #[tokio::test]
    async fn odd_extensions_are_dropped_from_the_stored_name() {
        let store = temp_store().await;

        let name = store.save("weird.p!g", b"x").await.unwrap();
        assert!(!name.contains('.'));
    }

    #[tokio::test]
    async fn path_like_names_are_rejected() {
        let store = temp_store().await;

        assert!(matches!(
            store.save("..evil.png", b"x").await,
            Err(FileStoreError::InvalidName)
        ));
        assert!(matches!(
            store.open("../secrets.txt").await,
            Err(FileStoreError::InvalidName)
        ));
        assert!(matches!(
            store.open("a/b.png").await,
            Err(FileStoreError::InvalidName)
        ));
    }

    #[tokio::test]
    async fn opening_an_unknown_name_is_not_found() {
        let store = temp_store().await;

        assert!(matches!(
            store.open("missing.png").await,
            Err(FileStoreError::NotFound)
        ));
    }

    #[test]
    fn content_types_fall_back_to_octet_stream() {
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
        assert_eq!(content_type_for("no-extension"), "application/octet-stream");
    }
}
