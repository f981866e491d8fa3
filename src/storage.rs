use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Image types accepted for upload, with the extension used in their keys
pub const ALLOWED_CONTENT_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

/// Errors from storing or fetching uploaded files
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("File is larger than {limit} bytes")]
    TooLarge { limit: usize },
    #[error("File is empty")]
    Empty,
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
    #[error("No file stored under {0}")]
    NotFound(String),
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Strips parameters and case from a Content-Type value
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// The key extension for an accepted content type
pub fn extension_for(content_type: &str) -> Result<&'static str, StorageError> {
    let essence = essence(content_type);
    ALLOWED_CONTENT_TYPES
        .iter()
        .find(|(ct, _)| *ct == essence)
        .map(|(_, ext)| *ext)
        .ok_or(StorageError::UnsupportedType(essence))
}

/// The content type a stored key is served with
pub fn content_type_for_key(key: &str) -> Option<&'static str> {
    let (_, ext) = key.rsplit_once('.')?;
    ALLOWED_CONTENT_TYPES
        .iter()
        .find(|(_, e)| *e == ext)
        .map(|(ct, _)| *ct)
}

/// Checks that a key has the `<uuid>.<ext>` shape produced by [`LocalStorage::save`]
///
/// Anything else is rejected before it gets near the filesystem, which
/// rules out `..`, separators, and absolute paths.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = match key.split_once('.') {
        Some((stem, ext)) => {
            Uuid::parse_str(stem).is_ok()
                && stem.len() == 36
                && ALLOWED_CONTENT_TYPES.iter().any(|(_, e)| *e == ext)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Checks the file signature against the declared type
fn matches_signature(extension: &str, bytes: &[u8]) -> bool {
    match extension {
        "jpg" => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
        "png" => bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
        "gif" => bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a"),
        "webp" => bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP",
        _ => false,
    }
}

/// Stores uploaded images as files under a root directory
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    max_bytes: usize,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self { root: root.into(), max_bytes }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Creates the root directory if it is missing
    pub async fn init(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    /// Stores a file and returns its new key
    ///
    /// ### Errors
    ///
    /// Returns an error if the file is empty, larger than the limit, of an
    /// unsupported type, or its contents do not match the declared type.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn save(&self, content_type: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let extension = extension_for(content_type)?;
        if bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(StorageError::TooLarge { limit: self.max_bytes });
        }
        if !matches_signature(extension, bytes) {
            return Err(StorageError::UnsupportedType(format!(
                "contents are not {}",
                essence(content_type)
            )));
        }

        let key = format!("{}.{}", Uuid::new_v4(), extension);
        self.init().await?;
        tokio::fs::write(self.path_for(&key)?, bytes).await?;

        info!("Stored {} bytes as {}", bytes.len(), key);
        Ok(key)
    }

    /// Reads a stored file
    #[instrument(skip(self))]
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes a stored file; deleting a missing file is not an error
    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted {}", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} was already gone", key);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
