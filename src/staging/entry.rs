//! Staged entries and their payload representations.
//!
//! An [`Entry`] is addressed purely by its position in the staged sequence;
//! two entries with the same name and content are distinguishable only by
//! index.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use bytes::Bytes;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, StageError};
use crate::staging::Candidate;

/// Byte representation held by a staged entry.
///
/// Each flavor picks exactly one representation and keeps it for the
/// entry's lifetime.
#[async_trait]
pub trait Payload: Clone + fmt::Debug + Send + Sync + 'static {
    /// Load the representation for an accepted candidate.
    ///
    /// This is the asynchronous decode step of an append batch.
    async fn load(candidate: &Candidate) -> Result<Self>;

    /// Declared media type, sent as the part content type.
    fn media_type(&self) -> &str;

    /// Raw bytes to submit.
    async fn bytes(&self) -> Result<Bytes>;

    /// Inline preview for the render surface, if this representation has one.
    fn preview(&self) -> Option<String> {
        None
    }
}

/// One staged item.
#[derive(Debug, Clone)]
pub struct Entry<P> {
    display_name: String,
    payload: P,
}

impl<P> Entry<P> {
    /// Create an entry.
    pub fn new(display_name: impl Into<String>, payload: P) -> Self {
        Self {
            display_name: display_name.into(),
            payload,
        }
    }

    /// User-facing label.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Byte representation.
    pub fn payload(&self) -> &P {
        &self.payload
    }
}

/// Reference to the original file; bytes are read at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    path: PathBuf,
    media_type: String,
}

impl FileRef {
    /// Path of the referenced file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Payload for FileRef {
    async fn load(candidate: &Candidate) -> Result<Self> {
        check_path_is_file(&candidate.path).await?;
        Ok(Self {
            path: candidate.path.clone(),
            media_type: candidate.media_type.clone(),
        })
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    async fn bytes(&self) -> Result<Bytes> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|source| StageError::FailedToReadFile {
                path: self.path.clone(),
                source,
            })?;
        Ok(Bytes::from(data))
    }
}

/// Decoded in-memory copy of an image, renderable as a `data:` URL.
#[derive(Clone, PartialEq, Eq)]
pub struct InlineImage {
    data: Bytes,
    media_type: String,
}

impl InlineImage {
    /// Wrap already-decoded bytes.
    pub fn new(data: impl Into<Bytes>, media_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            media_type: media_type.into(),
        }
    }

    /// Size of the decoded bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the decoded image is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Base64 `data:` URL of the image.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.data))
    }
}

// Keep multi-megabyte images out of debug output.
impl fmt::Debug for InlineImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineImage")
            .field("media_type", &self.media_type)
            .field("len", &self.data.len())
            .finish()
    }
}

#[async_trait]
impl Payload for InlineImage {
    async fn load(candidate: &Candidate) -> Result<Self> {
        check_path_is_file(&candidate.path).await?;
        let data = tokio::fs::read(&candidate.path)
            .await
            .map_err(|source| StageError::FailedToReadFile {
                path: candidate.path.clone(),
                source,
            })?;
        Ok(Self::new(data, candidate.media_type.clone()))
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    async fn bytes(&self) -> Result<Bytes> {
        Ok(self.data.clone())
    }

    fn preview(&self) -> Option<String> {
        Some(self.data_url())
    }
}

async fn check_path_is_file(path: &Path) -> Result<()> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(StageError::file_not_found(path.to_path_buf()));
        }
        Err(source) => {
            return Err(StageError::FailedToReadFile {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if !metadata.is_file() {
        return Err(StageError::not_a_file(path.to_path_buf()));
    }

    Ok(())
}
