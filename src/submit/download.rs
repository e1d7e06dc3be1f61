//! Transient object handles and the save-as step.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::OverwriteMode;
use crate::error::{Result, StageError};

/// Issues [`ObjectUrl`]s and counts how many are still alive.
#[derive(Debug, Clone, Default)]
pub struct ObjectUrls {
    live: Arc<AtomicUsize>,
}

impl ObjectUrls {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize `body` as a transient handle.
    pub async fn create(&self, body: &[u8]) -> Result<ObjectUrl> {
        let file = tempfile::Builder::new()
            .prefix("pdfstage-")
            .suffix(".pdf")
            .tempfile()?;
        tokio::fs::write(file.path(), body)
            .await
            .map_err(|source| StageError::FailedToWrite {
                path: file.path().to_path_buf(),
                source,
            })?;

        self.live.fetch_add(1, Ordering::AcqRel);
        debug!(path = %file.path().display(), len = body.len(), "object URL created");
        Ok(ObjectUrl {
            file,
            len: body.len(),
            live: Arc::clone(&self.live),
        })
    }

    /// Number of handles not yet released.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }
}

/// Temporary on-disk copy of a response body.
///
/// Dropping the handle deletes the file and releases its slot.
#[derive(Debug)]
pub struct ObjectUrl {
    file: NamedTempFile,
    len: usize,
    live: Arc<AtomicUsize>,
}

impl ObjectUrl {
    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// `file://` form of the handle.
    pub fn href(&self) -> Option<url::Url> {
        url::Url::from_file_path(self.file.path()).ok()
    }

    /// Size of the body in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the body is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Starts a save-as of an object handle under a fixed filename.
#[async_trait]
pub trait DownloadTrigger: Send + Sync {
    /// Save `object` as `file_name` and return where it went.
    async fn trigger(&self, object: &ObjectUrl, file_name: &str) -> Result<PathBuf>;
}

/// Saves artifacts into a directory.
#[derive(Debug, Clone)]
pub struct SaveToDirectory {
    dir: PathBuf,
    overwrite: OverwriteMode,
}

impl SaveToDirectory {
    /// Save into `dir`.
    ///
    /// An existing file is only replaced with [`OverwriteMode::Force`];
    /// prompting has to happen before the exchange.
    pub fn new(dir: impl Into<PathBuf>, overwrite: OverwriteMode) -> Self {
        Self {
            dir: dir.into(),
            overwrite,
        }
    }
}

#[async_trait]
impl DownloadTrigger for SaveToDirectory {
    async fn trigger(&self, object: &ObjectUrl, file_name: &str) -> Result<PathBuf> {
        let target = self.dir.join(file_name);
        let write_error = |source| StageError::FailedToWrite {
            path: target.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(write_error)?;

        let exists = tokio::fs::try_exists(&target).await.map_err(write_error)?;
        if exists && self.overwrite != OverwriteMode::Force {
            return Err(StageError::output_exists(target.clone()));
        }

        tokio::fs::copy(object.path(), &target).await.map_err(write_error)?;
        Ok(target)
    }
}
