//! Candidate files and the media-type predicate used at ingestion.

use std::path::{Path, PathBuf};

/// A file offered for staging by a picker selection or a drop gesture.
///
/// `media_type` is the *declared* type (what the picker or the file
/// extension claims), never sniffed from content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// User-facing name, normally the original filename.
    pub name: String,
    /// Declared media type, empty when unknown.
    pub media_type: String,
    /// Location of the bytes.
    pub path: PathBuf,
}

impl Candidate {
    /// Create a candidate with an explicit declared media type.
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            path: path.into(),
        }
    }

    /// Create a candidate from a path, declaring its type from the extension.
    ///
    /// Unknown extensions declare an empty type, which no filter accepts.
    ///
    /// ```
    /// use pdfstage::staging::Candidate;
    ///
    /// let candidate = Candidate::from_path("scans/page-1.png");
    /// assert_eq!(candidate.name, "page-1.png");
    /// assert_eq!(candidate.media_type, "image/png");
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = mime_guess::from_path(path).first_raw().unwrap_or_default();

        Self::new(name, media_type, path)
    }
}

/// Accepted media-type predicate of a staging flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFilter {
    /// Declared type must equal this string exactly.
    Exact(&'static str),
    /// Declared type must start with this family prefix (e.g. `image/`).
    Prefix(&'static str),
}

impl MediaFilter {
    /// Check a declared media type against the filter.
    pub fn accepts(&self, media_type: &str) -> bool {
        match self {
            Self::Exact(expected) => media_type == *expected,
            Self::Prefix(family) => media_type.starts_with(family),
        }
    }

    /// Split candidates into accepted ones (original relative order kept)
    /// and the number dropped.
    pub fn partition(&self, candidates: Vec<Candidate>) -> (Vec<Candidate>, usize) {
        let total = candidates.len();
        let accepted: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| self.accepts(&candidate.media_type))
            .collect();
        let dropped = total - accepted.len();
        (accepted, dropped)
    }
}
