//! Turning command-line inputs into staging candidates.
//!
//! Every ingestion surface (file picker, a drop on the page, a drop on the
//! staged panel) ends up as one batch of [`Candidate`]s handed to
//! `append`. On the command line the positional inputs form one batch and
//! the input-list file a second.

use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::{Result, StageError};
use crate::staging::Candidate;

/// Where a batch of candidates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestSource {
    /// Explicit file selection.
    Picker,
    /// Drop anywhere on the page.
    PageDrop,
    /// Drop onto the staged panel.
    PanelDrop,
}

impl fmt::Display for IngestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Picker => f.write_str("picker"),
            Self::PageDrop => f.write_str("page drop"),
            Self::PanelDrop => f.write_str("panel drop"),
        }
    }
}

/// Expand paths and glob patterns in argument order.
///
/// Arguments without glob metacharacters are passed through untouched, so a
/// missing file surfaces later as [`StageError::FileNotFound`] rather than
/// silently vanishing. Matches of one pattern come back sorted, as `glob`
/// yields them.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        if glob::Pattern::escape(pattern) == pattern {
            resolved.push(PathBuf::from(pattern));
            continue;
        }

        let paths = glob::glob(pattern)
            .map_err(|err| StageError::invalid_config(format!("Invalid glob pattern {pattern}: {err}")))?;
        let before = resolved.len();
        for entry in paths {
            let path = entry.map_err(|err| StageError::other(err.to_string()))?;
            if path.is_file() {
                resolved.push(path);
            }
        }

        if resolved.len() == before {
            return Err(StageError::invalid_config(format!("No files match pattern: {pattern}")));
        }
    }

    Ok(resolved)
}

/// Read input paths from a list file.
///
/// One path per line; lines starting with `#` and blank lines are skipped.
/// Relative paths are resolved against the list file's directory.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line is not a usable
/// path.
pub async fn read_input_list(path: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(path)
        .await
        .map_err(|source| StageError::FailedToReadInputList {
            path: path.to_path_buf(),
            source,
        })?;

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let mut lines = BufReader::new(file).lines();
    let mut paths = Vec::new();
    let mut line_number = 0;

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|source| StageError::FailedToReadInputList {
            path: path.to_path_buf(),
            source,
        })?
    {
        line_number += 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.contains('\0') {
            return Err(StageError::InvalidInputList {
                path: path.to_path_buf(),
                line_number,
                details: "path contains a NUL byte".to_string(),
            });
        }

        let entry = PathBuf::from(line);
        paths.push(if entry.is_absolute() { entry } else { base.join(entry) });
    }

    Ok(paths)
}

/// Build candidates for `paths`, declaring each media type from its extension.
pub fn candidates_from_paths<P: AsRef<Path>>(paths: &[P]) -> Vec<Candidate> {
    paths.iter().map(Candidate::from_path).collect()
}
