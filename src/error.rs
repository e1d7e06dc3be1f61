//! Error types for pdfstage.
//!
//! Every failure a staging session can hit is described by [`StageError`].
//! Most of them are recovered locally by the submission controller and only
//! surface as a user notice; the CLI turns the rest into an exit code.
//!
//! # Error Categories
//!
//! - **Ingestion errors**: file not found, unreadable, not a file
//! - **Submission errors**: empty batch, service rejection, transport failure
//! - **Output errors**: target exists, write failure
//! - **Configuration errors**: invalid arguments or input lists

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfstage operations.
pub type Result<T> = std::result::Result<T, StageError>;

/// Main error type for pdfstage operations.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Path exists but is not a regular file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Staged file could not be read.
    #[error("Failed to read file: {}\n  Reason: {source}", path.display())]
    FailedToReadFile {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Submission was attempted with nothing staged.
    #[error("No files staged for submission")]
    NothingStaged,

    /// The service answered with a non-success status.
    #[error("{operation} rejected by service (HTTP {status})")]
    ServiceRejected {
        /// Operation that was attempted (e.g. "PDF merge").
        operation: String,
        /// HTTP status returned by the service.
        status: u16,
    },

    /// The exchange could not complete.
    #[error("{operation} failed: {reason}")]
    Transport {
        /// Operation that was attempted.
        operation: String,
        /// Description of the transport failure.
        reason: String,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output directory",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to write the downloaded artifact.
    #[error("Failed to write output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to read input list file.
    #[error("Failed to read input list file: {}\n  Reason: {source}", path.display())]
    FailedToReadInputList {
        /// Path to the input list file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Input list file contains an invalid entry.
    #[error(
        "Invalid entry in input list file: {} at line {line_number}\n  Details: {details}",
        path.display()
    )]
    InvalidInputList {
        /// Path to the input list file.
        path: PathBuf,
        /// Line number with the error.
        line_number: usize,
        /// Details about what's invalid.
        details: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for StageError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<anyhow::Error> for StageError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl StageError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create a ServiceRejected error.
    pub fn service_rejected(operation: impl Into<String>, status: u16) -> Self {
        Self::ServiceRejected {
            operation: operation.into(),
            status,
        }
    }

    /// Create a Transport error.
    pub fn transport(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Whether the session stays usable after this error.
    ///
    /// Exchange failures leave the staged sequence untouched, so the user
    /// can submit again without re-adding files.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NothingStaged
                | Self::ServiceRejected { .. }
                | Self::Transport { .. }
                | Self::OutputExists { .. }
                | Self::FailedToWrite { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::FailedToReadFile { .. } => 2,
            Self::FailedToReadInputList { .. } => 2,
            Self::NothingStaged => 1,
            Self::ServiceRejected { .. } => 6,
            Self::Transport { .. } => 7,
            Self::OutputExists { .. } => 4,
            Self::FailedToWrite { .. } => 5,
            Self::InvalidInputList { .. } => 1,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
