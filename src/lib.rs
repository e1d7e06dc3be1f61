//! pdfstage - an ordered file-staging list that turns its contents into one PDF.
//!
//! Files are offered in batches, filtered by media type, and appended to an
//! ordered list; the list can be reordered by dragging or trimmed by
//! deleting entries; a single-flight submit sends the list as one multipart
//! batch and saves the returned PDF.
//!
//! Two flavors share the same core:
//!
//! - [`flavor::ImagesToPdf`]: images in, `converted.pdf` out
//! - [`flavor::MergePdfs`]: PDFs in, `merged.pdf` out
//!
//! # Examples
//!
//! ```no_run
//! use pdfstage::config::OverwriteMode;
//! use pdfstage::flavor::MergePdfs;
//! use pdfstage::ingest::{IngestSource, candidates_from_paths};
//! use pdfstage::session::Session;
//! use pdfstage::submit::{LocalMergeService, SaveToDirectory};
//! use pdfstage::view::Detached;
//! use std::sync::Arc;
//!
//! # async fn example() -> pdfstage::Result<()> {
//! let session = Session::<MergePdfs>::new(
//!     Arc::new(LocalMergeService::new()),
//!     Arc::new(SaveToDirectory::new("out", OverwriteMode::Force)),
//!     Arc::new(Detached),
//!     Arc::new(Detached),
//! );
//!
//! session
//!     .ingest(IngestSource::Picker, candidates_from_paths(&["cover.pdf", "body.pdf"]))
//!     .await?;
//! session.staging().move_to(1, 0);
//! let outcome = session.submit().await;
//! assert!(outcome.is_delivered());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
mod error;
pub mod flavor;
pub mod gesture;
pub mod ingest;
pub mod output;
pub mod session;
pub mod staging;
pub mod submit;
pub mod view;

pub use error::{Result, StageError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
