//! The ordered file-staging list.
//!
//! This module owns the staged sequence and its mutation primitives:
//!
//! - [`Candidate`] / [`MediaFilter`]: what is offered and what is accepted
//! - [`Entry`] / [`Payload`]: what is kept per staged file
//! - [`StagingList`]: the plain ordered sequence
//! - [`SharedStaging`]: the shareable handle with atomic, call-ordered appends
//!
//! # Examples
//!
//! ```no_run
//! use pdfstage::staging::{Candidate, FileRef, MediaFilter, SharedStaging};
//! use pdfstage::view::Detached;
//! use std::sync::Arc;
//!
//! # async fn example() -> pdfstage::Result<()> {
//! let staging: SharedStaging<FileRef> =
//!     SharedStaging::new(MediaFilter::Exact("application/pdf"), Arc::new(Detached));
//!
//! staging
//!     .append(vec![Candidate::from_path("a.pdf"), Candidate::from_path("b.pdf")])
//!     .await?;
//! staging.move_to(1, 0);
//! assert_eq!(staging.snapshot()[0].display_name(), "b.pdf");
//! # Ok(())
//! # }
//! ```

mod entry;
mod list;
mod media;
mod sequencer;
mod shared;

pub use entry::{Entry, FileRef, InlineImage, Payload};
pub use list::StagingList;
pub use media::{Candidate, MediaFilter};
pub use shared::{AppendReport, PendingAppend, SharedStaging};
