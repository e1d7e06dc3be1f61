//! The two instantiations of the staging core.
//!
//! A [`Flavor`] fixes everything that differs between "images to PDF" and
//! "merge PDFs": the accepted media types, the payload representation, the
//! wire field and endpoint, the saved filename, and the user-facing text.

use serde::Serialize;
use std::fmt;

use crate::staging::{FileRef, InlineImage, MediaFilter, Payload};

/// Compile-time description of one staging instantiation.
pub trait Flavor: Send + Sync + 'static {
    /// Representation kept per staged entry.
    type Payload: Payload;

    /// Runtime tag of this flavor.
    const KIND: FlavorKind;
    /// Human name of the operation, used in logs and errors.
    const OPERATION: &'static str;
    /// Ingestion predicate.
    const ACCEPTS: MediaFilter;
    /// Repeated multipart field name.
    const FIELD: &'static str;
    /// Service endpoint path.
    const ENDPOINT: &'static str;
    /// Fixed filename of the saved artifact.
    const OUTPUT_FILENAME: &'static str;
    /// Trigger label while idle.
    const IDLE_LABEL: &'static str;
    /// Trigger label while a submission is in flight.
    const BUSY_LABEL: &'static str;
    /// Notice shown when the exchange fails.
    const FAILURE_NOTICE: &'static str;
    /// Notice shown when submitting with nothing staged.
    const EMPTY_NOTICE: &'static str;
}

/// Images converted into a single PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagesToPdf;

impl Flavor for ImagesToPdf {
    type Payload = InlineImage;

    const KIND: FlavorKind = FlavorKind::Convert;
    const OPERATION: &'static str = "PDF conversion";
    const ACCEPTS: MediaFilter = MediaFilter::Prefix("image/");
    const FIELD: &'static str = "images";
    const ENDPOINT: &'static str = "/convert-images";
    const OUTPUT_FILENAME: &'static str = "converted.pdf";
    const IDLE_LABEL: &'static str = "Convert to PDF";
    const BUSY_LABEL: &'static str = "Converting...";
    const FAILURE_NOTICE: &'static str = "PDF conversion failed.";
    const EMPTY_NOTICE: &'static str = "Please add images first.";
}

/// PDFs merged into one document.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergePdfs;

impl Flavor for MergePdfs {
    type Payload = FileRef;

    const KIND: FlavorKind = FlavorKind::Merge;
    const OPERATION: &'static str = "PDF merge";
    const ACCEPTS: MediaFilter = MediaFilter::Exact("application/pdf");
    const FIELD: &'static str = "pdfs";
    const ENDPOINT: &'static str = "/merge-pdfs";
    const OUTPUT_FILENAME: &'static str = "merged.pdf";
    const IDLE_LABEL: &'static str = "Merge PDFs";
    const BUSY_LABEL: &'static str = "Merging...";
    const FAILURE_NOTICE: &'static str = "PDF merge failed.";
    const EMPTY_NOTICE: &'static str = "Please add PDF files first.";
}

/// Runtime selector between the two flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlavorKind {
    /// PDF → PDF merge.
    Merge,
    /// Images → PDF conversion.
    Convert,
}

impl FlavorKind {
    /// Endpoint path of the selected flavor.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Merge => MergePdfs::ENDPOINT,
            Self::Convert => ImagesToPdf::ENDPOINT,
        }
    }

    /// Saved filename of the selected flavor.
    pub fn output_filename(&self) -> &'static str {
        match self {
            Self::Merge => MergePdfs::OUTPUT_FILENAME,
            Self::Convert => ImagesToPdf::OUTPUT_FILENAME,
        }
    }
}

impl fmt::Display for FlavorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merge => f.write_str(MergePdfs::OPERATION),
            Self::Convert => f.write_str(ImagesToPdf::OPERATION),
        }
    }
}
