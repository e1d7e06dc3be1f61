//! Submission of a staged sequence.
//!
//! - [`SubmissionController`]: single-flight submit with idle restoration
//! - [`ConversionService`]: the service boundary, over HTTP or in-process
//! - [`DownloadTrigger`]: the save-as step for the returned artifact

mod controller;
mod download;
mod local;
mod service;

pub use controller::{
    Delivery, SkipReason, SubmissionController, SubmitOutcome, TriggerState, build_request,
};
pub use download::{DownloadTrigger, ObjectUrl, ObjectUrls, SaveToDirectory};
pub use local::LocalMergeService;
pub use service::{BatchPart, BatchRequest, ConversionService, HttpService, ServiceResponse};
