//! One staging session: a staged sequence, its reorder gesture, and its
//! submission controller, wired together for a single flavor.

use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use crate::config::Edit;
use crate::flavor::Flavor;
use crate::gesture::ReorderGesture;
use crate::ingest::IngestSource;
use crate::staging::{Candidate, PendingAppend, SharedStaging};
use crate::submit::{ConversionService, DownloadTrigger, SubmissionController, SubmitOutcome};
use crate::view::{Notifier, RenderSink, RenderedList};

/// Staging session for flavor `F`.
pub struct Session<F: Flavor> {
    staging: SharedStaging<F::Payload>,
    gesture: Mutex<ReorderGesture>,
    controller: SubmissionController<F>,
}

impl<F: Flavor> Session<F> {
    /// Wire a new, empty session.
    pub fn new(
        service: Arc<dyn ConversionService>,
        download: Arc<dyn DownloadTrigger>,
        sink: Arc<dyn RenderSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let staging = SharedStaging::new(F::ACCEPTS, sink);
        let controller = SubmissionController::new(staging.clone(), service, download, notifier);
        Self {
            staging,
            gesture: Mutex::new(ReorderGesture::new()),
            controller,
        }
    }

    /// The staged sequence.
    pub fn staging(&self) -> &SharedStaging<F::Payload> {
        &self.staging
    }

    /// The submission controller.
    pub fn controller(&self) -> &SubmissionController<F> {
        &self.controller
    }

    /// Stage a batch from `source`. The publication slot is taken now and
    /// loading starts right away.
    pub fn ingest(&self, source: IngestSource, candidates: Vec<Candidate>) -> PendingAppend {
        debug!(%source, offered = candidates.len(), "ingesting batch");
        self.staging.append(candidates)
    }

    /// Apply one edit. Moves go through the drag gesture.
    ///
    /// Returns whether the sequence changed.
    pub fn apply_edit(&self, edit: Edit) -> bool {
        match edit {
            Edit::Move { from, to } => {
                let mut gesture = self.gesture.lock().unwrap_or_else(PoisonError::into_inner);
                gesture.drag_start(from);
                gesture.drag_over(to);
                gesture.drop_on(to, &self.staging)
            }
            Edit::Remove { index } => self.staging.remove_at(index),
        }
    }

    /// Current rendering of the staged sequence.
    pub fn rendered(&self) -> RenderedList {
        self.staging.rendered()
    }

    /// Submit the staged sequence.
    pub async fn submit(&self) -> SubmitOutcome {
        self.controller.submit().await
    }
}
