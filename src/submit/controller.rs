//! Single-flight submission of the staged sequence.

use futures::future::try_join_all;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{Result, StageError};
use crate::flavor::Flavor;
use crate::staging::{Entry, Payload, SharedStaging};
use crate::submit::{BatchPart, BatchRequest, ConversionService, DownloadTrigger, ObjectUrls};
use crate::view::Notifier;

/// Observable state of the submit affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TriggerState {
    /// Button label.
    pub label: &'static str,
    /// Whether the button accepts clicks.
    pub enabled: bool,
}

impl TriggerState {
    /// Idle state for flavor `F`.
    pub fn idle<F: Flavor>() -> Self {
        Self {
            label: F::IDLE_LABEL,
            enabled: true,
        }
    }

    /// Busy state for flavor `F`.
    pub fn busy<F: Flavor>() -> Self {
        Self {
            label: F::BUSY_LABEL,
            enabled: false,
        }
    }
}

/// Why a submit did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another submission has not settled yet.
    AlreadyInFlight,
    /// Nothing is staged.
    Empty,
}

/// A saved artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Where the artifact was saved.
    pub path: PathBuf,
    /// Artifact size in bytes.
    pub bytes: usize,
    /// Number of parts that were submitted.
    pub parts: usize,
}

/// Result of one `submit` call.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// No exchange happened.
    Skipped(SkipReason),
    /// The artifact was received and saved.
    Delivered(Delivery),
    /// The exchange or the save failed; the user has been notified.
    Failed(StageError),
}

impl SubmitOutcome {
    /// Whether an artifact was saved.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

/// Sends the staged sequence to the service, one submission at a time.
pub struct SubmissionController<F: Flavor> {
    staging: SharedStaging<F::Payload>,
    service: Arc<dyn ConversionService>,
    download: Arc<dyn DownloadTrigger>,
    notifier: Arc<dyn Notifier>,
    object_urls: ObjectUrls,
    in_flight: AtomicBool,
    trigger: watch::Sender<TriggerState>,
    _flavor: PhantomData<fn() -> F>,
}

impl<F: Flavor> SubmissionController<F> {
    /// Create an idle controller for `staging`.
    pub fn new(
        staging: SharedStaging<F::Payload>,
        service: Arc<dyn ConversionService>,
        download: Arc<dyn DownloadTrigger>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (trigger, _) = watch::channel(TriggerState::idle::<F>());
        Self {
            staging,
            service,
            download,
            notifier,
            object_urls: ObjectUrls::new(),
            in_flight: AtomicBool::new(false),
            trigger,
            _flavor: PhantomData,
        }
    }

    /// Current state of the submit affordance.
    pub fn trigger_state(&self) -> TriggerState {
        *self.trigger.borrow()
    }

    /// Watch the submit affordance.
    pub fn subscribe_trigger(&self) -> watch::Receiver<TriggerState> {
        self.trigger.subscribe()
    }

    /// Whether a submission is outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Object handles created and not yet released.
    pub fn live_object_urls(&self) -> usize {
        self.object_urls.live()
    }

    /// Submit the current staged sequence.
    ///
    /// At most one submission is outstanding at a time; calls made while one
    /// is in flight return [`SkipReason::AlreadyInFlight`] without any side
    /// effect. Failures are reported through the notifier and never retried.
    /// The staged sequence is never modified. Whatever happens, the
    /// affordance is back to idle when this returns.
    pub async fn submit(&self) -> SubmitOutcome {
        if self.is_in_flight() {
            debug!(operation = F::OPERATION, "ignored submit while in flight");
            return SubmitOutcome::Skipped(SkipReason::AlreadyInFlight);
        }

        let snapshot = self.staging.snapshot();
        if snapshot.is_empty() {
            self.notifier.notify(F::EMPTY_NOTICE);
            return SubmitOutcome::Skipped(SkipReason::Empty);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(operation = F::OPERATION, "lost race for submission slot");
            return SubmitOutcome::Skipped(SkipReason::AlreadyInFlight);
        }
        let _guard = InFlightGuard::engage::<F>(&self.in_flight, &self.trigger);

        match self.exchange(&snapshot).await {
            Ok(delivery) => {
                info!(
                    operation = F::OPERATION,
                    path = %delivery.path.display(),
                    bytes = delivery.bytes,
                    "saved artifact"
                );
                SubmitOutcome::Delivered(delivery)
            }
            Err(err) => {
                warn!(operation = F::OPERATION, error = %err, "submission failed");
                self.notifier.notify(&failure_notice::<F>(&err));
                SubmitOutcome::Failed(err)
            }
        }
    }

    async fn exchange(&self, snapshot: &[Entry<F::Payload>]) -> Result<Delivery> {
        let request = build_request::<F>(snapshot).await?;
        let parts = request.parts.len();
        info!(operation = F::OPERATION, parts, files = ?request.file_names(), "submitting batch");

        let response = self.service.exchange(request).await?;
        if !response.is_success() {
            return Err(StageError::service_rejected(F::OPERATION, response.status));
        }

        let object = self.object_urls.create(&response.body).await?;
        debug!(href = ?object.href(), bytes = object.len(), "created object handle");
        let saved = self.download.trigger(&object, F::OUTPUT_FILENAME).await;
        drop(object);

        Ok(Delivery {
            path: saved?,
            bytes: response.body.len(),
            parts,
        })
    }
}

/// Build the ordered multipart batch for `entries`.
pub async fn build_request<F: Flavor>(entries: &[Entry<F::Payload>]) -> Result<BatchRequest> {
    let parts = try_join_all(entries.iter().map(|entry| async move {
        let payload = entry.payload();
        Ok::<_, StageError>(BatchPart {
            field: F::FIELD,
            file_name: entry.display_name().to_string(),
            media_type: payload.media_type().to_string(),
            bytes: payload.bytes().await?,
        })
    }))
    .await?;

    Ok(BatchRequest {
        endpoint: F::ENDPOINT,
        operation: F::OPERATION,
        parts,
    })
}

// Save failures carry their own message; everything else gets the flavor's notice.
fn failure_notice<F: Flavor>(err: &StageError) -> String {
    match err {
        StageError::OutputExists { .. } | StageError::FailedToWrite { .. } => err.to_string(),
        _ => F::FAILURE_NOTICE.to_string(),
    }
}

/// Holds the submission slot; releasing it restores the idle affordance.
struct InFlightGuard<'a> {
    in_flight: &'a AtomicBool,
    trigger: &'a watch::Sender<TriggerState>,
    idle: TriggerState,
}

impl<'a> InFlightGuard<'a> {
    fn engage<F: Flavor>(in_flight: &'a AtomicBool, trigger: &'a watch::Sender<TriggerState>) -> Self {
        trigger.send_replace(TriggerState::busy::<F>());
        Self {
            in_flight,
            trigger,
            idle: TriggerState::idle::<F>(),
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.trigger.send_replace(self.idle);
        self.in_flight.store(false, Ordering::Release);
    }
}
