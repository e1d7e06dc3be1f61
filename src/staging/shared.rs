//! Shareable, race-free handle to a staged sequence.

use futures::future::try_join_all;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{Result, StageError};
use crate::staging::sequencer::Sequencer;
use crate::staging::{Candidate, Entry, MediaFilter, Payload, StagingList};
use crate::view::{RenderSink, RenderedList, ViewMode};

/// Outcome of one append batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppendReport {
    /// Entries published to the sequence.
    pub appended: usize,
    /// Candidates silently dropped by the media filter.
    pub dropped: usize,
}

/// An append batch running on the runtime.
///
/// Resolves to the batch's report once it has been published (or has
/// failed). Dropping the handle aborts the batch and releases its slot.
#[must_use = "dropping a pending append cancels the batch"]
#[derive(Debug)]
pub struct PendingAppend {
    task: JoinHandle<Result<AppendReport>>,
}

impl Future for PendingAppend {
    type Output = Result<AppendReport>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.task).poll(cx).map(|joined| {
            joined.unwrap_or_else(|err| Err(StageError::other(format!("append batch did not finish: {err}"))))
        })
    }
}

impl Drop for PendingAppend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Cloneable handle to one staged sequence.
///
/// The list sits behind a `std` mutex that is never held across an await,
/// so removals and moves are synchronous. Appends load their batch
/// concurrently and then publish it in one locked extend, in call order.
pub struct SharedStaging<P> {
    inner: Arc<Inner<P>>,
}

struct Inner<P> {
    list: Mutex<StagingList<P>>,
    filter: MediaFilter,
    sequencer: Arc<Sequencer>,
    sink: Arc<dyn RenderSink>,
}

impl<P> Clone for SharedStaging<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: Payload> SharedStaging<P> {
    /// Create an empty sequence accepting candidates matched by `filter`.
    pub fn new(filter: MediaFilter, sink: Arc<dyn RenderSink>) -> Self {
        Self {
            inner: Arc::new(Inner {
                list: Mutex::new(StagingList::new()),
                filter,
                sequencer: Sequencer::new(),
                sink,
            }),
        }
    }

    /// Stage a batch of candidates.
    ///
    /// Filtering and the publication slot are decided right here, when the
    /// call is made. Loading starts on the runtime immediately, whether or
    /// not the returned handle is polled. The batch is published all at
    /// once after every accepted candidate has loaded, and never before
    /// batches from earlier calls. If any candidate fails to load, nothing
    /// from the batch is published. Dropping the handle cancels the batch.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn append(&self, candidates: Vec<Candidate>) -> PendingAppend {
        let (accepted, dropped) = self.inner.filter.partition(candidates);
        if dropped > 0 {
            debug!(dropped, filter = ?self.inner.filter, "dropped candidates with unaccepted media type");
        }

        let ticket = (!accepted.is_empty()).then(|| self.inner.sequencer.issue());
        let staging = self.clone();

        let task = tokio::spawn(async move {
            let Some(ticket) = ticket else {
                return Ok(AppendReport {
                    appended: 0,
                    dropped,
                });
            };

            let batch = try_join_all(accepted.iter().map(|candidate| async move {
                let payload = P::load(candidate).await?;
                Ok::<_, StageError>(Entry::new(candidate.name.clone(), payload))
            }))
            .await?;

            ticket.wait_turn().await;
            let appended = staging.mutate(|list| list.extend_batch(batch));
            drop(ticket);

            debug!(appended, dropped, "published append batch");
            Ok(AppendReport { appended, dropped })
        });

        PendingAppend { task }
    }

    /// Remove the entry at `index`.
    ///
    /// Returns `false` when the index is no longer valid; the sequence is
    /// left untouched in that case.
    pub fn remove_at(&self, index: usize) -> bool {
        let removed = self.mutate_if(|list| list.remove_at(index).is_some());
        if !removed {
            debug!(index, "ignored removal of stale index");
        }
        removed
    }

    /// Move the entry at `source` to `target` (splice out, then splice in).
    pub fn move_to(&self, source: usize, target: usize) -> bool {
        self.mutate_if(|list| list.move_to(source, target))
    }

    /// Read-only copy of the current order.
    pub fn snapshot(&self) -> Vec<Entry<P>> {
        self.lock().snapshot()
    }

    /// Number of staged entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Derived view mode.
    pub fn view_mode(&self) -> ViewMode {
        self.lock().view_mode()
    }

    /// Render the current state without mutating it.
    pub fn rendered(&self) -> RenderedList {
        RenderedList::from_entries(self.lock().entries(), self.inner.sink.wants_previews())
    }

    fn lock(&self) -> MutexGuard<'_, StagingList<P>> {
        self.inner
            .list
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<R>(&self, op: impl FnOnce(&mut StagingList<P>) -> R) -> R {
        let mut list = self.lock();
        let before = list.view_mode();
        let result = op(&mut list);
        self.publish(&list, before);
        result
    }

    fn mutate_if(&self, op: impl FnOnce(&mut StagingList<P>) -> bool) -> bool {
        let mut list = self.lock();
        let before = list.view_mode();
        let changed = op(&mut list);
        if changed {
            self.publish(&list, before);
        }
        changed
    }

    fn publish(&self, list: &StagingList<P>, before: ViewMode) {
        let after = list.view_mode();
        self.inner
            .sink
            .render(&RenderedList::from_entries(list.entries(), self.inner.sink.wants_previews()));
        if before != after {
            self.inner.sink.view_mode_changed(after);
        }
    }
}
