//! Call-order publication of append batches.
//!
//! Each `append` call takes a [`Ticket`] synchronously, before any await
//! point. A ticket may publish only once every earlier ticket has either
//! published or been released, so batches land in the order the calls
//! were made regardless of how long each batch takes to load.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

#[derive(Debug)]
pub(crate) struct Sequencer {
    issued: AtomicU64,
    state: Mutex<SequencerState>,
    turn: watch::Sender<u64>,
}

#[derive(Debug, Default)]
struct SequencerState {
    next: u64,
    finished: BTreeSet<u64>,
}

impl Sequencer {
    pub(crate) fn new() -> Arc<Self> {
        let (turn, _) = watch::channel(0);
        Arc::new(Self {
            issued: AtomicU64::new(0),
            state: Mutex::new(SequencerState::default()),
            turn,
        })
    }

    pub(crate) fn issue(self: &Arc<Self>) -> Ticket {
        Ticket {
            number: self.issued.fetch_add(1, Ordering::SeqCst),
            sequencer: Arc::clone(self),
        }
    }

    fn finish(&self, number: u64) {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let state = &mut *guard;
        state.finished.insert(number);
        while state.finished.remove(&state.next) {
            state.next += 1;
        }
        self.turn.send_replace(state.next);
    }
}

/// Position in the publication queue. Dropping the ticket releases the slot.
#[derive(Debug)]
pub(crate) struct Ticket {
    number: u64,
    sequencer: Arc<Sequencer>,
}

impl Ticket {
    #[cfg(test)]
    pub(crate) fn number(&self) -> u64 {
        self.number
    }

    /// Wait until every earlier ticket has been released.
    pub(crate) async fn wait_turn(&self) {
        let mut turn = self.sequencer.turn.subscribe();
        // The sender lives as long as this ticket's Arc, so this cannot fail.
        let _ = turn.wait_for(|next| *next == self.number).await.map(|_| ());
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        self.sequencer.finish(self.number);
    }
}
