//! Response-promise table for offer replies.
//!
//! Correlates out-of-band `FileOfferResponse` frames back to the offer
//! workers waiting on them. Each slot is a single-shot channel keyed by the
//! recipient's client id; at most one slot is armed per client at a time.
//! Arming over an existing slot overwrites it: the abandoned waiter
//! observes a closed channel and gives up, which is the accepted race when
//! overlapping offers target the same recipient.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use tokio::sync::oneshot;

use crate::registry::ClientId;

/// Resolution of an armed offer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    /// The recipient answered `"y"`.
    Accepted,
    /// The recipient answered anything else.
    Declined,
    /// The recipient's connection closed before it answered.
    Disconnected,
}

/// Table of single-shot reply slots, self-synchronized.
#[derive(Debug, Default)]
pub struct ResponseTable {
    slots: Mutex<HashMap<ClientId, oneshot::Sender<OfferOutcome>>>,
}

impl ResponseTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ClientId, oneshot::Sender<OfferOutcome>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arm a fresh slot for `client` and return the waiting side.
    ///
    /// Any previously armed slot for the same client is dropped, which
    /// closes its waiter's channel.
    pub fn arm(&self, client: ClientId) -> oneshot::Receiver<OfferOutcome> {
        let (tx, rx) = oneshot::channel();
        self.lock().insert(client, tx);
        rx
    }

    /// Fulfil the armed slot for `client`, if any.
    ///
    /// Returns `true` if a waiter received the outcome. An unarmed client
    /// or an already-gone waiter yields `false`; the caller drops the
    /// message silently either way.
    pub fn fulfil(&self, client: ClientId, outcome: OfferOutcome) -> bool {
        match self.lock().remove(&client) {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    /// Remove the slot for `client` without fulfilling it.
    ///
    /// Used when the offer to that client failed to send or timed out.
    pub fn disarm(&self, client: ClientId) {
        self.lock().remove(&client);
    }

    /// Number of currently armed slots.
    #[must_use]
    pub fn armed_count(&self) -> usize {
        self.lock().len()
    }
}
