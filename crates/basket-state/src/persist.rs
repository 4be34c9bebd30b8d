//! # Write-Through Queue
//!
//! Serializes a store's durable writes through a single slot that holds
//! at most the latest pending snapshot. Two rapidly-issued mutations can
//! therefore never land out of order: a superseded snapshot is simply
//! dropped, never written after a newer one.
//!
//! ```text
//! mutation ──► submit(snapshot #n) ──► slot (replaces #n-1 if unwritten)
//!                                        │
//!                                        ▼
//!                                 writer task: always persists the
//!                                 newest snapshot, acks its sequence
//! ```
//!
//! `flush()` waits until the writer has attempted every snapshot
//! submitted so far; tests and orderly shutdown use it for determinism.
//!
//! ## Invariants
//! - A snapshot's sequence number equals its publication order: both
//!   are assigned inside one `send_modify` on the slot.
//! - Callers that snapshot guarded state must `submit` before
//!   releasing the guard, so snapshot order equals publication order
//!   and the newest published snapshot is the newest state.

use std::sync::Arc;

use basket_storage::KeyValueStore;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Single-slot latest-wins persistence queue for one storage key.
pub struct WriteThrough {
    slot: watch::Sender<(u64, Option<String>)>,
    acked: watch::Receiver<u64>,
    key: &'static str,
}

impl WriteThrough {
    /// Spawns the writer task for `key` on `kv` and returns the handle.
    /// The task exits when the handle is dropped.
    pub fn spawn(kv: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        let (slot, mut slot_rx) = watch::channel((0u64, None::<String>));
        let (ack_tx, acked) = watch::channel(0u64);

        tokio::spawn(async move {
            while slot_rx.changed().await.is_ok() {
                let (seq, snapshot) = slot_rx.borrow_and_update().clone();
                if let Some(snapshot) = snapshot {
                    match kv.set_item(key, &snapshot).await {
                        Ok(()) => debug!(key, seq, "write-through persisted snapshot"),
                        Err(e) => warn!(key, seq, error = %e, "write-through persist failed"),
                    }
                }
                // Ack even on failure: flush() means "the writer got this
                // far", not "storage is healthy".
                let _ = ack_tx.send(seq);
            }
            debug!(key, "write-through task stopped");
        });

        WriteThrough { slot, acked, key }
    }

    /// Publishes a serialized snapshot for persistence, replacing any
    /// unwritten predecessor. Synchronous and non-blocking.
    ///
    /// The sequence number lives inside the slot itself and is bumped
    /// in the same `send_modify` that publishes the snapshot, so a
    /// snapshot's sequence always matches its publication order.
    pub fn submit(&self, snapshot: String) {
        self.slot.send_modify(|(seq, pending)| {
            *seq += 1;
            *pending = Some(snapshot);
        });
    }

    /// Waits until the writer has attempted every snapshot submitted
    /// before this call.
    pub async fn flush(&self) {
        let target = self.slot.borrow().0;
        let mut acked = self.acked.clone();

        if *acked.borrow_and_update() >= target {
            return;
        }
        while acked.changed().await.is_ok() {
            if *acked.borrow_and_update() >= target {
                return;
            }
        }
        // Writer gone; nothing more will be persisted.
        warn!(key = self.key, "write-through flush with stopped writer");
    }
}
