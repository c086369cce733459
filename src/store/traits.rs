//! LeadStore trait definition
//!
//! The narrow boundary to the remote lead store: a standing scoped query
//! that pushes full-collection snapshots, plus a single field-level update.
//! Abstracting it behind a trait enables testing against the in-memory
//! mock and future backend swaps.

use crate::error::StoreError;
use crate::store::models::{Operator, Stage};
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;

/// One full replacement image of the subscribed collection, as raw
/// documents. Decoding (and malformed-record skipping) happens on the
/// engine side, not in the store client.
pub type Snapshot = Vec<Value>;

/// Handle to a standing scoped query.
///
/// Snapshots arrive until `cancel` is called or the handle is dropped;
/// each snapshot fully supersedes the previous one. There is no replay:
/// the stream is non-restartable.
pub struct LeadSubscription {
    snapshots: UnboundedReceiverStream<Snapshot>,
    cancel: CancellationToken,
}

impl LeadSubscription {
    pub fn new(snapshots: mpsc::UnboundedReceiver<Snapshot>, cancel: CancellationToken) -> Self {
        Self {
            snapshots: UnboundedReceiverStream::new(snapshots),
            cancel,
        }
    }

    /// Receive the next snapshot. Returns `None` once the subscription is
    /// cancelled or the store side closes the stream.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.snapshots.next().await
    }

    /// Stop further snapshot delivery and release the server-side query.
    /// Idempotent: safe to call any number of times.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cloned cancellation token, for select loops that must stop pulling
    /// snapshots the moment the subscription is torn down.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for LeadSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Abstract interface to the remote lead store.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Establish a standing query for all leads owned by `owner_id`.
    ///
    /// The current collection state is pushed as the first snapshot, then
    /// a fresh snapshot follows every store-side mutation. The error case
    /// is non-fatal to the process: callers degrade to an empty view and
    /// may re-attempt later.
    async fn subscribe(&self, owner_id: &str) -> Result<LeadSubscription, StoreError>;

    /// Set a single lead's `stage` field. Unconditional last-write-wins;
    /// the store offers no compare-and-set.
    async fn update_stage(&self, lead_id: &str, stage: Stage) -> Result<(), StoreError>;

    /// Resolve an operator record from an access code.
    async fn find_operator_by_code(&self, code: &str) -> Result<Option<Operator>, StoreError>;
}
