//! Live view subscriber
//!
//! Owns the operator-scoped lead collection. One standing store
//! subscription at a time; every inbound snapshot replaces the collection
//! wholesale through a `watch` channel, so readers always observe a
//! complete image and never a half-applied update.

use crate::error::PipelineError;
use crate::store::models::Lead;
use crate::store::traits::{LeadStore, Snapshot};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Decode one pushed snapshot into leads, skipping undecodable records.
///
/// A document missing `id` or `owner_id`, or carrying a field of the
/// wrong shape, is dropped with a warning; the rest of the snapshot
/// survives. A bad record never fails the subscription.
pub fn decode_snapshot(docs: Snapshot) -> Vec<Lead> {
    let mut leads = Vec::with_capacity(docs.len());
    for doc in docs {
        match serde_json::from_value::<Lead>(doc) {
            Ok(lead) => leads.push(lead),
            Err(err) => {
                warn!(error = %err, "skipping malformed lead document");
            }
        }
    }
    leads
}

struct ActiveSubscription {
    operator_id: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// The lead pipeline engine.
///
/// Holds the live view and the store handle; stage transitions are
/// committed through [`commit_transition`](LeadPipeline::commit_transition)
/// and only ever become visible via the next snapshot push.
pub struct LeadPipeline {
    pub(crate) store: Arc<dyn LeadStore>,
    view: watch::Sender<Vec<Lead>>,
    active: Mutex<Option<ActiveSubscription>>,
}

impl LeadPipeline {
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        let (view, _) = watch::channel(Vec::new());
        Self {
            store,
            view,
            active: Mutex::new(None),
        }
    }

    /// Switch the operator the live view is scoped to.
    ///
    /// The prior subscription is always cancelled first, so snapshots for
    /// the old operator can never land in the new operator's view. `None`
    /// tears the subscription down and leaves the board empty. On
    /// establishment failure the view stays empty and the same call may
    /// be re-issued later; the engine keeps no corrupt state behind.
    ///
    /// The store pushes current state as the first snapshot; it is
    /// absorbed before this returns, so the view reflects the new
    /// operator immediately.
    pub async fn set_operator(&self, operator_id: Option<&str>) -> Result<(), PipelineError> {
        self.teardown().await;
        self.view.send_replace(Vec::new());

        let Some(operator_id) = operator_id else {
            return Ok(());
        };

        let mut subscription = match self.store.subscribe(operator_id).await {
            Ok(subscription) => subscription,
            Err(source) => {
                warn!(operator_id, error = %source, "lead subscription not established");
                return Err(PipelineError::SubscriptionEstablish {
                    operator_id: operator_id.to_string(),
                    source,
                });
            }
        };

        if let Some(docs) = subscription.recv().await {
            self.view.send_replace(decode_snapshot(docs));
        }

        let cancel = subscription.cancellation();
        let token = cancel.clone();
        let view = self.view.clone();
        let scope = operator_id.to_string();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    next = subscription.recv() => match next {
                        Some(docs) => {
                            let leads = decode_snapshot(docs);
                            debug!(operator_id = %scope, leads = leads.len(), "live view replaced");
                            view.send_replace(leads);
                        }
                        // Store side closed the stream; the view keeps its
                        // last (now stale) image until the next operator
                        // change re-establishes.
                        None => break,
                    },
                }
            }
        });

        *self.active.lock().await = Some(ActiveSubscription {
            operator_id: operator_id.to_string(),
            cancel,
            task,
        });
        Ok(())
    }

    /// Tear down any active subscription and clear the board. Idempotent.
    pub async fn shutdown(&self) {
        self.teardown().await;
        self.view.send_replace(Vec::new());
    }

    /// Operator the view is currently scoped to.
    pub async fn operator(&self) -> Option<String> {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|active| active.operator_id.clone())
    }

    /// Live handle onto the view; `changed()` fires on every snapshot.
    pub fn view(&self) -> watch::Receiver<Vec<Lead>> {
        self.view.subscribe()
    }

    /// Copy of the current collection.
    pub fn leads(&self) -> Vec<Lead> {
        self.view.borrow().clone()
    }

    async fn teardown(&self) {
        if let Some(active) = self.active.lock().await.take() {
            active.cancel.cancel();
            // Wait the forwarding task out so a final in-flight snapshot
            // cannot land after the view has been handed to someone else.
            let _ = active.task.await;
        }
    }
}
