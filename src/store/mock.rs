//! In-memory implementation of LeadStore with push subscriptions.
//!
//! Backs the integration tests and the preview binary. Documents live in
//! `tokio::sync::RwLock` maps; every mutation re-pushes a full scoped
//! snapshot to each live subscriber, the same contract the remote store
//! honors. Fault-injection flags cover the error paths.

use crate::error::StoreError;
use crate::store::models::{Lead, Operator, Stage};
use crate::store::traits::{LeadStore, LeadSubscription, Snapshot};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

struct Subscriber {
    owner_id: String,
    tx: mpsc::UnboundedSender<Snapshot>,
    cancel: CancellationToken,
}

/// In-memory lead store.
#[derive(Default)]
pub struct MockLeadStore {
    /// Raw documents keyed by document id. Stored as `Value` so tests can
    /// plant malformed records the way a drifted production collection
    /// would contain them.
    docs: RwLock<BTreeMap<String, Value>>,
    operators: RwLock<BTreeMap<String, Operator>>,
    subscribers: RwLock<Vec<Subscriber>>,
    fail_subscribe: AtomicBool,
    fail_updates: AtomicBool,
}

impl MockLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a lead, assigning a fresh document id when the lead carries
    /// none, and push updated snapshots. Returns the document id.
    pub async fn insert_lead(&self, lead: &Lead) -> String {
        let mut lead = lead.clone();
        if lead.id.is_empty() {
            lead.id = Uuid::new_v4().to_string();
        }
        let id = lead.id.clone();
        let doc = serde_json::to_value(&lead).unwrap_or(Value::Null);
        self.docs.write().await.insert(id.clone(), doc);
        self.push_snapshots().await;
        id
    }

    /// Insert a raw document verbatim, bypassing the `Lead` shape. The
    /// document is keyed by its `id` field when present, otherwise by a
    /// fresh id that is deliberately NOT written back into the document.
    pub async fn insert_raw(&self, doc: Value) -> String {
        let key = doc
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        self.docs.write().await.insert(key.clone(), doc);
        self.push_snapshots().await;
        key
    }

    /// Delete a lead document, as a concurrent writer would.
    pub async fn remove_lead(&self, lead_id: &str) {
        self.docs.write().await.remove(lead_id);
        self.push_snapshots().await;
    }

    pub async fn insert_operator(&self, operator: Operator) {
        self.operators
            .write()
            .await
            .insert(operator.id.clone(), operator);
    }

    /// Make the next `subscribe` calls fail, for establish-error paths.
    pub fn set_fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.store(fail, Ordering::Relaxed);
    }

    /// Make `update_stage` calls fail, for commit-error paths.
    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::Relaxed);
    }

    /// Number of live (non-cancelled) subscriptions.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .await
            .iter()
            .filter(|s| !s.cancel.is_cancelled())
            .count()
    }

    async fn scoped_snapshot(&self, owner_id: &str) -> Snapshot {
        self.docs
            .read()
            .await
            .values()
            .filter(|doc| doc.get("owner_id").and_then(Value::as_str) == Some(owner_id))
            .cloned()
            .collect()
    }

    /// Push a fresh scoped snapshot to every live subscriber, pruning the
    /// cancelled and disconnected ones.
    async fn push_snapshots(&self) {
        let mut subscribers = self.subscribers.write().await;
        subscribers.retain(|s| !s.cancel.is_cancelled() && !s.tx.is_closed());
        for subscriber in subscribers.iter() {
            let snapshot = self.scoped_snapshot(&subscriber.owner_id).await;
            let _ = subscriber.tx.send(snapshot);
        }
    }
}

#[async_trait]
impl LeadStore for MockLeadStore {
    async fn subscribe(&self, owner_id: &str) -> Result<LeadSubscription, StoreError> {
        if self.fail_subscribe.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("subscribe refused".into()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        // Initial state arrives as the first snapshot.
        let _ = tx.send(self.scoped_snapshot(owner_id).await);

        self.subscribers.write().await.push(Subscriber {
            owner_id: owner_id.to_string(),
            tx,
            cancel: cancel.clone(),
        });

        Ok(LeadSubscription::new(rx, cancel))
    }

    async fn update_stage(&self, lead_id: &str, stage: Stage) -> Result<(), StoreError> {
        if self.fail_updates.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("update refused".into()));
        }

        {
            let mut docs = self.docs.write().await;
            let doc = docs
                .get_mut(lead_id)
                .ok_or_else(|| StoreError::NotFound(lead_id.to_string()))?;
            if let Some(fields) = doc.as_object_mut() {
                fields.insert("stage".into(), Value::String(stage.as_str().to_string()));
            }
        }

        self.push_snapshots().await;
        Ok(())
    }

    async fn find_operator_by_code(&self, code: &str) -> Result<Option<Operator>, StoreError> {
        Ok(self
            .operators
            .read()
            .await
            .values()
            .find(|op| op.code == code)
            .cloned())
    }
}
