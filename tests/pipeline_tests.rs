//! End-to-end tests for the pipeline engine against the in-memory store
//!
//! Covers the live-view scoping, default-stage, commit, and cancellation
//! contracts. Run with: cargo test --test pipeline_tests

use leadboard::pipeline::{filter_leads, group_by_stage, LeadPipeline};
use leadboard::store::{Lead, LeadStore, MockLeadStore, Operator, Stage};
use leadboard::{PipelineError, StoreError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

fn lead(id: &str, owner: &str, name: &str, handle: &str, stage: Option<&str>) -> Lead {
    serde_json::from_value(json!({
        "id": id,
        "owner_id": owner,
        "display_name": name,
        "handle": handle,
        "stage": stage,
    }))
    .unwrap()
}

/// Grace period for asserting that something did NOT happen.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

async fn seeded_store() -> Arc<MockLeadStore> {
    let store = Arc::new(MockLeadStore::new());
    store.insert_lead(&lead("L1", "op1", "Ana", "ana_ig", None)).await;
    store
        .insert_lead(&lead("L2", "op1", "Bruno", "anita", Some("contacted")))
        .await;
    store
        .insert_lead(&lead("L3", "op2", "Carla", "carlinha", Some("won")))
        .await;
    store
}

#[tokio::test]
async fn view_only_ever_holds_the_scoped_operators_leads() {
    let store = seeded_store().await;
    let pipeline = LeadPipeline::new(store.clone());

    assert_ok!(pipeline.set_operator(Some("op1")).await);
    let mut view = pipeline.view();
    let leads = pipeline.leads();
    assert_eq!(leads.len(), 2);
    assert!(leads.iter().all(|l| l.owner_id == "op1"));

    // A foreign-operator mutation re-pushes the scoped snapshot; the view
    // still contains only op1's leads.
    store
        .insert_lead(&lead("L4", "op2", "Dani", "dani", None))
        .await;
    view.changed().await.unwrap();
    assert!(view.borrow().iter().all(|l| l.owner_id == "op1"));
}

#[tokio::test]
async fn unstaged_lead_lands_under_initial() {
    let store = Arc::new(MockLeadStore::new());
    store.insert_lead(&lead("L1", "op1", "Ana", "ana_ig", None)).await;
    let pipeline = LeadPipeline::new(store);

    assert_ok!(pipeline.set_operator(Some("op1")).await);
    let leads = pipeline.leads();
    let filtered = filter_leads(&leads, "");
    let columns = group_by_stage(&filtered);

    assert_eq!(columns[0].stage, Stage::Initial);
    assert_eq!(columns[0].count(), 1);
    for column in &columns[1..] {
        assert_eq!(column.count(), 0);
    }
}

#[tokio::test]
async fn search_matches_name_and_handle() {
    let store = seeded_store().await;
    let pipeline = LeadPipeline::new(store);

    assert_ok!(pipeline.set_operator(Some("op1")).await);
    let leads = pipeline.leads();

    // "an" hits Ana by name and Bruno by his "anita" handle.
    let hits = filter_leads(&leads, "an");
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn commit_becomes_visible_only_with_the_next_snapshot() {
    let store = seeded_store().await;
    let pipeline = LeadPipeline::new(store);

    assert_ok!(pipeline.set_operator(Some("op1")).await);
    let mut view = pipeline.view();

    assert_ok!(pipeline.commit_transition("L1", Stage::Won).await);

    // Synchronously after the call the board is untouched.
    let stage = pipeline
        .leads()
        .iter()
        .find(|l| l.id == "L1")
        .unwrap()
        .effective_stage();
    assert_eq!(stage, Stage::Initial);

    // The store's push carries the change in.
    view.changed().await.unwrap();
    let stage = view
        .borrow()
        .iter()
        .find(|l| l.id == "L1")
        .unwrap()
        .effective_stage();
    assert_eq!(stage, Stage::Won);
}

#[tokio::test]
async fn recommitting_the_current_stage_changes_nothing() {
    let store = seeded_store().await;
    let pipeline = LeadPipeline::new(store);

    assert_ok!(pipeline.set_operator(Some("op1")).await);
    let before = pipeline.leads();
    let mut view = pipeline.view();

    assert_ok!(pipeline.commit_transition("L2", Stage::Contacted).await);
    view.changed().await.unwrap();
    assert_eq!(*view.borrow(), before);
}

#[tokio::test]
async fn failed_commit_reports_and_leaves_view_untouched() {
    let store = seeded_store().await;
    let pipeline = LeadPipeline::new(store.clone());

    assert_ok!(pipeline.set_operator(Some("op1")).await);
    let before = pipeline.leads();

    let err = pipeline
        .commit_transition("L404", Stage::Won)
        .await
        .unwrap_err();
    match err {
        PipelineError::TransitionCommit { lead_id, source } => {
            assert_eq!(lead_id, "L404");
            assert!(matches!(source, StoreError::NotFound(_)));
        }
        other => panic!("unexpected error: {other}"),
    }

    store.set_fail_updates(true);
    let err = pipeline.commit_transition("L1", Stage::Won).await.unwrap_err();
    assert!(matches!(err, PipelineError::TransitionCommit { .. }));

    settle().await;
    assert_eq!(pipeline.leads(), before);
}

#[tokio::test]
async fn operator_switch_cancels_the_prior_subscription() {
    let store = seeded_store().await;
    let pipeline = LeadPipeline::new(store.clone());

    assert_ok!(pipeline.set_operator(Some("op1")).await);
    assert_eq!(pipeline.operator().await.as_deref(), Some("op1"));

    assert_ok!(pipeline.set_operator(Some("op2")).await);
    assert_eq!(store.subscriber_count().await, 1);
    let leads = pipeline.leads();
    assert_eq!(leads.len(), 1);
    assert!(leads.iter().all(|l| l.owner_id == "op2"));

    // Further op1 activity never reaches the op2-scoped view.
    store
        .insert_lead(&lead("L5", "op1", "Eva", "eva", None))
        .await;
    settle().await;
    assert!(pipeline.leads().iter().all(|l| l.owner_id == "op2"));
}

#[tokio::test]
async fn cancellation_is_idempotent_and_final() {
    let store = seeded_store().await;
    let pipeline = LeadPipeline::new(store.clone());

    // Tearing down with no active subscription is fine.
    pipeline.shutdown().await;
    assert_ok!(pipeline.set_operator(None).await);

    assert_ok!(pipeline.set_operator(Some("op1")).await);
    assert!(!pipeline.leads().is_empty());

    pipeline.shutdown().await;
    pipeline.shutdown().await;
    assert_eq!(pipeline.operator().await, None);
    assert!(pipeline.leads().is_empty());

    // No residual snapshot delivery after teardown.
    store
        .insert_lead(&lead("L6", "op1", "Fabi", "fabi", None))
        .await;
    settle().await;
    assert!(pipeline.leads().is_empty());
    assert_eq!(store.subscriber_count().await, 0);
}

#[tokio::test]
async fn establish_failure_degrades_to_empty_and_is_retryable() {
    let store = seeded_store().await;
    let pipeline = LeadPipeline::new(store.clone());

    store.set_fail_subscribe(true);
    let err = pipeline.set_operator(Some("op1")).await.unwrap_err();
    assert!(matches!(err, PipelineError::SubscriptionEstablish { .. }));
    assert!(pipeline.leads().is_empty());

    // The same engine re-attempts cleanly once the store recovers.
    store.set_fail_subscribe(false);
    assert_ok!(pipeline.set_operator(Some("op1")).await);
    assert_eq!(pipeline.leads().len(), 2);
}

#[tokio::test]
async fn malformed_documents_are_skipped_not_fatal() {
    let store = Arc::new(MockLeadStore::new());
    store.insert_lead(&lead("L1", "op1", "Ana", "ana_ig", None)).await;
    // Wrong-typed stage field.
    store
        .insert_raw(json!({"id": "L2", "owner_id": "op1", "stage": 42}))
        .await;
    // Document body missing its id.
    store
        .insert_raw(json!({"owner_id": "op1", "display_name": "ghost"}))
        .await;

    let pipeline = LeadPipeline::new(store);
    assert_ok!(pipeline.set_operator(Some("op1")).await);

    let leads = pipeline.leads();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].id, "L1");
}

#[tokio::test]
async fn access_code_resolves_the_operator_for_scoping() {
    let store = seeded_store().await;
    store
        .insert_operator(Operator {
            id: "op1".into(),
            name: "Marina".into(),
            code: "vip-123".into(),
        })
        .await;

    let operator = store
        .find_operator_by_code("vip-123")
        .await
        .unwrap()
        .expect("operator should resolve");

    let pipeline = LeadPipeline::new(store);
    assert_ok!(pipeline.set_operator(Some(&operator.id)).await);
    assert_eq!(pipeline.leads().len(), 2);
}
