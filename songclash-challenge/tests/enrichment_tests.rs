//! Integration tests for track enrichment
//!
//! - Output order is round order, whatever order lookups finish in
//! - One failing lookup fails the batch; no partial list is exposed
//! - A superseded request never changes consumer-visible state

mod helpers;

use helpers::{init_test_logging, meta, result_set, GatedLookup};
use songclash_challenge::enrichment::{enrich, Commit, EnrichmentController, EnrichmentState};
use songclash_challenge::lookup::{LookupError, TrackLookup};
use songclash_common::TrackId;
use std::sync::Arc;

fn ids(list: &[TrackId]) -> Vec<&str> {
    list.iter().map(TrackId::as_str).collect()
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
async fn test_out_of_order_resolution_keeps_round_order() {
    init_test_logging();

    let lookup = Arc::new(GatedLookup::new());
    let gate0 = lookup.gate("r0");
    let gate1 = lookup.gate("r1");
    let gate2 = lookup.gate("r2");

    let results = Arc::new(result_set(&["r0", "r1", "r2"]));
    let task = {
        let lookup = Arc::clone(&lookup);
        let results = Arc::clone(&results);
        tokio::spawn(async move { enrich(&results, &*lookup).await })
    };

    // All three lookups are issued before any of them resolves
    lookup.wait_calls(3).await;

    gate2.send(Ok(meta("r2"))).unwrap();
    lookup.wait_completed(1).await;
    gate0.send(Ok(meta("r0"))).unwrap();
    lookup.wait_completed(2).await;
    gate1.send(Ok(meta("r1"))).unwrap();

    let list = task.await.unwrap().unwrap();

    assert_eq!(ids(&lookup.completed()), vec!["r2", "r0", "r1"]);
    let titles: Vec<&str> = list.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Title r0", "Title r1", "Title r2"]);
    assert_eq!(list.result_set(), results.id());
}

// ============================================================================
// All-or-nothing
// ============================================================================

#[tokio::test]
async fn test_middle_round_failure_fails_batch() {
    let lookup = Arc::new(GatedLookup::new());
    let gate1 = lookup.gate("r1");

    let results = Arc::new(result_set(&["r0", "r1", "r2"]));
    let task = {
        let lookup = Arc::clone(&lookup);
        let results = Arc::clone(&results);
        tokio::spawn(async move { enrich(&results, &*lookup).await })
    };

    // r0 and r2 succeed first
    lookup.wait_completed(2).await;
    gate1
        .send(Err(LookupError::NotFound(TrackId::new("r1"))))
        .unwrap();

    let err = task.await.unwrap().unwrap_err();

    assert_eq!(err.round, 1);
    assert_eq!(err.track_id, TrackId::new("r1"));
    assert_eq!(err.source, LookupError::NotFound(TrackId::new("r1")));
}

#[tokio::test]
async fn test_failed_batch_never_reaches_ready_state() {
    let controller = Arc::new(EnrichmentController::new());
    let mut rx = controller.subscribe();

    let lookup = Arc::new(GatedLookup::new());
    let gate1 = lookup.gate("r1");
    let results = Arc::new(result_set(&["r0", "r1", "r2"]));

    let handle = controller.spawn(Arc::clone(&results), Arc::clone(&lookup) as Arc<dyn TrackLookup>);

    lookup.wait_completed(2).await;
    assert!(controller.state().is_loading(), "partial results must not be published");

    gate1
        .send(Err(LookupError::Api(500, "boom".to_string())))
        .unwrap();
    assert_eq!(handle.await.unwrap(), Commit::Applied);

    // The batch settles as Failed with no tracks attached
    let seen = rx.borrow_and_update().clone();
    assert!(matches!(seen, EnrichmentState::Failed { .. }), "got {:?}", seen);
    assert!(seen.tracks().is_none());
}

// ============================================================================
// Staleness
// ============================================================================

#[tokio::test]
async fn test_superseded_success_is_discarded() {
    init_test_logging();

    let controller = Arc::new(EnrichmentController::new());
    let lookup = Arc::new(GatedLookup::new());
    let gate_a = lookup.gate("a0");

    let set_a = Arc::new(result_set(&["a0"]));
    let set_b = Arc::new(result_set(&["b0", "b1"]));

    let handle_a = controller.spawn(Arc::clone(&set_a), Arc::clone(&lookup) as Arc<dyn TrackLookup>);
    lookup.wait_calls(1).await;

    let handle_b = controller.spawn(Arc::clone(&set_b), Arc::clone(&lookup) as Arc<dyn TrackLookup>);
    assert_eq!(handle_b.await.unwrap(), Commit::Applied);

    // A resolves late; the receiver may already be gone
    let _ = gate_a.send(Ok(meta("a0")));
    assert_eq!(handle_a.await.unwrap(), Commit::Stale);

    let state = controller.state();
    assert_eq!(state.result_set(), Some(set_b.id()));
    let tracks = state.tracks().expect("B should be ready");
    let titles: Vec<&str> = tracks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Title b0", "Title b1"]);
}

#[tokio::test]
async fn test_superseded_failure_is_discarded() {
    let controller = Arc::new(EnrichmentController::new());
    let lookup = Arc::new(GatedLookup::new());
    let gate_a = lookup.gate("a0");

    let set_a = Arc::new(result_set(&["a0"]));
    let set_b = Arc::new(result_set(&["b0"]));

    let handle_a = controller.spawn(Arc::clone(&set_a), Arc::clone(&lookup) as Arc<dyn TrackLookup>);
    lookup.wait_calls(1).await;
    let handle_b = controller.spawn(Arc::clone(&set_b), Arc::clone(&lookup) as Arc<dyn TrackLookup>);
    handle_b.await.unwrap();

    let _ = gate_a.send(Err(LookupError::RateLimited));
    assert_eq!(handle_a.await.unwrap(), Commit::Stale);

    assert!(matches!(
        controller.state(),
        EnrichmentState::Ready { result_set, .. } if result_set == set_b.id()
    ));
}

#[tokio::test]
async fn test_generation_guard_without_cancellation() {
    // Drive begin/enrich/commit by hand so request A really runs to
    // completion after B has been committed.
    let controller = EnrichmentController::new();
    let lookup = Arc::new(GatedLookup::new());
    let gate_a = lookup.gate("a0");

    let set_a = Arc::new(result_set(&["a0"]));
    let set_b = result_set(&["b0"]);

    let ticket_a = controller.begin(set_a.id()).await;
    let enrich_a = {
        let lookup = Arc::clone(&lookup);
        let set_a = Arc::clone(&set_a);
        tokio::spawn(async move { enrich(&set_a, &*lookup).await })
    };
    lookup.wait_calls(1).await;

    let ticket_b = controller.begin(set_b.id()).await;
    let outcome_b = enrich(&set_b, &*lookup).await;
    assert_eq!(controller.commit(&ticket_b, outcome_b).await, Commit::Applied);
    let committed_b = controller.state();

    gate_a.send(Ok(meta("a0"))).unwrap();
    let outcome_a = enrich_a.await.unwrap();
    assert!(outcome_a.is_ok());

    assert_eq!(controller.commit(&ticket_a, outcome_a).await, Commit::Stale);
    assert_eq!(controller.state(), committed_b);
}

#[tokio::test]
async fn test_same_result_set_is_not_refetched() {
    let controller = EnrichmentController::new();
    let lookup = GatedLookup::new();
    let results = result_set(&["x", "y"]);

    assert_eq!(controller.run(&results, &lookup).await, Commit::Applied);
    assert_eq!(controller.run(&results, &lookup).await, Commit::Unchanged);
    assert_eq!(lookup.calls().len(), 2);

    // Same rounds under a new identity is a new request
    let again = result_set(&["x", "y"]);
    assert_eq!(controller.run(&again, &lookup).await, Commit::Applied);
    assert_eq!(lookup.calls().len(), 4);
}

#[tokio::test]
async fn test_retry_after_failure_with_same_result_set() {
    let controller = EnrichmentController::new();
    let lookup = GatedLookup::new();
    let results = result_set(&["x"]);

    let gate = lookup.gate("x");
    gate.send(Err(LookupError::Network("offline".to_string()))).unwrap();
    assert_eq!(controller.run(&results, &lookup).await, Commit::Applied);
    assert!(matches!(controller.state(), EnrichmentState::Failed { .. }));

    assert_eq!(controller.run(&results, &lookup).await, Commit::Applied);
    assert!(controller.state().tracks().is_some());
}
