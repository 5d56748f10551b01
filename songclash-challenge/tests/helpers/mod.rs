//! Test Helper Utilities
//!
//! Shared fixtures and a gated track lookup whose per-track results are
//! released by the test, so completion order can be forced.

#![allow(dead_code)]

use async_trait::async_trait;
use songclash_challenge::lookup::{LookupError, TrackLookup};
use songclash_common::{ResultSet, RoundResult, TrackId, TrackMetadata};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::{oneshot, Notify};

pub type LookupOutcome = Result<TrackMetadata, LookupError>;

/// Deterministic metadata for a track id
pub fn meta(id: &str) -> TrackMetadata {
    TrackMetadata {
        id: TrackId::new(id),
        title: format!("Title {}", id),
        artists: vec![format!("Artist {}", id)],
        album: format!("Album {}", id),
        artwork_url: None,
        preview_url: None,
        duration_ms: Some(180_000),
    }
}

/// Result set with one round per id (score 10, 1s each)
pub fn result_set(ids: &[&str]) -> ResultSet {
    ResultSet::new(ids.iter().map(|id| RoundResult::new(*id, 10, 1.0)).collect())
}

/// Install a test subscriber once (ignored if already set)
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("songclash_challenge=debug")
        .with_test_writer()
        .try_init();
}

/// Lookup that blocks gated tracks until the test releases them
///
/// Tracks without a gate resolve immediately with [`meta`].
#[derive(Default)]
pub struct GatedLookup {
    gates: Mutex<HashMap<TrackId, oneshot::Receiver<LookupOutcome>>>,
    calls: Mutex<Vec<TrackId>>,
    completed: Mutex<Vec<TrackId>>,
    calls_notify: Notify,
    completed_notify: Notify,
}

impl GatedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate `id`; the lookup resolves with whatever is sent on the returned sender
    pub fn gate(&self, id: &str) -> oneshot::Sender<LookupOutcome> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(TrackId::new(id), rx);
        tx
    }

    /// Track ids in the order their lookups started
    pub fn calls(&self) -> Vec<TrackId> {
        self.calls.lock().unwrap().clone()
    }

    /// Track ids in the order their lookups finished
    pub fn completed(&self) -> Vec<TrackId> {
        self.completed.lock().unwrap().clone()
    }

    pub async fn wait_calls(&self, n: usize) {
        loop {
            if self.calls.lock().unwrap().len() >= n {
                return;
            }
            self.calls_notify.notified().await;
        }
    }

    pub async fn wait_completed(&self, n: usize) {
        loop {
            if self.completed.lock().unwrap().len() >= n {
                return;
            }
            self.completed_notify.notified().await;
        }
    }
}

#[async_trait]
impl TrackLookup for GatedLookup {
    async fn lookup(&self, track_id: &TrackId) -> LookupOutcome {
        self.calls.lock().unwrap().push(track_id.clone());
        self.calls_notify.notify_one();

        let gate = self.gates.lock().unwrap().remove(track_id);
        let outcome = match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(LookupError::Network("gate dropped".to_string()))),
            None => Ok(meta(track_id.as_str())),
        };

        self.completed.lock().unwrap().push(track_id.clone());
        self.completed_notify.notify_one();
        outcome
    }
}
