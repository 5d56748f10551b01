//! Enrichment request lifecycle
//!
//! `Idle → Loading → {Ready | Failed}`, restarted whenever a different result
//! set is requested.
//!
//! Every request gets a generation number. A completed enrichment is committed
//! only if its generation is still the current one; anything older is stale and
//! dropped without touching consumer-visible state. Superseded requests are
//! also cancelled through their [`CancellationToken`], but the generation check
//! alone is what keeps stale results out.

use super::{enrich, EnrichError, EnrichedTrackList};
use crate::lookup::TrackLookup;
use chrono::{DateTime, Utc};
use songclash_common::ResultSet;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// Consumer-visible enrichment state
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentState {
    /// Nothing requested yet (or reset)
    Idle,
    /// Lookups in flight for `result_set`
    Loading { generation: u64, result_set: Uuid },
    /// Every round resolved
    Ready {
        generation: u64,
        result_set: Uuid,
        tracks: Arc<EnrichedTrackList>,
        completed_at: DateTime<Utc>,
    },
    /// At least one lookup failed; no tracks are shown for this request
    Failed {
        generation: u64,
        result_set: Uuid,
        reason: String,
    },
}

impl EnrichmentState {
    pub fn is_loading(&self) -> bool {
        matches!(self, EnrichmentState::Loading { .. })
    }

    /// Generation that produced this state (0 for `Idle`)
    pub fn generation(&self) -> u64 {
        match self {
            EnrichmentState::Idle => 0,
            EnrichmentState::Loading { generation, .. }
            | EnrichmentState::Ready { generation, .. }
            | EnrichmentState::Failed { generation, .. } => *generation,
        }
    }

    pub fn result_set(&self) -> Option<Uuid> {
        match self {
            EnrichmentState::Idle => None,
            EnrichmentState::Loading { result_set, .. }
            | EnrichmentState::Ready { result_set, .. }
            | EnrichmentState::Failed { result_set, .. } => Some(*result_set),
        }
    }

    pub fn tracks(&self) -> Option<&Arc<EnrichedTrackList>> {
        match self {
            EnrichmentState::Ready { tracks, .. } => Some(tracks),
            _ => None,
        }
    }
}

/// Handle for one enrichment request
#[derive(Debug, Clone)]
pub struct RequestTicket {
    generation: u64,
    result_set: Uuid,
    cancel: CancellationToken,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn result_set(&self) -> Uuid {
        self.result_set
    }

    /// Cancelled once a newer request supersedes this one
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// What happened to a completed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// Outcome became the current state
    Applied,
    /// A newer request exists; outcome discarded
    Stale,
    /// This result set was already loading or ready; nothing was started
    Unchanged,
}

#[derive(Debug, Default)]
struct Inner {
    generation: u64,
    cancel: Option<CancellationToken>,
}

/// Owns the enrichment state machine for one consumer
#[derive(Debug)]
pub struct EnrichmentController {
    inner: Mutex<Inner>,
    state_tx: watch::Sender<EnrichmentState>,
}

impl Default for EnrichmentController {
    fn default() -> Self {
        Self::new()
    }
}

impl EnrichmentController {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(EnrichmentState::Idle);
        Self {
            inner: Mutex::new(Inner::default()),
            state_tx,
        }
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<EnrichmentState> {
        self.state_tx.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> EnrichmentState {
        self.state_tx.borrow().clone()
    }

    /// Start a new request for `result_set`, superseding any in-flight one
    pub async fn begin(&self, result_set: Uuid) -> RequestTicket {
        let mut inner = self.inner.lock().await;
        self.begin_locked(&mut inner, result_set)
    }

    /// Start a request unless `result_set` is already loading or ready
    ///
    /// A failed request for the same result set is restarted; that is the
    /// consumer's retry path.
    pub async fn begin_if_changed(&self, result_set: Uuid) -> Option<RequestTicket> {
        let mut inner = self.inner.lock().await;

        let current = self.state_tx.borrow().clone();
        let unchanged = current.result_set() == Some(result_set)
            && matches!(
                current,
                EnrichmentState::Loading { .. } | EnrichmentState::Ready { .. }
            );
        if unchanged {
            debug!(result_set = %result_set, "Enrichment already current for result set");
            return None;
        }

        Some(self.begin_locked(&mut inner, result_set))
    }

    fn begin_locked(&self, inner: &mut Inner, result_set: Uuid) -> RequestTicket {
        if let Some(previous) = inner.cancel.take() {
            previous.cancel();
        }

        inner.generation += 1;
        let cancel = CancellationToken::new();
        inner.cancel = Some(cancel.clone());

        let generation = inner.generation;
        self.state_tx.send_replace(EnrichmentState::Loading {
            generation,
            result_set,
        });

        debug!(generation, result_set = %result_set, "Enrichment started");

        RequestTicket {
            generation,
            result_set,
            cancel,
        }
    }

    /// Apply a finished request's outcome if it is still current
    pub async fn commit(
        &self,
        ticket: &RequestTicket,
        outcome: Result<EnrichedTrackList, EnrichError>,
    ) -> Commit {
        let inner = self.inner.lock().await;

        if ticket.generation != inner.generation {
            debug!(
                generation = ticket.generation,
                current = inner.generation,
                result_set = %ticket.result_set,
                "Discarding stale enrichment result"
            );
            return Commit::Stale;
        }

        let next = match outcome {
            Ok(tracks) => {
                info!(
                    generation = ticket.generation,
                    rounds = tracks.len(),
                    "Enrichment ready"
                );
                EnrichmentState::Ready {
                    generation: ticket.generation,
                    result_set: ticket.result_set,
                    tracks: Arc::new(tracks),
                    completed_at: Utc::now(),
                }
            }
            Err(e) => EnrichmentState::Failed {
                generation: ticket.generation,
                result_set: ticket.result_set,
                reason: e.to_string(),
            },
        };

        self.state_tx.send_replace(next);
        Commit::Applied
    }

    /// Return to `Idle`, invalidating any in-flight request
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(previous) = inner.cancel.take() {
            previous.cancel();
        }
        inner.generation += 1;
        self.state_tx.send_replace(EnrichmentState::Idle);
    }

    /// Enrich `results` and commit the outcome unless superseded meanwhile
    pub async fn run<L>(&self, results: &ResultSet, lookup: &L) -> Commit
    where
        L: TrackLookup + ?Sized,
    {
        let Some(ticket) = self.begin_if_changed(results.id()).await else {
            return Commit::Unchanged;
        };

        let outcome = tokio::select! {
            biased;
            _ = ticket.cancel.cancelled() => {
                debug!(generation = ticket.generation, "Enrichment superseded before completion");
                return Commit::Stale;
            }
            outcome = enrich(results, lookup) => outcome,
        };

        self.commit(&ticket, outcome).await
    }

    /// [`run`](Self::run) on a background task
    pub fn spawn(
        self: &Arc<Self>,
        results: Arc<ResultSet>,
        lookup: Arc<dyn TrackLookup>,
    ) -> JoinHandle<Commit> {
        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.run(&results, &*lookup).await })
    }
}
