//! Track enrichment
//!
//! Resolves every round's track id into [`TrackMetadata`] through a
//! [`TrackLookup`]. All lookups run concurrently on the calling task and are
//! joined in round order; a single failure fails the whole batch.
//!
//! The loading / ready / failed state machine that consumers observe lives in
//! [`controller`].

pub mod controller;

pub use controller::{Commit, EnrichmentController, EnrichmentState, RequestTicket};

use crate::lookup::{LookupError, TrackLookup};
use futures::future::try_join_all;
use songclash_common::{ResultSet, TrackId, TrackMetadata};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Enrichment failed because one round's lookup failed
///
/// Reported once per batch; the other rounds' results are discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Track lookup failed for round {round} ({track_id}): {source}")]
pub struct EnrichError {
    pub round: usize,
    pub track_id: TrackId,
    #[source]
    pub source: LookupError,
}

/// Track metadata for every round of one result set, in round order
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTrackList {
    result_set: Uuid,
    tracks: Vec<TrackMetadata>,
}

impl EnrichedTrackList {
    /// Identity of the result set these tracks were resolved for
    pub fn result_set(&self) -> Uuid {
        self.result_set
    }

    pub fn tracks(&self) -> &[TrackMetadata] {
        &self.tracks
    }

    pub fn get(&self, round: usize) -> Option<&TrackMetadata> {
        self.tracks.get(round)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackMetadata> {
        self.tracks.iter()
    }

    pub fn into_tracks(self) -> Vec<TrackMetadata> {
        self.tracks
    }
}

/// Enrich a result set with track metadata
///
/// Issues one lookup per round, all at once. Output index `i` is round `i`
/// regardless of completion order. On the first failure the remaining lookups
/// are dropped and the error is returned; no partial list escapes.
pub async fn enrich<L>(results: &ResultSet, lookup: &L) -> Result<EnrichedTrackList, EnrichError>
where
    L: TrackLookup + ?Sized,
{
    let started = Instant::now();

    let lookups = results.iter().enumerate().map(|(round, result)| async move {
        debug!(round, track_id = %result.track_id, "Looking up track");
        lookup
            .lookup(&result.track_id)
            .await
            .map_err(|source| EnrichError {
                round,
                track_id: result.track_id.clone(),
                source,
            })
    });

    match try_join_all(lookups).await {
        Ok(tracks) => {
            info!(
                result_set = %results.id(),
                rounds = tracks.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Track enrichment complete"
            );
            Ok(EnrichedTrackList {
                result_set: results.id(),
                tracks,
            })
        }
        Err(e) => {
            warn!(
                result_set = %results.id(),
                round = e.round,
                track_id = %e.track_id,
                error = %e.source,
                "Track enrichment failed"
            );
            Err(e)
        }
    }
}
