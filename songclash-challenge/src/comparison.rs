//! Per-round comparison rows
//!
//! One row per round pairing both players' results, who took the round, and
//! (once enrichment succeeds) the track that was played.

use crate::enrichment::EnrichedTrackList;
use crate::error::{ChallengeError, ChallengeResult};
use crate::stats::ChallengeResults;
use serde::Serialize;
use songclash_common::{RoundResult, TrackId, TrackMetadata};
use std::cmp::Ordering;
use uuid::Uuid;

/// Who scored more in a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    PlayerAhead,
    OriginalAhead,
    Tied,
}

impl RoundOutcome {
    fn from_scores(player: u32, original: u32) -> Self {
        match player.cmp(&original) {
            Ordering::Greater => RoundOutcome::PlayerAhead,
            Ordering::Less => RoundOutcome::OriginalAhead,
            Ordering::Equal => RoundOutcome::Tied,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundComparison {
    /// 0-based round index
    pub round: usize,
    pub track_id: TrackId,
    pub original: RoundResult,
    pub player: RoundResult,
    pub outcome: RoundOutcome,
    /// Player time minus original time, in seconds (negative = player faster)
    pub time_delta: f64,
    /// Filled in by [`attach_tracks`]
    pub track: Option<TrackMetadata>,
}

/// Rounds won by each side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundTally {
    pub player_rounds: usize,
    pub original_rounds: usize,
    pub tied_rounds: usize,
}

/// Build comparison rows in round order, without track metadata
pub fn compare_rounds(results: &ChallengeResults) -> Vec<RoundComparison> {
    results
        .original()
        .iter()
        .zip(results.player().iter())
        .enumerate()
        .map(|(round, (original, player))| RoundComparison {
            round,
            track_id: original.track_id.clone(),
            original: original.clone(),
            player: player.clone(),
            outcome: RoundOutcome::from_scores(player.score, original.score),
            time_delta: player.time_taken - original.time_taken,
            track: None,
        })
        .collect()
}

/// Attach enriched tracks to rows by round index
///
/// The list must have been enriched from `result_set` and cover exactly
/// these rounds.
pub fn attach_tracks(
    rows: &mut [RoundComparison],
    tracks: &EnrichedTrackList,
    result_set: Uuid,
) -> ChallengeResult<()> {
    if tracks.result_set() != result_set {
        return Err(ChallengeError::TrackListForeign {
            expected: result_set,
            actual: tracks.result_set(),
        });
    }

    if rows.len() != tracks.len() {
        return Err(ChallengeError::TrackListMismatch {
            rounds: rows.len(),
            tracks: tracks.len(),
        });
    }

    for (row, track) in rows.iter_mut().zip(tracks.iter()) {
        row.track = Some(track.clone());
    }
    Ok(())
}

pub fn tally(rows: &[RoundComparison]) -> RoundTally {
    rows.iter().fold(RoundTally::default(), |mut tally, row| {
        match row.outcome {
            RoundOutcome::PlayerAhead => tally.player_rounds += 1,
            RoundOutcome::OriginalAhead => tally.original_rounds += 1,
            RoundOutcome::Tied => tally.tied_rounds += 1,
        }
        tally
    })
}
