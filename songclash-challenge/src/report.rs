//! Challenge report handed to the presentation layer
//!
//! Statistics are always present. Rows carry track metadata only when
//! enrichment succeeded; there is no partially enriched report.

use crate::comparison::{attach_tracks, compare_rounds, tally, RoundComparison, RoundTally};
use crate::enrichment::EnrichmentState;
use crate::error::ChallengeResult;
use crate::stats::{ChallengeResults, GameStats};
use serde::Serialize;
use songclash_common::human_time::{format_delta, format_seconds};

/// Track detail status as shown to the consumer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrackDetail {
    Loading,
    Ready,
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeReport {
    pub stats: GameStats,
    pub tally: RoundTally,
    pub track_detail: TrackDetail,
    pub rounds: Vec<RoundComparison>,
}

impl ChallengeReport {
    /// Assemble a report from validated results and the current enrichment state
    ///
    /// A state that belongs to another result set is reported as `Loading`.
    pub fn build(results: &ChallengeResults, enrichment: &EnrichmentState) -> ChallengeResult<Self> {
        let result_set = results.original().id();
        let mut rounds = compare_rounds(results);

        let track_detail = match enrichment {
            EnrichmentState::Ready {
                result_set: enriched,
                tracks,
                ..
            } if *enriched == result_set => {
                attach_tracks(&mut rounds, tracks, result_set)?;
                TrackDetail::Ready
            }
            EnrichmentState::Failed {
                result_set: enriched,
                reason,
                ..
            } if *enriched == result_set => TrackDetail::Unavailable {
                reason: reason.clone(),
            },
            _ => TrackDetail::Loading,
        };

        Ok(Self {
            stats: results.stats(),
            tally: tally(&rounds),
            track_detail,
            rounds,
        })
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        let verdict = if self.stats.player_won {
            "challenger wins"
        } else {
            "original holds"
        };
        format!(
            "{} ({} vs {}), avg time {} vs {} ({})",
            verdict,
            self.stats.player_total,
            self.stats.original_total,
            format_seconds(self.stats.player_avg_time),
            format_seconds(self.stats.original_avg_time),
            format_delta(self.stats.player_avg_time - self.stats.original_avg_time),
        )
    }
}
