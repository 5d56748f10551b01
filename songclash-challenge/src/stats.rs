//! Challenge statistics
//!
//! Reduces the original player's and the challenger's round results into
//! totals, average answer times and a winner flag. Pure and synchronous: the
//! numbers are available before any track metadata has been fetched.
//!
//! # Tie-break
//!
//! The challenger wins only with a strictly higher total. Equal totals go to
//! the original player, who defends the tie. See [`player_wins`].

use crate::error::{ChallengeError, ChallengeResult};
use serde::Serialize;
use songclash_common::{ResultSet, RoundResult};
use std::sync::Arc;

/// Summary of a challenge, recomputed on every call
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    /// Sum of the original player's round scores
    pub original_total: u64,
    /// Sum of the challenger's round scores
    pub player_total: u64,
    /// Mean answer time of the original player, in seconds
    pub original_avg_time: f64,
    /// Mean answer time of the challenger, in seconds
    pub player_avg_time: f64,
    /// Challenger beat the original total (ties are not wins)
    pub player_won: bool,
}

/// Challenger win rule: strictly greater total.
///
/// NOTE: `>` and not `>=`. A tie is not a win for the challenger.
pub fn player_wins(player_total: u64, original_total: u64) -> bool {
    player_total > original_total
}

/// Check that two result sequences describe the same rounds
///
/// Rejects empty input, length mismatch, and rounds where the players faced
/// different tracks (reporting the first such round).
pub fn validate_alignment(original: &[RoundResult], player: &[RoundResult]) -> ChallengeResult<()> {
    if original.len() != player.len() {
        return Err(ChallengeError::LengthMismatch {
            original: original.len(),
            player: player.len(),
        });
    }

    if original.is_empty() {
        return Err(ChallengeError::EmptyResults);
    }

    if let Some((round, (o, p))) = original
        .iter()
        .zip(player)
        .enumerate()
        .find(|(_, (o, p))| o.track_id != p.track_id)
    {
        return Err(ChallengeError::RoundMisaligned {
            round,
            original: o.track_id.clone(),
            player: p.track_id.clone(),
        });
    }

    Ok(())
}

/// Compute challenge statistics from two round-aligned result sequences
pub fn compute_stats(original: &[RoundResult], player: &[RoundResult]) -> ChallengeResult<GameStats> {
    validate_alignment(original, player)?;
    Ok(aggregate(original, player))
}

/// Aggregation over already-validated input (non-empty, equal length)
fn aggregate(original: &[RoundResult], player: &[RoundResult]) -> GameStats {
    let original_total = total_score(original);
    let player_total = total_score(player);

    GameStats {
        original_total,
        player_total,
        original_avg_time: mean_time(original),
        player_avg_time: mean_time(player),
        player_won: player_wins(player_total, original_total),
    }
}

fn total_score(rounds: &[RoundResult]) -> u64 {
    rounds.iter().map(|r| u64::from(r.score)).sum()
}

// Denominator is the round count; callers guarantee it is non-zero.
fn mean_time(rounds: &[RoundResult]) -> f64 {
    let sum: f64 = rounds.iter().map(|r| r.time_taken).sum();
    sum / rounds.len() as f64
}

/// A validated pair of result sets
///
/// Construction checks round alignment once; everything downstream
/// (statistics, per-round comparison, enrichment) can rely on it.
#[derive(Debug, Clone)]
pub struct ChallengeResults {
    original: Arc<ResultSet>,
    player: Arc<ResultSet>,
}

impl ChallengeResults {
    pub fn new(original: ResultSet, player: ResultSet) -> ChallengeResult<Self> {
        Self::from_shared(Arc::new(original), Arc::new(player))
    }

    pub fn from_shared(original: Arc<ResultSet>, player: Arc<ResultSet>) -> ChallengeResult<Self> {
        validate_alignment(original.rounds(), player.rounds())?;
        Ok(Self { original, player })
    }

    pub fn original(&self) -> &Arc<ResultSet> {
        &self.original
    }

    pub fn player(&self) -> &Arc<ResultSet> {
        &self.player
    }

    pub fn round_count(&self) -> usize {
        self.original.len()
    }

    /// Statistics for this pair; never fails once constructed
    pub fn stats(&self) -> GameStats {
        aggregate(self.original.rounds(), self.player.rounds())
    }
}
