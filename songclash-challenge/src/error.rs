//! Error types for songclash-challenge
//!
//! Lookup and enrichment failures live next to the code that raises them
//! ([`crate::lookup::LookupError`], [`crate::enrichment::EnrichError`]).

use songclash_common::TrackId;
use thiserror::Error;
use uuid::Uuid;

/// Rejected challenge input
///
/// Both result sets must be non-empty, of equal length, and play the same
/// track in every round.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    /// No rounds to compare
    #[error("Result sets are empty")]
    EmptyResults,

    /// Players played a different number of rounds
    #[error("Result set length mismatch: original has {original} rounds, player has {player}")]
    LengthMismatch { original: usize, player: usize },

    /// Players faced different tracks in the same round
    #[error("Round {round} is misaligned: original played {original}, player played {player}")]
    RoundMisaligned {
        round: usize,
        original: TrackId,
        player: TrackId,
    },

    /// Track list length differs from the round count
    #[error("Track list has {tracks} entries for {rounds} rounds")]
    TrackListMismatch { rounds: usize, tracks: usize },

    /// Track list was enriched from another result set
    #[error("Track list belongs to result set {actual}, expected {expected}")]
    TrackListForeign { expected: Uuid, actual: Uuid },
}

/// Result type for challenge operations
pub type ChallengeResult<T> = Result<T, ChallengeError>;
