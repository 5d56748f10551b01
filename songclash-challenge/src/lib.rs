//! songclash-challenge library interface
//!
//! Compares an original player's round results with a challenger's and
//! enriches the rounds with catalog track metadata.
//!
//! - [`stats`]: totals, average answer times, winner
//! - [`enrichment`]: concurrent all-or-nothing track lookup, request lifecycle
//! - [`comparison`]: per-round rows
//! - [`catalog_client`]: HTTP catalog lookup

pub mod catalog_client;
pub mod comparison;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod lookup;
pub mod report;
pub mod stats;

pub use crate::enrichment::{enrich, EnrichError, EnrichedTrackList, EnrichmentController, EnrichmentState};
pub use crate::error::{ChallengeError, ChallengeResult};
pub use crate::lookup::{LookupError, TrackLookup};
pub use crate::stats::{compute_stats, player_wins, ChallengeResults, GameStats};
