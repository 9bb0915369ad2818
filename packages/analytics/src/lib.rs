#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Temporal and regional aggregation plus zone scoring.
//!
//! Every function here is a pure read over immutable user and event slices
//! and returns a fresh summary value, so summaries can be recomputed over
//! any subset (a single region, a filtered window) without hidden state.

pub mod regional;
pub mod temporal;
pub mod zones;

#[cfg(test)]
pub(crate) mod fixtures;

use location_insights_population_models::RegionId;
use thiserror::Error;

/// Errors that can occur during aggregation and scoring.
///
/// The data-integrity variants mean the synthesized dataset broke one of
/// its own invariants; nothing is recovered partially.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// An event points at a user that does not exist.
    #[error("Event references unknown user {user_id}")]
    UnknownUser {
        /// The dangling user id.
        user_id: u64,
    },

    /// A user id appears more than once.
    #[error("Duplicate user id {user_id}")]
    DuplicateUser {
        /// The repeated user id.
        user_id: u64,
    },

    /// A user or event points at a region outside the registry.
    #[error("{owner} references region {region} outside the registry")]
    UnknownRegion {
        /// Description of the referencing record (e.g. "user 12").
        owner: String,
        /// The dangling region id.
        region: RegionId,
    },

    /// An event's region differs from its owning user's region.
    #[error(
        "Event for user {user_id} is in {event_region} but the user belongs to {user_region}"
    )]
    RegionMismatch {
        /// Owning user.
        user_id: u64,
        /// Region carried by the event.
        event_region: RegionId,
        /// Region of the owning user.
        user_region: RegionId,
    },

    /// Full coverage was required but a region has no users.
    #[error("Region {name} was never assigned any users")]
    UncoveredRegion {
        /// Name of the empty region.
        name: String,
    },

    /// Score weights are negative, not finite, or all zero.
    #[error("Invalid score weights: {message}")]
    InvalidWeights {
        /// Description of what went wrong.
        message: String,
    },

    /// The recommended set size is zero.
    #[error("top_k must be positive")]
    ZeroTopK,
}
