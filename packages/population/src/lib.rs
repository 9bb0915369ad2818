#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region registry and seeded synthesis of users and behavioral events.
//!
//! The [`registry::RegionRegistry`] holds the fixed set of regions for a
//! run. [`users::UserSynthesizer`] places users around region centroids and
//! [`events::EventSynthesizer`] emits events for each user, biased toward
//! evenings and weekends.
//!
//! All randomness comes from a caller-owned generator passed to each
//! `generate` call, so the same seed and configuration always reproduce the
//! same dataset.

pub mod config;
pub mod events;
pub mod jitter;
pub mod progress;
pub mod registry;
pub mod users;

use chrono::NaiveDateTime;
use thiserror::Error;

pub use location_insights_population_models as models;

/// Invalid synthesis configuration.
///
/// Always raised before any data is generated.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No regions were configured.
    #[error("Region registry is empty")]
    EmptyRegistry,

    /// Two regions share a name.
    #[error("Duplicate region name: {name}")]
    DuplicateRegion {
        /// The repeated name.
        name: String,
    },

    /// More regions than a [`models::RegionId`] can address.
    #[error("Too many regions: {count}")]
    TooManyRegions {
        /// Number of regions supplied.
        count: usize,
    },

    /// A region name is blank.
    #[error("Region at position {index} has an empty name")]
    UnnamedRegion {
        /// Position within the region list.
        index: usize,
    },

    /// A region centroid lies outside valid coordinate ranges.
    #[error("Region {name} has invalid centroid ({lat}, {lon})")]
    InvalidCentroid {
        /// Region name.
        name: String,
        /// Offending latitude.
        lat: f64,
        /// Offending longitude.
        lon: f64,
    },

    /// A region selection weight is negative or not finite.
    #[error("Region {name} has invalid weight {weight}")]
    InvalidRegionWeight {
        /// Region name.
        name: String,
        /// Offending weight.
        weight: f64,
    },

    /// Weighted assignment has no region with a positive weight.
    #[error("Region weights cannot be used for weighted assignment: {message}")]
    UnusableRegionWeights {
        /// Description of what went wrong.
        message: String,
    },

    /// Region definitions could not be parsed.
    #[error("Failed to parse region definitions: {0}")]
    ParseRegions(#[from] toml::de::Error),

    /// The requested user count is zero.
    #[error("Number of users must be positive")]
    ZeroUsers,

    /// The per-user event count policy cannot produce a positive count.
    #[error("Invalid event count policy: {message}")]
    InvalidEventCount {
        /// Description of what went wrong.
        message: String,
    },

    /// The historical window has no duration.
    #[error("Time window is empty: start {start} is not before end {end}")]
    EmptyWindow {
        /// Window start.
        start: NaiveDateTime,
        /// Window end (exclusive).
        end: NaiveDateTime,
    },

    /// A window length runs past the representable date range.
    #[error("Time window of {days} days from {anchor} is out of range")]
    WindowOutOfRange {
        /// The fixed bound the window was measured from.
        anchor: NaiveDateTime,
        /// Requested length in days.
        days: u32,
    },

    /// A jitter magnitude is negative or not finite.
    #[error("Invalid {name} jitter {value}: must be finite and non-negative")]
    InvalidJitter {
        /// Which jitter was rejected ("user" or "event").
        name: &'static str,
        /// Offending standard deviation.
        value: f64,
    },

    /// Event jitter would scatter events further than users are scattered.
    #[error("Event jitter {event} must not exceed user jitter {user}")]
    EventJitterTooLarge {
        /// Event jitter standard deviation.
        event: f64,
        /// User jitter standard deviation.
        user: f64,
    },

    /// Temporal bias weights are unusable.
    #[error("Invalid temporal bias: {message}")]
    InvalidBias {
        /// Description of what went wrong.
        message: String,
    },

    /// Quality score distribution parameters are unusable.
    #[error("Invalid quality distribution: {message}")]
    InvalidQuality {
        /// Description of what went wrong.
        message: String,
    },
}
