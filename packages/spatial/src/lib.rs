#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Density-based hotspot detection over event coordinates.
//!
//! Points are indexed in an R-tree keyed by `[lon, lat]` and clustered with
//! DBSCAN: a point with at least `min_samples` points (itself included)
//! within `eps` degrees is a core point, clusters grow outward from core
//! points, and anything unreachable is noise. Distances are planar in
//! degrees, which is adequate at city scale.

pub mod dbscan;
pub mod index;

use location_insights_population_models::LatLon;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use dbscan::HotspotClusterer;
pub use index::PointIndex;

/// Default neighborhood radius in degrees.
pub const DEFAULT_EPS: f64 = 0.5;

/// Default minimum neighborhood size, the point itself included.
pub const DEFAULT_MIN_SAMPLES: usize = 30;

/// Errors that can occur while clustering.
#[derive(Debug, Error)]
pub enum HotspotError {
    /// The neighborhood radius is zero, negative, or not finite.
    #[error("Clustering radius must be positive and finite, got {eps}")]
    InvalidEps {
        /// Offending radius.
        eps: f64,
    },

    /// `min_samples` is zero.
    #[error("min_samples must be at least 1")]
    ZeroMinSamples,

    /// A point has a non-finite coordinate.
    #[error("Point {index} has non-finite coordinates ({lat}, {lon})")]
    NonFinitePoint {
        /// Position of the point in the input.
        index: usize,
        /// Latitude of the point.
        lat: f64,
        /// Longitude of the point.
        lon: f64,
    },
}

/// Cluster assignment for one point.
///
/// Serializes as an integer: `-1` for noise, otherwise the non-negative
/// cluster id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum ClusterLabel {
    Noise,
    Cluster(u32),
}

impl ClusterLabel {
    /// Integer form of the label.
    #[must_use]
    pub fn value(self) -> i64 {
        match self {
            Self::Noise => -1,
            Self::Cluster(id) => i64::from(id),
        }
    }

    #[must_use]
    pub const fn cluster_id(self) -> Option<u32> {
        match self {
            Self::Noise => None,
            Self::Cluster(id) => Some(id),
        }
    }

    #[must_use]
    pub const fn is_noise(self) -> bool {
        matches!(self, Self::Noise)
    }
}

impl From<ClusterLabel> for i64 {
    fn from(label: ClusterLabel) -> Self {
        label.value()
    }
}

impl TryFrom<i64> for ClusterLabel {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value == -1 {
            return Ok(Self::Noise);
        }
        u32::try_from(value)
            .map(Self::Cluster)
            .map_err(|_| format!("invalid cluster label {value}"))
    }
}

impl std::fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Clustering parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HotspotParams {
    /// Neighborhood radius in degrees.
    pub eps: f64,
    /// Minimum points within `eps` for a core point, the point itself
    /// included.
    pub min_samples: usize,
}

impl Default for HotspotParams {
    fn default() -> Self {
        Self {
            eps: DEFAULT_EPS,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

impl HotspotParams {
    /// # Errors
    ///
    /// * [`HotspotError::InvalidEps`] if `eps` is not a positive finite number
    /// * [`HotspotError::ZeroMinSamples`] if `min_samples` is zero
    pub fn validate(&self) -> Result<(), HotspotError> {
        if !self.eps.is_finite() || self.eps <= 0.0 {
            return Err(HotspotError::InvalidEps { eps: self.eps });
        }
        if self.min_samples == 0 {
            return Err(HotspotError::ZeroMinSamples);
        }
        Ok(())
    }
}

/// Size and center of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    pub cluster_id: u32,
    pub member_count: usize,
    pub centroid_lat: f64,
    pub centroid_lon: f64,
}

impl ClusterSummary {
    #[must_use]
    pub const fn centroid(&self) -> LatLon {
        LatLon::new(self.centroid_lat, self.centroid_lon)
    }
}

/// Result of one clustering pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotReport {
    /// Parameters the pass ran with.
    pub params: HotspotParams,
    /// One label per input point, in input order.
    pub labels: Vec<ClusterLabel>,
    /// Clusters by descending member count, ties by cluster id.
    pub clusters: Vec<ClusterSummary>,
    /// Points labeled noise.
    pub noise_count: usize,
}

impl HotspotReport {
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Whether there were points but none of them formed a cluster.
    #[must_use]
    pub fn is_all_noise(&self) -> bool {
        !self.labels.is_empty() && self.clusters.is_empty()
    }
}
