#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Temporal, regional, and zone ranking summary types.
//!
//! Every type here is derived from the synthesized users and events and is
//! recomputed on each run. They serialize to camelCase JSON for the report
//! feed.

use location_insights_population_models::{DAYS_PER_WEEK, HOURS_PER_DAY, RegionId};
use serde::{Deserialize, Serialize};
use strum_macros::AsRefStr;

/// The hour-by-weekday cell with the most events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakCell {
    /// Hour of day, 0-23.
    pub hour: u8,
    /// Weekday, Monday = 0.
    pub weekday: u8,
    /// Events in this cell.
    pub count: u64,
}

/// Hour-by-weekday activity for a set of events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalSummary {
    /// `counts[hour][weekday]`.
    pub counts: [[u64; DAYS_PER_WEEK]; HOURS_PER_DAY],
    /// Busiest cell, scanning hours then weekdays and keeping the first
    /// maximum. `None` when there are no events.
    pub peak: Option<PeakCell>,
    /// Busiest hour across all weekdays (lowest hour on ties). `None` when
    /// there are no events.
    pub peak_hour: Option<u8>,
    /// Events flagged as weekend.
    pub weekend_events: u64,
    /// Events not flagged as weekend.
    pub weekday_events: u64,
    /// All events.
    pub total_events: u64,
}

impl TemporalSummary {
    /// An all-zero summary.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            counts: [[0; DAYS_PER_WEEK]; HOURS_PER_DAY],
            peak: None,
            peak_hour: None,
            weekend_events: 0,
            weekday_events: 0,
            total_events: 0,
        }
    }

    /// Events in one cell. Out-of-range indices count as zero.
    #[must_use]
    pub fn count(&self, hour: u8, weekday: u8) -> u64 {
        self.counts
            .get(usize::from(hour))
            .and_then(|row| row.get(usize::from(weekday)))
            .copied()
            .unwrap_or(0)
    }

    /// Row sums: events per hour of day.
    #[must_use]
    pub fn hour_totals(&self) -> [u64; HOURS_PER_DAY] {
        let mut totals = [0; HOURS_PER_DAY];
        for (total, row) in totals.iter_mut().zip(&self.counts) {
            *total = row.iter().sum();
        }
        totals
    }

    /// Column sums: events per weekday.
    #[must_use]
    pub fn weekday_totals(&self) -> [u64; DAYS_PER_WEEK] {
        let mut totals = [0; DAYS_PER_WEEK];
        for row in &self.counts {
            for (total, count) in totals.iter_mut().zip(row) {
                *total += count;
            }
        }
        totals
    }

    /// Number of cells with at least one event.
    #[must_use]
    pub fn nonzero_cells(&self) -> usize {
        self.counts.iter().flatten().filter(|&&c| c > 0).count()
    }
}

impl Default for TemporalSummary {
    fn default() -> Self {
        Self::empty()
    }
}

/// Temporal summary scoped to one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionTemporalSummary {
    pub region: RegionId,
    pub name: String,
    pub summary: TemporalSummary,
}

/// Per-region user and event totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSummary {
    /// Region id within the registry.
    pub region: RegionId,
    /// Region name.
    pub name: String,
    /// Users assigned to the region.
    pub user_count: u64,
    /// Mean user quality score. `None` when the region has no users.
    pub avg_quality: Option<f64>,
    /// Events inherited from the region's users.
    pub event_count: u64,
    /// Mean latitude of the region's users. `None` when it has no users.
    pub mean_lat: Option<f64>,
    /// Mean longitude of the region's users. `None` when it has no users.
    pub mean_lon: Option<f64>,
}

impl RegionSummary {
    /// Average quality, reporting an empty region as zero.
    #[must_use]
    pub fn avg_quality_or_zero(&self) -> f64 {
        self.avg_quality.unwrap_or(0.0)
    }
}

/// Relative weights of the three normalized metrics in the combined score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoreWeights {
    pub users: f64,
    pub events: f64,
    pub quality: f64,
}

impl Default for ScoreWeights {
    /// Equal weighting.
    fn default() -> Self {
        Self {
            users: 1.0,
            events: 1.0,
            quality: 1.0,
        }
    }
}

impl ScoreWeights {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.users + self.events + self.quality
    }
}

/// One region's normalized metrics and combined score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneScore {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub region: RegionId,
    pub name: String,
    pub user_count: u64,
    pub event_count: u64,
    pub avg_quality: Option<f64>,
    /// Min-max normalized user count.
    pub normalized_user_score: f64,
    /// Min-max normalized event count.
    pub normalized_event_score: f64,
    /// Min-max normalized average quality.
    pub normalized_quality_score: f64,
    /// Weighted mean of the normalized scores, in `[0, 1]`.
    pub combined_score: f64,
}

/// All regions ranked by combined score, plus the recommended top-K.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRanking {
    /// Weights the scores were combined with.
    pub weights: ScoreWeights,
    /// Requested size of the recommended set.
    pub top_k: usize,
    /// Every region, descending by combined score, ties by name.
    pub ranked: Vec<ZoneScore>,
}

impl ZoneRanking {
    /// The recommended regions: the first `top_k` of the ranking.
    #[must_use]
    pub fn top(&self) -> &[ZoneScore] {
        &self.ranked[..self.top_k.min(self.ranked.len())]
    }

    /// Whether there were enough regions to fill the top-K.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.ranked.len() >= self.top_k
    }
}

/// A run that completed but whose result is unlikely to be useful as-is.
///
/// These are reported alongside the output, never raised as errors, so the
/// caller can adjust parameters (e.g. widen the clustering radius).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, AsRefStr)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[strum(serialize_all = "snake_case")]
pub enum DegenerateResult {
    /// There were no events to aggregate or cluster.
    NoEvents,
    /// Clustering ran but labeled every point as noise.
    AllNoise {
        /// Points that were clustered.
        points: usize,
        /// Neighborhood radius used.
        eps: f64,
        /// Minimum neighbors used.
        min_samples: usize,
    },
    /// Fewer regions were available than the requested top-K.
    IncompleteRanking {
        /// Requested top-K.
        requested: usize,
        /// Regions actually ranked.
        available: usize,
    },
}

impl std::fmt::Display for DegenerateResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoEvents => write!(f, "no events were generated"),
            Self::AllNoise {
                points,
                eps,
                min_samples,
            } => write!(
                f,
                "all {points} points are noise with eps={eps} and min_samples={min_samples}; \
                 consider a larger eps or a smaller min_samples"
            ),
            Self::IncompleteRanking {
                requested,
                available,
            } => write!(
                f,
                "requested top {requested} zones but only {available} regions were ranked"
            ),
        }
    }
}
