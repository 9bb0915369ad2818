//! Pipeline configuration file.
//!
//! Every field has a default, so an empty file is valid. Sections:
//!
//! ```toml
//! seed = 42
//! timezone = "Asia/Kolkata"
//!
//! [population]
//! num_users = 500
//! assignment = "uniform"
//!
//! [events]
//! days = 60
//! start = "2024-01-01T00:00:00"   # optional
//! count = { type = "range", min = 10, max = 40 }
//!
//! [clustering]
//! eps = 0.5
//! min_samples = 30
//!
//! [scoring]
//! top_k = 5
//! weights = { users = 0.4, events = 0.4, quality = 0.2 }
//!
//! [output]
//! dir = "output"
//!
//! [[regions]]
//! name = "Mumbai"
//! lat = 19.076
//! lon = 72.8777
//! ```

use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, NaiveTime};
use location_insights_analytics::zones::DEFAULT_TOP_K;
use location_insights_analytics_models::ScoreWeights;
use location_insights_export::map::MapStyle;
use location_insights_population::ConfigurationError;
use location_insights_population::config::{
    DEFAULT_EVENT_JITTER_DEG, DEFAULT_WINDOW_DAYS, EventCountPolicy, EventSynthesisConfig,
    TemporalBias, TimeWindow, UserSynthesisConfig,
};
use location_insights_population::registry::RegionRegistry;
use location_insights_population_models::Region;
use location_insights_spatial::{DEFAULT_EPS, DEFAULT_MIN_SAMPLES, HotspotParams};
use serde::{Deserialize, Serialize};

use crate::PipelineError;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Event synthesis settings.
///
/// The window is `[start, end)`. Missing bounds are filled in from `days`:
/// with neither bound the window is the `days` ending at the start of the
/// current day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDateTime>,
    pub days: u32,
    pub jitter_deg: f64,
    pub count: EventCountPolicy,
    pub bias: TemporalBias,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            days: DEFAULT_WINDOW_DAYS,
            jitter_deg: DEFAULT_EVENT_JITTER_DEG,
            count: EventCountPolicy::default(),
            bias: TemporalBias::default(),
        }
    }
}

impl EventsConfig {
    /// Fills in missing window bounds relative to `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::WindowOutOfRange`] if `days` reaches
    /// past the representable date range.
    pub fn resolve_window(&self, now: NaiveDateTime) -> Result<TimeWindow, ConfigurationError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Ok(TimeWindow::new(start, end)),
            (None, Some(end)) => TimeWindow::ending_at(end, self.days),
            (Some(start), None) => TimeWindow::starting_at(start, self.days),
            (None, None) => TimeWindow::ending_at(now.date().and_time(NaiveTime::MIN), self.days),
        }
    }
}

/// Hotspot clustering settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Skip clustering entirely when `false`.
    pub enabled: bool,
    pub eps: f64,
    pub min_samples: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            eps: DEFAULT_EPS,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

impl ClusteringConfig {
    #[must_use]
    pub const fn params(&self) -> HotspotParams {
        HotspotParams {
            eps: self.eps,
            min_samples: self.min_samples,
        }
    }
}

/// Zone scoring settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub top_k: usize,
    /// Fail the run if any region ends up without users.
    pub require_full_coverage: bool,
    pub weights: ScoreWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            require_full_coverage: false,
            weights: ScoreWeights::default(),
        }
    }
}

/// Where results go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Write CSV, JSON and `GeoJSON` files after the run.
    pub export: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            export: true,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Seed for every random draw in the run.
    pub seed: u64,
    /// Timezone label attached to exported users. Never applied to
    /// timestamps.
    pub timezone: String,
    pub population: UserSynthesisConfig,
    pub events: EventsConfig,
    pub clustering: ClusteringConfig,
    pub scoring: ScoringConfig,
    pub map: MapStyle,
    pub output: OutputConfig,
    /// Replaces the embedded region registry when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<Region>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            timezone: DEFAULT_TIMEZONE.to_string(),
            population: UserSynthesisConfig::default(),
            events: EventsConfig::default(),
            clustering: ClusteringConfig::default(),
            scoring: ScoringConfig::default(),
            map: MapStyle::default(),
            output: OutputConfig::default(),
            regions: None,
        }
    }
}

impl PipelineConfig {
    /// # Errors
    ///
    /// Returns [`PipelineError::ParseConfig`] if `text` is not a valid
    /// configuration document.
    pub fn from_toml_str(text: &str) -> Result<Self, PipelineError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::SerializeConfig`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, PipelineError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The configured regions, or the embedded default set.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the configured regions are
    /// invalid.
    pub fn registry(&self) -> Result<RegionRegistry, ConfigurationError> {
        match &self.regions {
            Some(regions) => RegionRegistry::new(regions.clone()),
            None => Ok(RegionRegistry::default_registry()),
        }
    }

    /// Event synthesis parameters with the window resolved against `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the window cannot be resolved.
    pub fn event_config(
        &self,
        now: NaiveDateTime,
    ) -> Result<EventSynthesisConfig, ConfigurationError> {
        Ok(EventSynthesisConfig {
            window: self.events.resolve_window(now)?,
            count: self.events.count,
            bias: self.events.bias,
            jitter_deg: self.events.jitter_deg,
        })
    }
}
