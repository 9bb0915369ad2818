//! Full pipeline: synthesis, aggregation, clustering, scoring, export.
//!
//! [`Pipeline::new`] validates every stage's parameters before anything is
//! generated, so a configuration error never leaves a partial run behind.
//! [`Pipeline::run`] then executes each stage to completion in order over
//! one in-memory dataset, drawing all randomness from a single generator
//! seeded from the configuration.

use std::path::PathBuf;
use std::time::Instant;

use chrono::NaiveDateTime;
use location_insights_analytics::zones::ZoneScorer;
use location_insights_analytics::{regional, temporal};
use location_insights_analytics_models::{
    DegenerateResult, RegionSummary, RegionTemporalSummary, TemporalSummary, ZoneRanking,
};
use location_insights_export::map::render_map;
use location_insights_export::{
    CLUSTERS_FILE, EVENTS_FILE, MAP_FILE, OutputDir, REPORT_FILE, USERS_FILE, ZONES_FILE, rows,
    write_json,
};
use location_insights_population::config::{
    TimeWindow, validate_jitter_scales,
};
use location_insights_population::events::EventSynthesizer;
use location_insights_population::progress::{NullProgress, ProgressCallback};
use location_insights_population::registry::RegionRegistry;
use location_insights_population::users::UserSynthesizer;
use location_insights_population_models::{Event, User};
use location_insights_spatial::{HotspotClusterer, HotspotReport};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::PipelineError;
use crate::config::PipelineConfig;

/// Stages of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Users,
    Events,
    Temporal,
    Regional,
    Hotspots,
    Zones,
}

impl PipelineStage {
    pub const ALL: &[Self] = &[
        Self::Users,
        Self::Events,
        Self::Temporal,
        Self::Regional,
        Self::Hotspots,
        Self::Zones,
    ];

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Users => "Synthesize users",
            Self::Events => "Synthesize events",
            Self::Temporal => "Temporal aggregation",
            Self::Regional => "Regional aggregation",
            Self::Hotspots => "Hotspot clustering",
            Self::Zones => "Zone scoring",
        }
    }
}

/// Everything the analytics produced, without the raw rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub seed: u64,
    pub timezone: String,
    pub window: TimeWindow,
    pub user_count: usize,
    pub event_count: usize,
    pub temporal: TemporalSummary,
    pub region_temporal: Vec<RegionTemporalSummary>,
    pub regions: Vec<RegionSummary>,
    /// `None` when clustering is disabled.
    pub hotspots: Option<HotspotReport>,
    pub zones: ZoneRanking,
    /// Non-fatal conditions the caller may want to act on.
    pub warnings: Vec<DegenerateResult>,
}

/// Generated rows plus the report computed from them.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub users: Vec<User>,
    pub events: Vec<Event>,
    pub report: PipelineReport,
}

/// A validated, ready-to-run pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    registry: RegionRegistry,
    window: TimeWindow,
    synthesizer: EventSynthesizer,
    clusterer: Option<HotspotClusterer>,
    scorer: ZoneScorer,
}

impl Pipeline {
    /// Validates `config`, resolving a default event window against `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] for any invalid region, synthesis,
    /// clustering, or scoring parameter.
    pub fn new(config: PipelineConfig, now: NaiveDateTime) -> Result<Self, PipelineError> {
        let registry = config.registry()?;
        UserSynthesizer::new(&registry, &config.population)?;

        let events = config.event_config(now)?;
        let synthesizer = EventSynthesizer::new(&events)?;
        validate_jitter_scales(config.population.jitter_deg, events.jitter_deg)?;

        let clusterer = if config.clustering.enabled {
            Some(HotspotClusterer::new(config.clustering.params())?)
        } else {
            None
        };
        let scorer = ZoneScorer::new(config.scoring.weights, config.scoring.top_k)?;

        log::debug!(
            "Validated pipeline: seed={} users={} window={} .. {} regions={}",
            config.seed,
            config.population.num_users,
            events.window.start,
            events.window.end,
            registry.len()
        );

        Ok(Self {
            config,
            registry,
            window: events.window,
            synthesizer,
            clusterer,
            scorer,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn window(&self) -> TimeWindow {
        self.window
    }

    /// Runs every stage without progress reporting.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] if the generated data violates an
    /// integrity invariant.
    pub fn run(&self) -> Result<PipelineOutput, PipelineError> {
        self.run_with_progress(&NullProgress, &NullProgress)
    }

    /// Runs every stage, advancing `stages` once per [`PipelineStage`] and
    /// handing `records` to the event synthesizer.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] if the generated data violates an
    /// integrity invariant.
    pub fn run_with_progress(
        &self,
        stages: &dyn ProgressCallback,
        records: &dyn ProgressCallback,
    ) -> Result<PipelineOutput, PipelineError> {
        let started = Instant::now();
        let total = PipelineStage::ALL.len();
        stages.set_total(total as u64);

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut step = 0usize;
        let mut begin = |stage: PipelineStage| {
            step += 1;
            stages.set_message(format!("[{step}/{total}] {}", stage.label()));
            log::info!("[{step}/{total}] {}...", stage.label());
        };

        begin(PipelineStage::Users);
        let users =
            UserSynthesizer::new(&self.registry, &self.config.population)?.generate(&mut rng);
        stages.inc(1);

        begin(PipelineStage::Events);
        let events = self
            .synthesizer
            .generate_with_progress(&users, &mut rng, records);
        stages.inc(1);

        begin(PipelineStage::Temporal);
        let temporal_summary = temporal::summarize(&events);
        let region_temporal = temporal::summarize_by_region(&self.registry, &events);
        stages.inc(1);

        begin(PipelineStage::Regional);
        let regions = regional::summarize_regions(&self.registry, &users, &events)?;
        if self.config.scoring.require_full_coverage {
            regional::require_full_coverage(&regions)?;
        }
        stages.inc(1);

        begin(PipelineStage::Hotspots);
        let hotspots = match &self.clusterer {
            Some(clusterer) => Some(clusterer.cluster_events(&events)?),
            None => {
                log::info!("Hotspot clustering disabled");
                None
            }
        };
        stages.inc(1);

        begin(PipelineStage::Zones);
        let zones = self.scorer.rank(&regions);
        stages.inc(1);

        let warnings = degenerate_results(&events, hotspots.as_ref(), &zones);
        for warning in &warnings {
            log::warn!("{warning}");
        }

        let elapsed = started.elapsed();
        stages.finish(format!("Pipeline finished in {elapsed:.1?}"));
        log::info!(
            "Pipeline finished in {elapsed:.1?}: {} users, {} events, {} warnings",
            users.len(),
            events.len(),
            warnings.len()
        );

        let report = PipelineReport {
            seed: self.config.seed,
            timezone: self.config.timezone.clone(),
            window: self.window,
            user_count: users.len(),
            event_count: events.len(),
            temporal: temporal_summary,
            region_temporal,
            regions,
            hotspots,
            zones,
            warnings,
        };

        Ok(PipelineOutput {
            users,
            events,
            report,
        })
    }

    /// Writes every output file into the configured directory. Returns the
    /// paths written.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] if a file cannot be created or written.
    pub fn export(&self, output: &PipelineOutput) -> Result<Vec<PathBuf>, PipelineError> {
        let dir = OutputDir::create(&self.config.output.dir)?;
        let report = &output.report;

        let users = rows::write_users(
            dir.writer(USERS_FILE)?,
            &self.registry,
            &output.users,
            &self.config.timezone,
        )?;
        let events = rows::write_events(dir.writer(EVENTS_FILE)?, &self.registry, &output.events)?;
        let clusters = rows::write_clusters(
            dir.writer(CLUSTERS_FILE)?,
            report
                .hotspots
                .as_ref()
                .map_or(&[][..], |h| h.clusters.as_slice()),
        )?;
        let zones = rows::write_zones(dir.writer(ZONES_FILE)?, &report.zones)?;
        write_json(dir.writer(REPORT_FILE)?, report)?;

        let map = render_map(
            &report.regions,
            &output.events,
            report.hotspots.as_ref(),
            &self.config.map,
        );
        write_json(dir.writer(MAP_FILE)?, &map)?;

        log::info!(
            "Exported {users} users, {events} events, {clusters} clusters and {zones} zones to {}",
            dir.path().display()
        );

        Ok([
            USERS_FILE,
            EVENTS_FILE,
            CLUSTERS_FILE,
            ZONES_FILE,
            REPORT_FILE,
            MAP_FILE,
        ]
        .iter()
        .map(|name| dir.join(name))
        .collect())
    }
}

/// Collects the non-fatal conditions of a finished run.
#[must_use]
pub fn degenerate_results(
    events: &[Event],
    hotspots: Option<&HotspotReport>,
    zones: &ZoneRanking,
) -> Vec<DegenerateResult> {
    let mut warnings = Vec::new();

    if events.is_empty() {
        warnings.push(DegenerateResult::NoEvents);
    }

    if let Some(report) = hotspots.filter(|r| r.is_all_noise()) {
        warnings.push(DegenerateResult::AllNoise {
            points: report.labels.len(),
            eps: report.params.eps,
            min_samples: report.params.min_samples,
        });
    }

    if !zones.is_complete() {
        warnings.push(DegenerateResult::IncompleteRanking {
            requested: zones.top_k,
            available: zones.ranked.len(),
        });
    }

    warnings
}
