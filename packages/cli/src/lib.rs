#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Orchestration for the location insights pipeline.
//!
//! Loads a [`config::PipelineConfig`], validates every stage up front, then
//! runs synthesis and analytics in a single pass
//! ([`pipeline::Pipeline::run`]). Results are written to flat files and
//! printed as a console report by the `location_insights` binary.

pub mod config;
pub mod pipeline;
pub mod report;

use location_insights_analytics::AnalyticsError;
use location_insights_export::ExportError;
use location_insights_population::ConfigurationError;
use location_insights_spatial::HotspotError;
use thiserror::Error;

/// Errors that can stop a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid synthesis configuration.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Invalid clustering parameters or input.
    #[error(transparent)]
    Hotspot(#[from] HotspotError),

    /// The generated dataset broke an integrity invariant, or scoring was
    /// misconfigured.
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// Writing results failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file did not parse.
    #[error("Invalid configuration file: {0}")]
    ParseConfig(#[from] toml::de::Error),

    /// The effective configuration could not be rendered as TOML.
    #[error("Failed to serialize configuration: {0}")]
    SerializeConfig(#[from] toml::ser::Error),
}
