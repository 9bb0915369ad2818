#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Writes pipeline results to flat files.
//!
//! CSV rows for users, events, clusters and zones, a JSON report, and a
//! `GeoJSON` feature collection for a map renderer. Every writer takes any
//! [`std::io::Write`] so the same code serves files and in-memory buffers.
//! Nothing here runs until all analytics have completed.

pub mod map;
pub mod rows;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use location_insights_population_models::RegionId;
use serde::Serialize;
use thiserror::Error;

pub const USERS_FILE: &str = "users.csv";
pub const EVENTS_FILE: &str = "events.csv";
pub const CLUSTERS_FILE: &str = "clusters.csv";
pub const ZONES_FILE: &str = "zones.csv";
pub const REPORT_FILE: &str = "report.json";
pub const MAP_FILE: &str = "map.geojson";

/// Errors that can occur while exporting.
#[derive(Debug, Error)]
pub enum ExportError {
    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing a CSV record failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serializing JSON failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record references a region the registry does not contain.
    #[error("Cannot export record for unknown region {region}")]
    UnknownRegion {
        /// The dangling region id.
        region: RegionId,
    },
}

/// Directory that receives the exported files.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Creates the directory (and parents) if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the directory cannot be created.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, ExportError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn join(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Opens `name` for buffered writing, truncating any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the file cannot be created.
    pub fn writer(&self, name: &str) -> Result<BufWriter<File>, ExportError> {
        Ok(BufWriter::new(File::create(self.join(name))?))
    }
}

/// Pretty-prints `value` as JSON.
///
/// # Errors
///
/// Returns an [`ExportError`] if serialization or writing fails.
pub fn write_json<W: Write, T: Serialize + ?Sized>(
    mut writer: W,
    value: &T,
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
