//! CSV rows for users, events, clusters, and zones.
//!
//! Headers are written explicitly so an empty export still carries its
//! column names.

use std::io::Write;

use location_insights_analytics_models::ZoneRanking;
use location_insights_population::registry::RegionRegistry;
use location_insights_population_models::{Event, RegionId, User};
use location_insights_spatial::ClusterSummary;
use serde::Serialize;

use crate::ExportError;

/// Format of `event_time` values.
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const USER_HEADER: [&str; 6] = [
    "user_id",
    "region",
    "lat",
    "lon",
    "timezone_label",
    "quality_score",
];

pub const EVENT_HEADER: [&str; 8] = [
    "user_id",
    "region",
    "lat",
    "lon",
    "event_time",
    "hour",
    "weekday",
    "is_weekend",
];

pub const CLUSTER_HEADER: [&str; 4] = ["cluster_id", "member_count", "centroid_lat", "centroid_lon"];

pub const ZONE_HEADER: [&str; 10] = [
    "rank",
    "region",
    "user_count",
    "event_count",
    "avg_quality",
    "normalized_user_score",
    "normalized_event_score",
    "normalized_quality_score",
    "combined_score",
    "recommended",
];

#[derive(Debug, Serialize)]
struct UserRow<'a> {
    user_id: u64,
    region: &'a str,
    lat: f64,
    lon: f64,
    timezone_label: &'a str,
    quality_score: f64,
}

#[derive(Debug, Serialize)]
struct EventRow<'a> {
    user_id: u64,
    region: &'a str,
    lat: f64,
    lon: f64,
    event_time: String,
    hour: u8,
    weekday: u8,
    is_weekend: bool,
}

#[derive(Debug, Serialize)]
struct ClusterRow {
    cluster_id: u32,
    member_count: usize,
    centroid_lat: f64,
    centroid_lon: f64,
}

#[derive(Debug, Serialize)]
struct ZoneRow<'a> {
    rank: usize,
    region: &'a str,
    user_count: u64,
    event_count: u64,
    avg_quality: f64,
    normalized_user_score: f64,
    normalized_event_score: f64,
    normalized_quality_score: f64,
    combined_score: f64,
    recommended: bool,
}

fn csv_writer<W: Write>(writer: W, header: &[&str]) -> Result<csv::Writer<W>, ExportError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(header)?;
    Ok(csv)
}

fn region_name(registry: &RegionRegistry, region: RegionId) -> Result<&str, ExportError> {
    registry
        .name(region)
        .ok_or(ExportError::UnknownRegion { region })
}

/// Writes one row per user. Returns the number of rows written.
///
/// # Errors
///
/// Returns an [`ExportError`] if a user's region is not in `registry` or
/// writing fails.
pub fn write_users<W: Write>(
    writer: W,
    registry: &RegionRegistry,
    users: &[User],
    timezone: &str,
) -> Result<usize, ExportError> {
    let mut csv = csv_writer(writer, &USER_HEADER)?;
    for user in users {
        csv.serialize(UserRow {
            user_id: user.user_id,
            region: region_name(registry, user.region)?,
            lat: user.lat,
            lon: user.lon,
            timezone_label: timezone,
            quality_score: user.quality_score,
        })?;
    }
    csv.flush()?;
    Ok(users.len())
}

/// Writes one row per event. Returns the number of rows written.
///
/// # Errors
///
/// Returns an [`ExportError`] if an event's region is not in `registry` or
/// writing fails.
pub fn write_events<W: Write>(
    writer: W,
    registry: &RegionRegistry,
    events: &[Event],
) -> Result<usize, ExportError> {
    let mut csv = csv_writer(writer, &EVENT_HEADER)?;
    for event in events {
        csv.serialize(EventRow {
            user_id: event.user_id,
            region: region_name(registry, event.region)?,
            lat: event.lat,
            lon: event.lon,
            event_time: event.timestamp.format(EVENT_TIME_FORMAT).to_string(),
            hour: event.hour,
            weekday: event.weekday,
            is_weekend: event.is_weekend,
        })?;
    }
    csv.flush()?;
    Ok(events.len())
}

/// Writes one row per cluster, in the order given.
///
/// # Errors
///
/// Returns an [`ExportError`] if writing fails.
pub fn write_clusters<W: Write>(
    writer: W,
    clusters: &[ClusterSummary],
) -> Result<usize, ExportError> {
    let mut csv = csv_writer(writer, &CLUSTER_HEADER)?;
    for cluster in clusters {
        csv.serialize(ClusterRow {
            cluster_id: cluster.cluster_id,
            member_count: cluster.member_count,
            centroid_lat: cluster.centroid_lat,
            centroid_lon: cluster.centroid_lon,
        })?;
    }
    csv.flush()?;
    Ok(clusters.len())
}

/// Writes the full ranking, flagging the recommended top-K.
///
/// # Errors
///
/// Returns an [`ExportError`] if writing fails.
pub fn write_zones<W: Write>(writer: W, ranking: &ZoneRanking) -> Result<usize, ExportError> {
    let mut csv = csv_writer(writer, &ZONE_HEADER)?;
    for score in &ranking.ranked {
        csv.serialize(ZoneRow {
            rank: score.rank,
            region: &score.name,
            user_count: score.user_count,
            event_count: score.event_count,
            avg_quality: score.avg_quality.unwrap_or(0.0),
            normalized_user_score: score.normalized_user_score,
            normalized_event_score: score.normalized_event_score,
            normalized_quality_score: score.normalized_quality_score,
            combined_score: score.combined_score,
            recommended: score.rank <= ranking.top_k,
        })?;
    }
    csv.flush()?;
    Ok(ranking.ranked.len())
}
