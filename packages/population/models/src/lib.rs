#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region, synthetic user, and behavioral event types.
//!
//! These are the immutable records produced by the synthesizers and read by
//! every analytic stage. Users reference regions by [`RegionId`] (the
//! region's position in the registry) and events reference users by
//! `user_id`, so the whole dataset is plain owned values with no shared
//! mutable state.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Number of hour-of-day buckets.
pub const HOURS_PER_DAY: usize = 24;

/// Number of weekday buckets.
pub const DAYS_PER_WEEK: usize = 7;

/// Weekday indices treated as the weekend (Saturday and Sunday, with
/// Monday = 0).
pub const WEEKEND_DAYS: [u8; 2] = [5, 6];

/// Short weekday labels indexed by weekday number (Monday = 0).
pub const WEEKDAY_LABELS: [&str; DAYS_PER_WEEK] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Returns the weekday index of a timestamp, Monday = 0 through Sunday = 6.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn weekday_index(timestamp: &NaiveDateTime) -> u8 {
    timestamp.weekday().num_days_from_monday() as u8
}

/// Whether a weekday index falls on the weekend.
#[must_use]
pub const fn is_weekend_day(weekday: u8) -> bool {
    weekday == WEEKEND_DAYS[0] || weekday == WEEKEND_DAYS[1]
}

/// Index of a region within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub u32);

impl RegionId {
    /// Returns the registry index as a `usize`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl LatLon {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

fn default_region_weight() -> f64 {
    1.0
}

/// A named geographic area anchoring synthetic users.
///
/// Deserialized from TOML (`[[regions]]` tables) with `name`, `lat`, `lon`
/// and an optional selection `weight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Unique region name (e.g. "Mumbai").
    pub name: String,
    /// Centroid latitude.
    pub lat: f64,
    /// Centroid longitude.
    pub lon: f64,
    /// Relative weight used by weighted user assignment.
    #[serde(default = "default_region_weight")]
    pub weight: f64,
}

impl Region {
    /// Creates a region with the default selection weight.
    #[must_use]
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
            weight: default_region_weight(),
        }
    }

    /// Returns the region's reference centroid.
    #[must_use]
    pub const fn centroid(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }
}

/// A synthetic user placed near its region's centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Sequential identifier, starting at 1.
    pub user_id: u64,
    /// Region the user was assigned to.
    pub region: RegionId,
    /// Jittered latitude.
    pub lat: f64,
    /// Jittered longitude.
    pub lon: f64,
    /// Per-user quality score in `[0, 1]`.
    pub quality_score: f64,
}

impl User {
    #[must_use]
    pub const fn position(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }

    /// Zero-padded display identifier (e.g. `U0042`).
    #[must_use]
    pub fn display_id(&self) -> String {
        format!("U{:04}", self.user_id)
    }
}

/// A single behavioral event emitted by a user.
///
/// `hour`, `weekday` and `is_weekend` are derived from `timestamp` by
/// [`Event::new`] and never set independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Owning user.
    pub user_id: u64,
    /// Region inherited from the owning user.
    pub region: RegionId,
    /// Jittered latitude.
    pub lat: f64,
    /// Jittered longitude.
    pub lon: f64,
    /// Naive local timestamp (no timezone arithmetic is applied).
    pub timestamp: NaiveDateTime,
    /// Hour of day, 0-23.
    pub hour: u8,
    /// Weekday, Monday = 0 through Sunday = 6.
    pub weekday: u8,
    /// Whether `weekday` is Saturday or Sunday.
    pub is_weekend: bool,
}

impl Event {
    /// Creates an event for `user` at the given position and time,
    /// deriving the calendar fields from `timestamp`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(user: &User, lat: f64, lon: f64, timestamp: NaiveDateTime) -> Self {
        let weekday = weekday_index(&timestamp);

        Self {
            user_id: user.user_id,
            region: user.region,
            lat,
            lon,
            hour: timestamp.hour() as u8,
            weekday,
            is_weekend: is_weekend_day(weekday),
            timestamp,
        }
    }

    #[must_use]
    pub const fn position(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 30, 0)
            .unwrap()
    }

    fn user() -> User {
        User {
            user_id: 7,
            region: RegionId(2),
            lat: 10.0,
            lon: 20.0,
            quality_score: 0.5,
        }
    }

    #[test]
    fn event_derives_calendar_fields() {
        // 2024-01-01 is a Monday.
        let monday = Event::new(&user(), 10.0, 20.0, at(2024, 1, 1, 19));
        assert_eq!(monday.hour, 19);
        assert_eq!(monday.weekday, 0);
        assert!(!monday.is_weekend);

        let saturday = Event::new(&user(), 10.0, 20.0, at(2024, 1, 6, 0));
        assert_eq!(saturday.weekday, 5);
        assert!(saturday.is_weekend);

        let sunday = Event::new(&user(), 10.0, 20.0, at(2024, 1, 7, 23));
        assert_eq!(sunday.hour, 23);
        assert_eq!(sunday.weekday, 6);
        assert!(sunday.is_weekend);
    }

    #[test]
    fn event_inherits_user_region() {
        let event = Event::new(&user(), 0.0, 0.0, at(2024, 3, 5, 8));
        assert_eq!(event.user_id, 7);
        assert_eq!(event.region, RegionId(2));
    }

    #[test]
    fn weekend_convention() {
        let weekend: Vec<u8> = (0..7).filter(|&d| is_weekend_day(d)).collect();
        assert_eq!(weekend, WEEKEND_DAYS.to_vec());
    }

    #[test]
    fn display_id_is_zero_padded() {
        assert_eq!(user().display_id(), "U0007");
    }
}
