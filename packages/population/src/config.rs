//! Synthesis parameters for users and events.
//!
//! The user-side types deserialize directly from the `[population]` section
//! of a pipeline config file. [`EventSynthesisConfig`] needs a concrete
//! window, so callers resolve it from their own (optional) bounds.

use std::ops::RangeInclusive;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::ConfigurationError;

/// Default number of synthetic users.
pub const DEFAULT_NUM_USERS: usize = 500;

/// Default user jitter standard deviation, in degrees (~5.5 km).
pub const DEFAULT_USER_JITTER_DEG: f64 = 0.05;

/// Default event jitter standard deviation, in degrees (~1.1 km).
pub const DEFAULT_EVENT_JITTER_DEG: f64 = 0.01;

/// Default length of the historical window, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 60;

/// Hours of day that receive the evening weight.
pub const EVENING_HOURS: RangeInclusive<u32> = 18..=23;

/// Hours of day that receive the overnight weight.
pub const OVERNIGHT_HOURS: RangeInclusive<u32> = 0..=6;

/// How users are distributed across regions.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RegionAssignment {
    /// Each user picks a region uniformly at random.
    #[default]
    Uniform,
    /// Each user picks a region with probability proportional to its weight.
    Weighted,
    /// User `i` goes to region `i mod n`, giving an even split.
    RoundRobin,
}

/// Distribution of per-user quality scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QualityDistribution {
    /// Uniform on `[0, 1)`.
    #[default]
    Uniform,
    /// Normal with the given parameters, clipped to `[0, 1]`.
    ClippedNormal {
        /// Mean of the underlying normal.
        mean: f64,
        /// Standard deviation of the underlying normal.
        std_dev: f64,
    },
}

impl QualityDistribution {
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidQuality`] if the normal
    /// parameters are not finite or the deviation is negative.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match *self {
            Self::Uniform => Ok(()),
            Self::ClippedNormal { mean, std_dev } => {
                if !mean.is_finite() || !std_dev.is_finite() || std_dev < 0.0 {
                    return Err(ConfigurationError::InvalidQuality {
                        message: format!("mean {mean} / std_dev {std_dev}"),
                    });
                }
                Ok(())
            }
        }
    }
}

/// Parameters for [`crate::users::UserSynthesizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSynthesisConfig {
    /// Number of users to generate.
    pub num_users: usize,
    /// Region assignment strategy.
    pub assignment: RegionAssignment,
    /// Standard deviation of the per-axis Gaussian jitter, in degrees.
    pub jitter_deg: f64,
    /// Quality score distribution.
    pub quality: QualityDistribution,
}

impl Default for UserSynthesisConfig {
    fn default() -> Self {
        Self {
            num_users: DEFAULT_NUM_USERS,
            assignment: RegionAssignment::default(),
            jitter_deg: DEFAULT_USER_JITTER_DEG,
            quality: QualityDistribution::default(),
        }
    }
}

impl UserSynthesisConfig {
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for a zero user count, an invalid
    /// jitter, or an invalid quality distribution.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.num_users == 0 {
            return Err(ConfigurationError::ZeroUsers);
        }
        validate_jitter("user", self.jitter_deg)?;
        self.quality.validate()
    }
}

/// How many events each user emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EventCountPolicy {
    /// Every user emits exactly `count` events.
    Fixed {
        /// Events per user.
        count: u32,
    },
    /// Each user emits a uniformly drawn count in `min..=max`.
    Range {
        /// Inclusive lower bound.
        min: u32,
        /// Inclusive upper bound.
        max: u32,
    },
}

impl Default for EventCountPolicy {
    fn default() -> Self {
        Self::Range { min: 10, max: 40 }
    }
}

impl EventCountPolicy {
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidEventCount`] if the policy can
    /// yield zero events or its range is inverted.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match *self {
            Self::Fixed { count } if count == 0 => Err(ConfigurationError::InvalidEventCount {
                message: "fixed count must be positive".to_string(),
            }),
            Self::Range { min, .. } if min == 0 => Err(ConfigurationError::InvalidEventCount {
                message: "range minimum must be positive".to_string(),
            }),
            Self::Range { min, max } if min > max => {
                Err(ConfigurationError::InvalidEventCount {
                    message: format!("range minimum {min} exceeds maximum {max}"),
                })
            }
            _ => Ok(()),
        }
    }

    /// Average events per user, used for capacity hints.
    #[must_use]
    pub const fn expected(&self) -> u32 {
        match *self {
            Self::Fixed { count } => count,
            Self::Range { min, max } => min + max.saturating_sub(min) / 2,
        }
    }
}

/// Relative weights steering event timestamps toward evenings and
/// weekends.
///
/// Hours in [`EVENING_HOURS`] get `evening_weight`, hours in
/// [`OVERNIGHT_HOURS`] get `overnight_weight`, every other hour gets 1.
/// Saturdays and Sundays are multiplied by `weekend_weight`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalBias {
    pub evening_weight: f64,
    pub weekend_weight: f64,
    pub overnight_weight: f64,
}

impl Default for TemporalBias {
    fn default() -> Self {
        Self {
            evening_weight: 3.0,
            weekend_weight: 1.5,
            overnight_weight: 0.25,
        }
    }
}

impl TemporalBias {
    /// No bias: every hour of every day is equally likely.
    #[must_use]
    pub const fn uniform() -> Self {
        Self {
            evening_weight: 1.0,
            weekend_weight: 1.0,
            overnight_weight: 1.0,
        }
    }

    /// Weight of an hour-long bucket starting at `hour` on `weekday`
    /// (Monday = 0).
    #[must_use]
    pub fn weight(&self, hour: u32, weekday: u8) -> f64 {
        let hour_weight = if EVENING_HOURS.contains(&hour) {
            self.evening_weight
        } else if OVERNIGHT_HOURS.contains(&hour) {
            self.overnight_weight
        } else {
            1.0
        };
        let day_weight = if location_insights_population_models::is_weekend_day(weekday) {
            self.weekend_weight
        } else {
            1.0
        };
        hour_weight * day_weight
    }

    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidBias`] if any weight is negative
    /// or not finite.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (name, value) in [
            ("evening_weight", self.evening_weight),
            ("weekend_weight", self.weekend_weight),
            ("overnight_weight", self.overnight_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidBias {
                    message: format!("{name} must be finite and non-negative, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Half-open historical window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    #[must_use]
    pub const fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// The `days`-long window ending at `end`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::WindowOutOfRange`] if the start would
    /// fall outside the representable date range.
    pub fn ending_at(end: NaiveDateTime, days: u32) -> Result<Self, ConfigurationError> {
        end.checked_sub_signed(Duration::days(i64::from(days)))
            .map(|start| Self { start, end })
            .ok_or(ConfigurationError::WindowOutOfRange { anchor: end, days })
    }

    /// The `days`-long window starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::WindowOutOfRange`] if the end would
    /// fall outside the representable date range.
    pub fn starting_at(start: NaiveDateTime, days: u32) -> Result<Self, ConfigurationError> {
        start
            .checked_add_signed(Duration::days(i64::from(days)))
            .map(|end| Self { start, end })
            .ok_or(ConfigurationError::WindowOutOfRange {
                anchor: start,
                days,
            })
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    #[must_use]
    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        *timestamp >= self.start && *timestamp < self.end
    }

    /// # Errors
    ///
    /// Returns [`ConfigurationError::EmptyWindow`] unless `start < end`.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.start >= self.end {
            return Err(ConfigurationError::EmptyWindow {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// Parameters for [`crate::events::EventSynthesizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct EventSynthesisConfig {
    /// Window event timestamps are drawn from.
    pub window: TimeWindow,
    /// Per-user event count policy.
    pub count: EventCountPolicy,
    /// Evening/weekend bias.
    pub bias: TemporalBias,
    /// Standard deviation of the per-axis Gaussian jitter around the
    /// owning user, in degrees.
    pub jitter_deg: f64,
}

impl EventSynthesisConfig {
    /// Config with default count policy, bias and jitter over `window`.
    #[must_use]
    pub fn with_window(window: TimeWindow) -> Self {
        Self {
            window,
            count: EventCountPolicy::default(),
            bias: TemporalBias::default(),
            jitter_deg: DEFAULT_EVENT_JITTER_DEG,
        }
    }

    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for an empty window, an invalid
    /// count policy, invalid bias weights, or an invalid jitter.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.window.validate()?;
        self.count.validate()?;
        self.bias.validate()?;
        validate_jitter("event", self.jitter_deg)
    }
}

/// Checks that a jitter standard deviation is finite and non-negative.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidJitter`] otherwise.
pub fn validate_jitter(name: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigurationError::InvalidJitter { name, value });
    }
    Ok(())
}

/// Checks that events scatter no further from their user than users
/// scatter from their region.
///
/// # Errors
///
/// Returns [`ConfigurationError::EventJitterTooLarge`] if `event > user`.
pub fn validate_jitter_scales(user: f64, event: f64) -> Result<(), ConfigurationError> {
    if event > user {
        return Err(ConfigurationError::EventJitterTooLarge { event, user });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn defaults_are_valid() {
        UserSynthesisConfig::default().validate().unwrap();
        let window = TimeWindow::ending_at(midnight(2025, 3, 1), DEFAULT_WINDOW_DAYS).unwrap();
        EventSynthesisConfig::with_window(window).validate().unwrap();
        validate_jitter_scales(DEFAULT_USER_JITTER_DEG, DEFAULT_EVENT_JITTER_DEG).unwrap();
    }

    #[test]
    fn zero_users_rejected() {
        let config = UserSynthesisConfig {
            num_users: 0,
            ..UserSynthesisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::ZeroUsers)
        ));
    }

    #[test]
    fn count_policy_validation() {
        assert!(EventCountPolicy::Fixed { count: 0 }.validate().is_err());
        assert!(EventCountPolicy::Range { min: 0, max: 3 }.validate().is_err());
        assert!(EventCountPolicy::Range { min: 5, max: 3 }.validate().is_err());
        assert!(EventCountPolicy::Range { min: 3, max: 3 }.validate().is_ok());
        assert!(EventCountPolicy::Fixed { count: 1 }.validate().is_ok());
    }

    #[test]
    fn empty_and_inverted_windows_rejected() {
        let t = midnight(2025, 1, 1);
        assert!(matches!(
            TimeWindow::new(t, t).validate(),
            Err(ConfigurationError::EmptyWindow { .. })
        ));
        assert!(TimeWindow::ending_at(t, 0).unwrap().validate().is_err());
        assert!(TimeWindow::new(midnight(2025, 1, 2), t).validate().is_err());
    }

    #[test]
    fn window_is_half_open() {
        let window = TimeWindow::ending_at(midnight(2025, 1, 11), 10).unwrap();
        assert_eq!(window.start, midnight(2025, 1, 1));
        assert!(window.contains(&midnight(2025, 1, 1)));
        assert!(!window.contains(&midnight(2025, 1, 11)));
        assert_eq!(window.duration(), Duration::days(10));
    }

    #[test]
    fn windows_past_the_calendar_are_rejected() {
        let t = midnight(2025, 1, 1);
        assert!(matches!(
            TimeWindow::ending_at(t, u32::MAX),
            Err(ConfigurationError::WindowOutOfRange { days: u32::MAX, .. })
        ));
        assert!(matches!(
            TimeWindow::starting_at(t, u32::MAX),
            Err(ConfigurationError::WindowOutOfRange { .. })
        ));
        assert_eq!(
            TimeWindow::starting_at(t, 10).unwrap().end,
            midnight(2025, 1, 11)
        );
    }

    #[test]
    fn bias_weights_evenings_and_weekends() {
        let bias = TemporalBias::default();
        assert!((bias.weight(12, 0) - 1.0).abs() < f64::EPSILON);
        assert!((bias.weight(20, 0) - 3.0).abs() < f64::EPSILON);
        assert!((bias.weight(3, 0) - 0.25).abs() < f64::EPSILON);
        assert!((bias.weight(20, 6) - 4.5).abs() < f64::EPSILON);

        let uniform = TemporalBias::uniform();
        for hour in 0..24 {
            for day in 0..7 {
                assert!((uniform.weight(hour, day) - 1.0).abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    fn negative_bias_rejected() {
        let bias = TemporalBias {
            weekend_weight: -0.5,
            ..TemporalBias::default()
        };
        assert!(matches!(
            bias.validate(),
            Err(ConfigurationError::InvalidBias { .. })
        ));
    }

    #[test]
    fn jitter_validation() {
        assert!(validate_jitter("user", -0.1).is_err());
        assert!(validate_jitter("user", f64::INFINITY).is_err());
        assert!(validate_jitter("user", 0.0).is_ok());
        assert!(matches!(
            validate_jitter_scales(0.01, 0.05),
            Err(ConfigurationError::EventJitterTooLarge { .. })
        ));
    }

    #[test]
    fn quality_distribution_validation() {
        let bad = QualityDistribution::ClippedNormal {
            mean: 0.6,
            std_dev: -1.0,
        };
        assert!(bad.validate().is_err());
        let good = QualityDistribution::ClippedNormal {
            mean: 0.6,
            std_dev: 0.15,
        };
        assert!(good.validate().is_ok());
    }

    #[test]
    fn assignment_parses_kebab_case() {
        assert_eq!(
            "round-robin".parse::<RegionAssignment>().unwrap(),
            RegionAssignment::RoundRobin
        );
        assert_eq!(RegionAssignment::Weighted.to_string(), "weighted");
    }
}
