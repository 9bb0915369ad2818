//! Behavioral events biased toward evenings and weekends.
//!
//! The window is cut into hour-aligned buckets (clipped at both ends), each
//! weighted by [`TemporalBias::weight`]. A timestamp is drawn by picking a
//! bucket from a [`WeightedIndex`] and then a uniform second offset inside
//! it, so every draw costs the same and always lands inside the window.

use chrono::{Duration, NaiveDateTime, Timelike};
use location_insights_population_models::{Event, User, weekday_index};
use rand::Rng;
use rand::distr::weighted::WeightedIndex;
use rand_distr::Distribution;

use crate::ConfigurationError;
use crate::config::{EventCountPolicy, EventSynthesisConfig, TemporalBias, TimeWindow};
use crate::jitter::Jitter;
use crate::progress::{NullProgress, ProgressCallback};

/// A slice of the window inside a single clock hour.
#[derive(Debug, Clone, Copy)]
struct HourBucket {
    start: NaiveDateTime,
    span_secs: i64,
}

/// Splits `window` into hour-aligned buckets and weights each one.
///
/// Buckets shorter than one second are dropped since no whole-second
/// timestamp fits in them.
fn hour_buckets(window: &TimeWindow, bias: &TemporalBias) -> (Vec<HourBucket>, Vec<f64>) {
    let mut buckets = Vec::new();
    let mut weights = Vec::new();

    let mut cursor = window
        .start
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(window.start);

    while cursor < window.end {
        let next = cursor + Duration::hours(1);
        let lo = cursor.max(window.start);
        let hi = next.min(window.end);
        let span_secs = (hi - lo).num_seconds();

        if span_secs > 0 {
            buckets.push(HourBucket { start: lo, span_secs });
            weights.push(bias.weight(cursor.hour(), weekday_index(&cursor)));
        }

        cursor = next;
    }

    (buckets, weights)
}

/// Generates events for a set of users.
pub struct EventSynthesizer {
    count: EventCountPolicy,
    buckets: Vec<HourBucket>,
    picker: WeightedIndex<f64>,
    jitter: Jitter,
}

impl EventSynthesizer {
    /// Validates `config` and precomputes the weighted hour buckets.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the config is invalid, the window
    /// is shorter than one second, or the bias gives every bucket in the
    /// window zero weight.
    pub fn new(config: &EventSynthesisConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let (buckets, weights) = hour_buckets(&config.window, &config.bias);
        if buckets.is_empty() {
            return Err(ConfigurationError::EmptyWindow {
                start: config.window.start,
                end: config.window.end,
            });
        }

        let picker = WeightedIndex::new(&weights).map_err(|e| ConfigurationError::InvalidBias {
            message: format!("no hour in the window can be sampled: {e}"),
        })?;

        log::debug!(
            "Event window {} .. {} split into {} hour buckets",
            config.window.start,
            config.window.end,
            buckets.len()
        );

        Ok(Self {
            count: config.count,
            buckets,
            picker,
            jitter: Jitter::new("event", config.jitter_deg)?,
        })
    }

    fn draw_count<R: Rng>(&self, rng: &mut R) -> u32 {
        match self.count {
            EventCountPolicy::Fixed { count } => count,
            EventCountPolicy::Range { min, max } => rng.random_range(min..=max),
        }
    }

    fn draw_timestamp<R: Rng>(&self, rng: &mut R) -> NaiveDateTime {
        let bucket = self.buckets[self.picker.sample(rng)];
        bucket.start + Duration::seconds(rng.random_range(0..bucket.span_secs))
    }

    /// Generates events for every user, in user order.
    ///
    /// Per user the count is drawn first; per event the timestamp is drawn
    /// before the latitude and longitude jitter.
    pub fn generate<R: Rng>(&self, users: &[User], rng: &mut R) -> Vec<Event> {
        self.generate_with_progress(users, rng, &NullProgress)
    }

    /// Same as [`Self::generate`], advancing `progress` once per user.
    pub fn generate_with_progress<R: Rng>(
        &self,
        users: &[User],
        rng: &mut R,
        progress: &dyn ProgressCallback,
    ) -> Vec<Event> {
        let expected = users.len() * self.count.expected() as usize;
        let mut events = Vec::with_capacity(expected);

        progress.set_total(users.len() as u64);
        progress.set_message("Generating events".to_string());

        for user in users {
            let count = self.draw_count(rng);
            for _ in 0..count {
                let timestamp = self.draw_timestamp(rng);
                let position = self.jitter.apply(user.position(), rng);
                events.push(Event::new(user, position.lat, position.lon, timestamp));
            }
            progress.inc(1);
        }

        progress.finish(format!("Generated {} events", events.len()));
        log::info!(
            "Generated {} events for {} users",
            events.len(),
            users.len()
        );

        events
    }
}
