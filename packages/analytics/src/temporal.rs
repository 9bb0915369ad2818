//! Hour-by-weekday activity aggregation.

use location_insights_analytics_models::{PeakCell, RegionTemporalSummary, TemporalSummary};
use location_insights_population::registry::RegionRegistry;
use location_insights_population_models::Event;

/// Builds the 24x7 activity matrix for `events`.
///
/// The weekend split uses each event's own `is_weekend` flag. The peak
/// cell is the first maximum scanning hour 0-23, then weekday 0-6 within
/// each hour.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn summarize<'a>(events: impl IntoIterator<Item = &'a Event>) -> TemporalSummary {
    let mut summary = TemporalSummary::empty();

    for event in events {
        let Some(cell) = summary
            .counts
            .get_mut(usize::from(event.hour))
            .and_then(|row| row.get_mut(usize::from(event.weekday)))
        else {
            log::warn!(
                "Skipping event for user {} with invalid hour {} / weekday {}",
                event.user_id,
                event.hour,
                event.weekday
            );
            continue;
        };
        *cell += 1;

        summary.total_events += 1;
        if event.is_weekend {
            summary.weekend_events += 1;
        } else {
            summary.weekday_events += 1;
        }
    }

    let mut peak: Option<PeakCell> = None;
    for (hour, row) in summary.counts.iter().enumerate() {
        for (weekday, &count) in row.iter().enumerate() {
            if count > 0 && peak.is_none_or(|p| count > p.count) {
                peak = Some(PeakCell {
                    hour: hour as u8,
                    weekday: weekday as u8,
                    count,
                });
            }
        }
    }
    summary.peak = peak;

    let mut peak_hour: Option<(u8, u64)> = None;
    for (hour, &total) in summary.hour_totals().iter().enumerate() {
        if total > 0 && peak_hour.is_none_or(|(_, best)| total > best) {
            peak_hour = Some((hour as u8, total));
        }
    }
    summary.peak_hour = peak_hour.map(|(hour, _)| hour);

    summary
}

/// One summary per registry region, in registry order.
///
/// Events whose region is outside the registry are ignored here; the
/// regional aggregator reports them as integrity errors.
#[must_use]
pub fn summarize_by_region(registry: &RegionRegistry, events: &[Event]) -> Vec<RegionTemporalSummary> {
    registry
        .iter()
        .map(|(id, region)| RegionTemporalSummary {
            region: id,
            name: region.name.clone(),
            summary: summarize(events.iter().filter(|e| e.region == id)),
        })
        .collect()
}
