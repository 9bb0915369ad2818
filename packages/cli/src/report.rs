//! Plain-text console report.

use std::io::{self, Write};

use location_insights_population::registry::RegionRegistry;
use location_insights_population_models::WEEKDAY_LABELS;

use crate::pipeline::PipelineReport;

fn weekday_label(weekday: u8) -> &'static str {
    WEEKDAY_LABELS
        .get(usize::from(weekday))
        .copied()
        .unwrap_or("?")
}

/// Writes the full report: regions (busiest first), hourly matrix,
/// clusters, top zones, and any warnings.
///
/// # Errors
///
/// Returns an I/O error if writing to `out` fails.
pub fn render<W: Write>(out: &mut W, report: &PipelineReport) -> io::Result<()> {
    writeln!(
        out,
        "Run: seed {} | {} users | {} events | {} .. {} ({})",
        report.seed,
        report.user_count,
        report.event_count,
        report.window.start,
        report.window.end,
        report.timezone
    )?;

    writeln!(out)?;
    writeln!(out, "=== Users per region ===")?;
    writeln!(
        out,
        "{:<16} {:>7} {:>8} {:>12}",
        "Region", "Users", "Events", "Avg quality"
    )?;
    let mut regions: Vec<_> = report.regions.iter().collect();
    regions.sort_by(|a, b| {
        b.user_count
            .cmp(&a.user_count)
            .then_with(|| a.name.cmp(&b.name))
    });
    for region in regions {
        let quality = region
            .avg_quality
            .map_or_else(|| "-".to_string(), |q| format!("{q:.3}"));
        writeln!(
            out,
            "{:<16} {:>7} {:>8} {:>12}",
            region.name, region.user_count, region.event_count, quality
        )?;
    }

    render_temporal(out, report)?;

    writeln!(out)?;
    writeln!(out, "=== Geographic hotspot clusters ===")?;
    match &report.hotspots {
        None => writeln!(out, "Clustering disabled")?,
        Some(hotspots) if hotspots.clusters.is_empty() => writeln!(
            out,
            "No clusters ({} points, all noise)",
            hotspots.labels.len()
        )?,
        Some(hotspots) => {
            writeln!(
                out,
                "{:>7} {:>8} {:>11} {:>11}",
                "Cluster", "Events", "Lat", "Lon"
            )?;
            for cluster in &hotspots.clusters {
                writeln!(
                    out,
                    "{:>7} {:>8} {:>11.4} {:>11.4}",
                    cluster.cluster_id,
                    cluster.member_count,
                    cluster.centroid_lat,
                    cluster.centroid_lon
                )?;
            }
            writeln!(out, "Noise points: {}", hotspots.noise_count)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "=== Top {} event zones ===", report.zones.top_k)?;
    writeln!(
        out,
        "{:>4} {:<16} {:>7} {:>8} {:>8} {:>7}",
        "Rank", "Region", "Users", "Events", "Quality", "Score"
    )?;
    for zone in report.zones.top() {
        writeln!(
            out,
            "{:>4} {:<16} {:>7} {:>8} {:>8.3} {:>7.3}",
            zone.rank,
            zone.name,
            zone.user_count,
            zone.event_count,
            zone.avg_quality.unwrap_or(0.0),
            zone.combined_score
        )?;
    }

    if !report.warnings.is_empty() {
        writeln!(out)?;
        writeln!(out, "=== Warnings ===")?;
        for warning in &report.warnings {
            writeln!(out, "- {}: {warning}", warning.as_ref())?;
        }
    }

    Ok(())
}

fn render_temporal<W: Write>(out: &mut W, report: &PipelineReport) -> io::Result<()> {
    let temporal = &report.temporal;

    writeln!(out)?;
    writeln!(out, "=== Hourly usage (hour x weekday) ===")?;
    write!(out, "{:>4}", "Hour")?;
    for label in WEEKDAY_LABELS {
        write!(out, " {label:>6}")?;
    }
    writeln!(out)?;
    for (hour, row) in temporal.counts.iter().enumerate() {
        write!(out, "{hour:>4}")?;
        for count in row {
            write!(out, " {count:>6}")?;
        }
        writeln!(out)?;
    }

    if let Some(hour) = temporal.peak_hour {
        let events = temporal.hour_totals()[usize::from(hour)];
        writeln!(out, "Peak hour: {hour:02}:00 ({events} events)")?;
    }
    if let Some(peak) = temporal.peak {
        writeln!(
            out,
            "Busiest slot: {} {:02}:00 ({} events)",
            weekday_label(peak.weekday),
            peak.hour,
            peak.count
        )?;
    }
    writeln!(
        out,
        "Weekend events: {} | Weekday events: {}",
        temporal.weekend_events, temporal.weekday_events
    )?;

    Ok(())
}

/// Lists the regions of `registry`.
///
/// # Errors
///
/// Returns an I/O error if writing to `out` fails.
pub fn render_regions<W: Write>(out: &mut W, registry: &RegionRegistry) -> io::Result<()> {
    writeln!(
        out,
        "{:>3} {:<16} {:>9} {:>9} {:>7}",
        "#", "Region", "Lat", "Lon", "Weight"
    )?;
    for (id, region) in registry.iter() {
        writeln!(
            out,
            "{:>3} {:<16} {:>9.4} {:>9.4} {:>7.2}",
            id.0, region.name, region.lat, region.lon, region.weight
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EventsConfig, PipelineConfig};
    use crate::pipeline::Pipeline;
    use chrono::NaiveDate;
    use location_insights_population::config::EventCountPolicy;
    use location_insights_population_models::Region;

    fn report(min_samples: usize) -> PipelineReport {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut config = PipelineConfig {
            regions: Some(vec![
                Region::new("Alpha", 10.0, 10.0),
                Region::new("Beta", 20.0, 20.0),
            ]),
            events: EventsConfig {
                start: Some(start),
                days: 14,
                count: EventCountPolicy::Fixed { count: 4 },
                ..EventsConfig::default()
            },
            ..PipelineConfig::default()
        };
        config.population.num_users = 20;
        config.clustering.min_samples = min_samples;
        Pipeline::new(config, start).unwrap().run().unwrap().report
    }

    fn rendered(report: &PipelineReport) -> String {
        let mut buf = Vec::new();
        render(&mut buf, report).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn report_has_every_section() {
        let text = rendered(&report(5));

        assert!(text.contains("=== Users per region ==="));
        assert!(text.contains("=== Hourly usage (hour x weekday) ==="));
        assert!(text.contains("Peak hour: "));
        assert!(text.contains("Weekend events: "));
        assert!(text.contains("=== Geographic hotspot clusters ==="));
        assert!(text.contains("=== Top 5 event zones ==="));
        assert!(text.contains("incomplete_ranking"));
        assert!(text.contains("Alpha"));
    }

    #[test]
    fn regions_are_listed_by_user_count() {
        let mut report = report(5);
        report.regions[0].user_count = 1;
        report.regions[1].user_count = 19;
        let text = rendered(&report);

        let alpha = text.find("Alpha").unwrap();
        let beta = text.find("Beta").unwrap();
        assert!(beta < alpha, "busier region should be listed first");
    }

    #[test]
    fn matrix_has_a_row_per_hour() {
        let text = rendered(&report(5));
        let header = text
            .lines()
            .position(|l| l.starts_with("Hour"))
            .unwrap();
        let rows: Vec<&str> = text.lines().skip(header + 1).take(24).collect();
        assert!(rows[0].trim_start().starts_with('0'));
        assert!(rows[23].trim_start().starts_with("23"));
    }

    #[test]
    fn all_noise_is_called_out() {
        let text = rendered(&report(10_000));
        assert!(text.contains("all noise"));
        assert!(text.contains("all_noise"));
    }

    #[test]
    fn region_listing() {
        let mut buf = Vec::new();
        render_regions(&mut buf, &RegionRegistry::default_registry()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 21);
        assert!(text.contains("Mumbai"));
    }
}
