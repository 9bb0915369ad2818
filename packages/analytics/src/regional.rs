//! Per-region user counts, quality averages, and event counts.

use std::collections::BTreeMap;

use location_insights_analytics_models::RegionSummary;
use location_insights_population::registry::RegionRegistry;
use location_insights_population_models::{Event, RegionId, User};

use crate::AnalyticsError;

#[derive(Default)]
struct Accumulator {
    users: u64,
    quality_sum: f64,
    lat_sum: f64,
    lon_sum: f64,
    events: u64,
}

fn check_region(
    registry: &RegionRegistry,
    region: RegionId,
    owner: impl FnOnce() -> String,
) -> Result<(), AnalyticsError> {
    if registry.get(region).is_none() {
        return Err(AnalyticsError::UnknownRegion {
            owner: owner(),
            region,
        });
    }
    Ok(())
}

/// Groups users and events by region.
///
/// Returns one summary per registry region in registry order, including
/// regions without users (their averages are `None`). Events are counted
/// under the region they inherited from their user.
///
/// # Errors
///
/// Returns an [`AnalyticsError`] if a user id repeats, a user or event
/// references a region outside the registry, an event references a missing
/// user, or an event's region differs from its user's.
#[allow(clippy::cast_precision_loss)]
pub fn summarize_regions(
    registry: &RegionRegistry,
    users: &[User],
    events: &[Event],
) -> Result<Vec<RegionSummary>, AnalyticsError> {
    let mut acc: Vec<Accumulator> = registry.iter().map(|_| Accumulator::default()).collect();
    let mut user_regions: BTreeMap<u64, RegionId> = BTreeMap::new();

    for user in users {
        check_region(registry, user.region, || format!("user {}", user.user_id))?;
        if user_regions.insert(user.user_id, user.region).is_some() {
            return Err(AnalyticsError::DuplicateUser {
                user_id: user.user_id,
            });
        }

        let slot = &mut acc[user.region.index()];
        slot.users += 1;
        slot.quality_sum += user.quality_score;
        slot.lat_sum += user.lat;
        slot.lon_sum += user.lon;
    }

    for event in events {
        let Some(&user_region) = user_regions.get(&event.user_id) else {
            return Err(AnalyticsError::UnknownUser {
                user_id: event.user_id,
            });
        };
        check_region(registry, event.region, || {
            format!("event of user {}", event.user_id)
        })?;
        if event.region != user_region {
            return Err(AnalyticsError::RegionMismatch {
                user_id: event.user_id,
                event_region: event.region,
                user_region,
            });
        }

        acc[event.region.index()].events += 1;
    }

    let summaries: Vec<RegionSummary> = registry
        .iter()
        .zip(acc)
        .map(|((id, region), acc)| {
            let mean = |sum: f64| (acc.users > 0).then(|| sum / acc.users as f64);
            RegionSummary {
                region: id,
                name: region.name.clone(),
                user_count: acc.users,
                avg_quality: mean(acc.quality_sum),
                event_count: acc.events,
                mean_lat: mean(acc.lat_sum),
                mean_lon: mean(acc.lon_sum),
            }
        })
        .collect();

    log::info!(
        "Summarized {} users and {} events across {} regions",
        users.len(),
        events.len(),
        summaries.len()
    );

    Ok(summaries)
}

/// Fails if any region ended up without users.
///
/// # Errors
///
/// Returns [`AnalyticsError::UncoveredRegion`] naming the first empty
/// region in registry order.
pub fn require_full_coverage(summaries: &[RegionSummary]) -> Result<(), AnalyticsError> {
    match summaries.iter().find(|s| s.user_count == 0) {
        Some(empty) => Err(AnalyticsError::UncoveredRegion {
            name: empty.name.clone(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use location_insights_population_models::Region;

    #[test]
    fn even_split_scenario() {
        let registry = fixtures::registry();
        let users = fixtures::users();
        let events = fixtures::events(&users);
        let summaries = summarize_regions(&registry, &users, &events).unwrap();

        assert_eq!(summaries.len(), 3);
        for summary in &summaries {
            assert_eq!(summary.user_count, 10, "{}", summary.name);
            assert_eq!(summary.event_count, 50, "{}", summary.name);
            let q = summary.avg_quality.unwrap();
            assert!((0.0..=1.0).contains(&q));
        }
        require_full_coverage(&summaries).unwrap();
    }

    #[test]
    fn averages_quality_per_region() {
        let registry = fixtures::registry();
        let users = fixtures::users();
        let summaries = summarize_regions(&registry, &users, &[]).unwrap();

        // Alpha holds ids 1, 4, ..., 28 with quality (id - 1) / 30.
        let expected: f64 = (0..10).map(|k| f64::from(3 * k) / 30.0).sum::<f64>() / 10.0;
        let alpha = summaries[0].avg_quality.unwrap();
        assert!((alpha - expected).abs() < 1e-12, "{alpha} != {expected}");
        assert!(summaries[0].mean_lat.unwrap() > 9.9 && summaries[0].mean_lat.unwrap() < 10.1);
    }

    #[test]
    fn empty_region_reports_none_not_nan() {
        let registry = RegionRegistry::new(vec![
            Region::new("Alpha", 10.0, 10.0),
            Region::new("Beta", 20.0, 20.0),
            Region::new("Gamma", 30.0, 30.0),
            Region::new("Delta", 40.0, 40.0),
        ])
        .unwrap();
        let users = fixtures::users();
        let events = fixtures::events(&users);
        let summaries = summarize_regions(&registry, &users, &events).unwrap();

        let delta = &summaries[3];
        assert_eq!(delta.user_count, 0);
        assert_eq!(delta.event_count, 0);
        assert_eq!(delta.avg_quality, None);
        assert!((delta.avg_quality_or_zero() - 0.0).abs() < f64::EPSILON);
        assert!(delta.mean_lat.is_none());

        assert!(matches!(
            require_full_coverage(&summaries),
            Err(AnalyticsError::UncoveredRegion { name }) if name == "Delta"
        ));
    }

    #[test]
    fn dangling_user_reference_is_an_integrity_error() {
        let registry = fixtures::registry();
        let users = fixtures::users();
        let mut events = fixtures::events(&users);
        events[7].user_id = 999;

        assert!(matches!(
            summarize_regions(&registry, &users, &events),
            Err(AnalyticsError::UnknownUser { user_id: 999 })
        ));
    }

    #[test]
    fn region_outside_registry_is_an_integrity_error() {
        let registry = fixtures::registry();
        let mut users = fixtures::users();
        users[0].region = RegionId(9);

        assert!(matches!(
            summarize_regions(&registry, &users, &[]),
            Err(AnalyticsError::UnknownRegion { region: RegionId(9), .. })
        ));
    }

    #[test]
    fn event_region_must_match_user() {
        let registry = fixtures::registry();
        let users = fixtures::users();
        let mut events = fixtures::events(&users);
        // User 1 lives in Alpha.
        events[0].region = RegionId(2);

        assert!(matches!(
            summarize_regions(&registry, &users, &events),
            Err(AnalyticsError::RegionMismatch { user_id: 1, .. })
        ));
    }

    #[test]
    fn duplicate_user_ids_rejected() {
        let registry = fixtures::registry();
        let mut users = fixtures::users();
        users[1].user_id = users[0].user_id;

        assert!(matches!(
            summarize_regions(&registry, &users, &[]),
            Err(AnalyticsError::DuplicateUser { user_id: 1 })
        ));
    }

    #[test]
    fn recomputing_is_idempotent() {
        let registry = fixtures::registry();
        let users = fixtures::users();
        let events = fixtures::events(&users);
        let first = summarize_regions(&registry, &users, &events).unwrap();
        let second = summarize_regions(&registry, &users, &events).unwrap();
        assert_eq!(first, second);
    }
}
