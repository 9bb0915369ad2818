//! Hand-built datasets shared by the unit tests.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use location_insights_population::registry::RegionRegistry;
use location_insights_population_models::{Event, Region, RegionId, User};

pub fn registry() -> RegionRegistry {
    RegionRegistry::new(vec![
        Region::new("Alpha", 10.0, 10.0),
        Region::new("Beta", 20.0, 20.0),
        Region::new("Gamma", 30.0, 30.0),
    ])
    .unwrap()
}

/// Monday 2024-01-01 00:00.
pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// 30 users split evenly across the three regions, quality rising with id.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn users() -> Vec<User> {
    (0..30u64)
        .map(|i| {
            let region = RegionId((i % 3) as u32);
            let base = 10.0 * f64::from(region.0 + 1);
            User {
                user_id: i + 1,
                region,
                lat: base + (i as f64) * 0.001,
                lon: base - (i as f64) * 0.001,
                quality_score: (i as f64) / 30.0,
            }
        })
        .collect()
}

/// Five events per user on Mon, Wed, Fri, Sun and the following Tue, at
/// 17:00 through 21:00.
pub fn events(users: &[User]) -> Vec<Event> {
    users
        .iter()
        .flat_map(|user| {
            (0..5i64).map(move |k| {
                let at = start() + Duration::days(2 * k) + Duration::hours(17 + k);
                Event::new(user, user.lat, user.lon, at)
            })
        })
        .collect()
}
