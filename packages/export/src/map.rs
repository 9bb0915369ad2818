//! `GeoJSON` feed for a map renderer.
//!
//! A single feature collection carries three point layers, told apart by
//! each feature's `layer` property:
//!
//! * `region`: one marker per region with users, at the users' mean
//!   position, sized by user count
//! * `density`: every event position, for a heat layer
//! * `hotspot`: one circle per cluster centroid
//!
//! Map-wide settings (center, zoom, heat radius and blur) ride along as
//! foreign members on the collection.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use location_insights_analytics_models::RegionSummary;
use location_insights_population_models::Event;
use location_insights_spatial::HotspotReport;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Visual parameters consumed only by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapStyle {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    /// Heat layer point radius in pixels.
    pub heat_radius: f64,
    /// Heat layer blur in pixels.
    pub heat_blur: f64,
    /// Hotspot circle radius in meters.
    pub hotspot_radius_m: f64,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            center_lat: 20.5937,
            center_lon: 78.9629,
            zoom: 5,
            heat_radius: 10.0,
            heat_blur: 15.0,
            hotspot_radius_m: 50_000.0,
        }
    }
}

/// Region marker radius in pixels: 4 plus one per 30 users.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn marker_radius(user_count: u64) -> f64 {
    4.0 + user_count as f64 / 30.0
}

fn point(lat: f64, lon: f64, properties: serde_json::Value) -> Feature {
    let properties = match properties {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    };
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![lon, lat]))),
        id: None,
        properties,
        foreign_members: None,
    }
}

/// Builds the map feed.
///
/// Regions without users get no marker since they have no mean position.
#[must_use]
pub fn render_map(
    regions: &[RegionSummary],
    events: &[Event],
    hotspots: Option<&HotspotReport>,
    style: &MapStyle,
) -> FeatureCollection {
    let mut features = Vec::with_capacity(regions.len() + events.len());

    for region in regions {
        let (Some(lat), Some(lon)) = (region.mean_lat, region.mean_lon) else {
            continue;
        };
        features.push(point(
            lat,
            lon,
            json!({
                "layer": "region",
                "name": region.name,
                "user_count": region.user_count,
                "event_count": region.event_count,
                "marker_radius": marker_radius(region.user_count),
                "label": format!("{}: {} users", region.name, region.user_count),
            }),
        ));
    }

    for event in events {
        features.push(point(event.lat, event.lon, json!({ "layer": "density" })));
    }

    if let Some(report) = hotspots {
        for cluster in &report.clusters {
            features.push(point(
                cluster.centroid_lat,
                cluster.centroid_lon,
                json!({
                    "layer": "hotspot",
                    "cluster_id": cluster.cluster_id,
                    "member_count": cluster.member_count,
                    "radius_m": style.hotspot_radius_m,
                    "label": format!(
                        "Cluster {} - {} events",
                        cluster.cluster_id, cluster.member_count
                    ),
                }),
            ));
        }
    }

    let mut foreign_members = JsonObject::new();
    foreign_members.insert(
        "center".to_string(),
        json!({ "lat": style.center_lat, "lon": style.center_lon }),
    );
    foreign_members.insert("zoom".to_string(), json!(style.zoom));
    foreign_members.insert(
        "heat".to_string(),
        json!({ "radius": style.heat_radius, "blur": style.heat_blur }),
    );

    log::debug!("Rendered {} map features", features.len());

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use location_insights_population_models::{RegionId, User};
    use location_insights_spatial::{ClusterLabel, ClusterSummary, HotspotParams};

    fn region(index: u32, name: &str, users: u64) -> RegionSummary {
        RegionSummary {
            region: RegionId(index),
            name: name.to_string(),
            user_count: users,
            avg_quality: (users > 0).then_some(0.5),
            event_count: users * 3,
            mean_lat: (users > 0).then_some(19.0),
            mean_lon: (users > 0).then_some(72.8),
        }
    }

    fn layer(feature: &Feature) -> &str {
        feature.properties.as_ref().unwrap()["layer"].as_str().unwrap()
    }

    fn event() -> Event {
        let user = User {
            user_id: 1,
            region: RegionId(0),
            lat: 19.0,
            lon: 72.8,
            quality_score: 0.5,
        };
        let at = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();
        Event::new(&user, 19.01, 72.81, at)
    }

    #[test]
    fn marker_radius_grows_with_users() {
        assert!((marker_radius(0) - 4.0).abs() < f64::EPSILON);
        assert!((marker_radius(60) - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn layers_and_settings() {
        let report = HotspotReport {
            params: HotspotParams::default(),
            labels: vec![ClusterLabel::Cluster(0)],
            clusters: vec![ClusterSummary {
                cluster_id: 0,
                member_count: 1,
                centroid_lat: 19.01,
                centroid_lon: 72.81,
            }],
            noise_count: 0,
        };
        let regions = [region(0, "Mumbai", 90), region(1, "Empty", 0)];
        let map = render_map(&regions, &[event()], Some(&report), &MapStyle::default());

        let layers: Vec<&str> = map.features.iter().map(layer).collect();
        assert_eq!(layers, vec!["region", "density", "hotspot"]);

        let marker = map.features[0].properties.as_ref().unwrap();
        assert_eq!(marker["user_count"], 90);
        assert_eq!(marker["marker_radius"], 7.0);

        let hotspot = map.features[2].properties.as_ref().unwrap();
        assert_eq!(hotspot["radius_m"], 50_000.0);

        let foreign = map.foreign_members.as_ref().unwrap();
        assert_eq!(foreign["heat"]["radius"], 10.0);
        assert_eq!(foreign["heat"]["blur"], 15.0);
        assert_eq!(foreign["zoom"], 5);
    }

    #[test]
    fn coordinates_are_lon_lat() {
        let map = render_map(&[], &[event()], None, &MapStyle::default());
        let geometry = map.features[0].geometry.as_ref().unwrap();
        assert_eq!(geometry.value, Value::Point(vec![72.81, 19.01]));
    }

    #[test]
    fn collection_serializes_with_foreign_members() {
        let map = render_map(&[region(0, "Pune", 3)], &[], None, &MapStyle::default());
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["center"]["lat"], 20.5937);
        assert_eq!(json["features"][0]["properties"]["name"], "Pune");
    }
}
