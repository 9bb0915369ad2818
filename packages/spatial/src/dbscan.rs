//! DBSCAN over event coordinates.
//!
//! Points are visited in input order and clusters are numbered from 0 in
//! the order they are discovered. Expansion is breadth-first with each
//! neighborhood taken in ascending input order, and a border point
//! reachable from several clusters stays with the first one that reached
//! it. Together these make the labeling a pure function of the input
//! sequence and parameters.

use std::collections::VecDeque;

use geo::{Centroid, MultiPoint, Point};
use location_insights_population_models::{Event, LatLon};

use crate::{ClusterLabel, ClusterSummary, HotspotError, HotspotParams, HotspotReport, PointIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unvisited,
    Noise,
    Member(u32),
}

/// Validated clustering parameters.
#[derive(Debug, Clone, Copy)]
pub struct HotspotClusterer {
    params: HotspotParams,
}

impl HotspotClusterer {
    /// # Errors
    ///
    /// Returns a [`HotspotError`] if the parameters are invalid.
    pub fn new(params: HotspotParams) -> Result<Self, HotspotError> {
        params.validate()?;
        Ok(Self { params })
    }

    #[must_use]
    pub const fn params(&self) -> HotspotParams {
        self.params
    }

    /// Clusters event positions, one label per event in input order.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::NonFinitePoint`] if an event has a
    /// non-finite coordinate.
    pub fn cluster_events(&self, events: &[Event]) -> Result<HotspotReport, HotspotError> {
        let points: Vec<LatLon> = events.iter().map(Event::position).collect();
        self.cluster(&points)
    }

    /// Clusters `points`, one label per point in input order.
    ///
    /// # Errors
    ///
    /// Returns [`HotspotError::NonFinitePoint`] if a point has a non-finite
    /// coordinate.
    pub fn cluster(&self, points: &[LatLon]) -> Result<HotspotReport, HotspotError> {
        if let Some((index, p)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| !p.lat.is_finite() || !p.lon.is_finite())
        {
            return Err(HotspotError::NonFinitePoint {
                index,
                lat: p.lat,
                lon: p.lon,
            });
        }

        log::debug!(
            "Clustering {} points with eps={} min_samples={}",
            points.len(),
            self.params.eps,
            self.params.min_samples
        );

        let index = PointIndex::build(points);
        let states = self.label(points, &index);

        let labels: Vec<ClusterLabel> = states
            .iter()
            .map(|state| match state {
                State::Member(id) => ClusterLabel::Cluster(*id),
                State::Unvisited | State::Noise => ClusterLabel::Noise,
            })
            .collect();
        let noise_count = labels.iter().filter(|l| l.is_noise()).count();
        let clusters = summarize(points, &labels);

        if clusters.is_empty() && !points.is_empty() {
            log::warn!(
                "All {} points are noise (eps={}, min_samples={})",
                points.len(),
                self.params.eps,
                self.params.min_samples
            );
        } else {
            log::info!(
                "Found {} hotspots, {noise_count} of {} points are noise",
                clusters.len(),
                points.len()
            );
        }

        Ok(HotspotReport {
            params: self.params,
            labels,
            clusters,
            noise_count,
        })
    }

    fn label(&self, points: &[LatLon], index: &PointIndex) -> Vec<State> {
        let eps = self.params.eps;
        let min_samples = self.params.min_samples;

        let mut states = vec![State::Unvisited; points.len()];
        let mut next_id: u32 = 0;
        let mut queue = VecDeque::new();

        for start in 0..points.len() {
            if states[start] != State::Unvisited {
                continue;
            }

            let neighbors = index.within(points[start], eps);
            if neighbors.len() < min_samples {
                states[start] = State::Noise;
                continue;
            }

            let id = next_id;
            next_id += 1;
            states[start] = State::Member(id);
            claim(&mut states, &neighbors, id, &mut queue);

            while let Some(current) = queue.pop_front() {
                let neighbors = index.within(points[current], eps);
                if neighbors.len() >= min_samples {
                    claim(&mut states, &neighbors, id, &mut queue);
                }
            }
        }

        states
    }
}

/// Adds unclaimed neighbors to cluster `id`. Unvisited ones are queued for
/// expansion; points already known to be noise become border points.
fn claim(states: &mut [State], neighbors: &[usize], id: u32, queue: &mut VecDeque<usize>) {
    for &n in neighbors {
        match states[n] {
            State::Unvisited => {
                states[n] = State::Member(id);
                queue.push_back(n);
            }
            State::Noise => states[n] = State::Member(id),
            State::Member(_) => {}
        }
    }
}

fn summarize(points: &[LatLon], labels: &[ClusterLabel]) -> Vec<ClusterSummary> {
    let mut members: Vec<Vec<Point<f64>>> = Vec::new();
    for (p, label) in points.iter().zip(labels) {
        if let Some(id) = label.cluster_id() {
            let id = id as usize;
            if members.len() <= id {
                members.resize_with(id + 1, Vec::new);
            }
            members[id].push(Point::new(p.lon, p.lat));
        }
    }

    let mut clusters: Vec<ClusterSummary> = members
        .into_iter()
        .zip(0u32..)
        .filter_map(|(cluster, cluster_id)| {
            let member_count = cluster.len();
            let centroid = MultiPoint::new(cluster).centroid()?;
            Some(ClusterSummary {
                cluster_id,
                member_count,
                centroid_lat: centroid.y(),
                centroid_lon: centroid.x(),
            })
        })
        .collect();

    clusters.sort_by(|a, b| {
        b.member_count
            .cmp(&a.member_count)
            .then(a.cluster_id.cmp(&b.cluster_id))
    });
    clusters
}
