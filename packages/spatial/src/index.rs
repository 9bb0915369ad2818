//! R-tree over point positions for radius queries.

use location_insights_population_models::LatLon;
use rstar::{RTree, primitives::GeomWithData};

/// A point keyed by `[lon, lat]`, carrying its position in the input.
type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Static spatial index over a slice of points.
///
/// Built once per clustering pass with a bulk load; neighbor lookups return
/// input positions rather than references so callers can keep parallel
/// per-point state in plain vectors.
pub struct PointIndex {
    tree: RTree<IndexedPoint>,
}

impl PointIndex {
    #[must_use]
    pub fn build(points: &[LatLon]) -> Self {
        let entries = points
            .iter()
            .enumerate()
            .map(|(i, p)| GeomWithData::new([p.lon, p.lat], i))
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Input positions of every point within `radius` degrees of `center`
    /// (boundary inclusive), in ascending order.
    #[must_use]
    pub fn within(&self, center: LatLon, radius: f64) -> Vec<usize> {
        let mut found: Vec<usize> = self
            .tree
            .locate_within_distance([center.lon, center.lat], radius * radius)
            .map(|entry| entry.data)
            .collect();
        found.sort_unstable();
        found
    }
}
