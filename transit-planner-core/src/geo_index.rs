//! Component D — Geo Index: nearest-stops queries by great-circle
//! distance (spec §4.D).

use geo::Point;
use itertools::Itertools;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::model::{Stop, StopId};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance in kilometers between two
/// `(lat, lon)` points, in degrees.
pub fn haversine_km(from: Point<f64>, to: Point<f64>) -> f64 {
    let (lat1, lon1) = (from.y().to_radians(), from.x().to_radians());
    let (lat2, lon2) = (to.y().to_radians(), to.x().to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// A stop indexed for nearest-neighbor queries. Holds just enough to
/// answer a query without borrowing back into the `FeedStore` on every
/// comparison.
#[derive(Debug, Clone)]
struct IndexedStop {
    stop_id: StopId,
    geometry: Point<f64>,
}

impl RTreeObject for IndexedStop {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.geometry.x(), self.geometry.y()])
    }
}

impl PointDistance for IndexedStop {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.geometry.x() - point[0];
        let dy = self.geometry.y() - point[1];
        dx * dx + dy * dy
    }
}

/// Nearest-stop index over all stops in a feed that carry coordinates.
/// An `rstar::RTree` accelerates the search in place of a linear scan.
pub struct GeoIndex {
    tree: RTree<IndexedStop>,
}

impl GeoIndex {
    pub fn build(stops: &[Stop]) -> Self {
        let items = stops
            .iter()
            .filter_map(|s| {
                s.geometry.map(|geometry| IndexedStop {
                    stop_id: s.stop_id.clone(),
                    geometry,
                })
            })
            .collect();
        GeoIndex {
            tree: RTree::bulk_load(items),
        }
    }

    /// The `n` nearest stops to `point`, ordered by ascending great-circle
    /// distance (km), ties broken by `stop_id` ascending (spec §4.D).
    pub fn nearest(&self, point: Point<f64>, n: usize) -> Vec<(StopId, f64)> {
        let query = [point.x(), point.y()];
        // `rstar`'s nearest-neighbor iterator ranks by planar distance,
        // which is a monotonic (though not metrically identical) proxy for
        // great-circle distance at the scale of a nearest-N query; exact
        // Haversine distances are recomputed below for the returned set so
        // reported distances and tie-breaks are always correct.
        let candidates: Vec<&IndexedStop> = self
            .tree
            .nearest_neighbor_iter(&query)
            .take(n.max(1) * 4 + 8)
            .collect();

        candidates
            .into_iter()
            .map(|item| (item.stop_id.clone(), haversine_km(point, item.geometry)))
            .sorted_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            })
            .take(n)
            .collect()
    }

    /// All stops within `radius_km` of `point`, ordered by ascending
    /// distance and capped at `limit` results (spec §4.H step 4).
    pub fn within_radius(
        &self,
        point: Point<f64>,
        radius_km: f64,
        limit: usize,
    ) -> Vec<(StopId, f64)> {
        self.tree
            .iter()
            .filter_map(|item| {
                let d = haversine_km(point, item.geometry);
                (d <= radius_km).then(|| (item.stop_id.clone(), d))
            })
            .sorted_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            })
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_feed;

    #[test]
    fn nearest_is_non_decreasing_and_tie_broken_by_id() {
        let feed = sample_feed();
        let index = GeoIndex::build(feed.stops());
        let dest = Point::new(0.021, 0.0); // (lon, lat)

        let nearest = index.nearest(dest, 4);
        assert_eq!(nearest.len(), 4);
        for pair in nearest.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
        // S3 is nearest to the destination per spec §8.
        assert_eq!(nearest[0].0, "S3");
    }

    #[test]
    fn within_radius_finds_walkable_neighbor() {
        let feed = sample_feed();
        let index = GeoIndex::build(feed.stops());
        let s1 = Point::new(0.0, 0.0);

        let nearby = index.within_radius(s1, 0.5, 20);
        assert!(nearby.iter().any(|(id, _)| id == "W"));
        // The query point itself is always in range at distance 0; callers
        // that need "excluding the source" (spec §4.H step 4) filter it out.
        assert_eq!(nearby[0].0, "S1");
    }
}
