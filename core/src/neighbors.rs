//! Hex adjacency over irregular polygons.
//!
//! Cells are matched by the surface distance between their centroids: a pair
//! is adjacent when the distance falls inside one of two bands centered on
//! the nominal flat-top pitches. A uniform spatial hash keeps the candidate
//! set for each cell to its own bucket and the eight around it.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// Accepted centroid distances, in meters.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceBands {
    pub horizontal: (f64, f64),
    pub diagonal: (f64, f64),
}

impl DistanceBands {
    pub fn new(config: &NeighborConfig) -> Self {
        let d_horiz = 0.75 * config.spacing.horizontal;
        let d_diag = config.spacing.vertical;
        let tol = config.tolerance;
        Self {
            horizontal: (d_horiz * (1.0 - tol), d_horiz * (1.0 + tol)),
            diagonal: (d_diag * (1.0 - tol), d_diag * (1.0 + tol)),
        }
    }

    pub fn accepts(&self, distance: f64) -> bool {
        let within = |(min, max): (f64, f64)| distance >= min && distance <= max;
        within(self.horizontal) || within(self.diagonal)
    }

    /// Largest distance either band accepts.
    pub fn reach(&self) -> f64 {
        self.horizontal.1.max(self.diagonal.1)
    }
}

type BucketKey = (i64, i64);

/// Uniform grid of buckets over centroid coordinates.
#[derive(Clone, Debug)]
pub struct SpatialHash {
    bucket_size: f64,
    buckets: HashMap<BucketKey, Vec<CellId>>,
}

impl SpatialHash {
    pub fn new(bucket_size: f64) -> Self {
        Self {
            bucket_size,
            buckets: HashMap::new(),
        }
    }

    pub fn from_points(points: &[Point], bucket_size: f64) -> Self {
        let mut hash = Self::new(bucket_size);
        for (id, &p) in points.iter().enumerate() {
            hash.insert(id, p);
        }
        hash
    }

    fn key(&self, p: Point) -> BucketKey {
        (
            (p.lat() / self.bucket_size).floor() as i64,
            (p.lon() / self.bucket_size).floor() as i64,
        )
    }

    pub fn insert(&mut self, id: CellId, p: Point) {
        let key = self.key(p);
        self.buckets.entry(key).or_default().push(id);
    }

    /// Every id in the bucket of `p` and the eight buckets around it, `p`'s own id included.
    pub fn candidates(&self, p: Point) -> impl Iterator<Item = CellId> + '_ {
        let (i, j) = self.key(p);
        (-1..=1)
            .flat_map(move |di| {
                (-1..=1).map(move |dj| (i.saturating_add(di), j.saturating_add(dj)))
            })
            .filter_map(|key| self.buckets.get(&key))
            .flatten()
            .copied()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

/// Undirected adjacency over cell ids, stored as one sorted list per cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NeighborGraph {
    lists: Vec<NeighborList>,
}

impl NeighborGraph {
    /// Builds the adjacency graph of lon/lat centroids.
    ///
    /// Each unordered pair is tested once and recorded on both sides, so the
    /// result is symmetric even where the distance evaluated from either end
    /// would differ in the last bit.
    pub fn build(centroids: &[Point], config: &NeighborConfig) -> Self {
        let started = Instant::now();
        let bands = DistanceBands::new(config);
        check_bucket_reach(centroids, config.bucket_size, &bands);

        let hash = SpatialHash::from_points(centroids, config.bucket_size);
        let mut lists = vec![NeighborList::new(); centroids.len()];

        for (a, &pa) in centroids.iter().enumerate() {
            for b in hash.candidates(pa) {
                if b <= a {
                    continue;
                }
                if bands.accepts(great_circle_distance(pa, centroids[b])) {
                    lists[a].push(b);
                    lists[b].push(a);
                }
            }
        }
        for list in &mut lists {
            list.sort_unstable();
        }

        let graph = Self { lists };
        let isolated = graph.lists.iter().filter(|l| l.is_empty()).count();
        log::debug!(
            "neighbor graph: {} cells, {} edges, {} isolated, {} buckets, built in {:?}",
            graph.len(),
            graph.edge_count(),
            isolated,
            hash.bucket_count(),
            started.elapsed()
        );
        graph
    }

    /// Graph over `len` cells from an explicit edge list. Self-loops and
    /// repeated edges are dropped.
    ///
    /// # Panics
    ///
    /// Panics if an edge names a cell id not below `len`.
    pub fn from_edges(len: usize, edges: &[(CellId, CellId)]) -> Self {
        let mut lists = vec![NeighborList::new(); len];
        for &(a, b) in edges {
            if a == b || lists[a].contains(&b) {
                continue;
            }
            lists[a].push(b);
            lists[b].push(a);
        }
        for list in &mut lists {
            list.sort_unstable();
        }
        Self { lists }
    }

    pub(crate) fn from_lists(lists: Vec<NeighborList>) -> Self {
        Self { lists }
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn neighbors(&self, id: CellId) -> &[CellId] {
        &self.lists[id]
    }

    pub fn edge_count(&self) -> usize {
        self.lists.iter().map(|l| l.len()).sum::<usize>() / 2
    }

    pub fn is_symmetric(&self) -> bool {
        self.lists
            .iter()
            .enumerate()
            .all(|(a, list)| list.iter().all(|&b| self.lists[b].contains(&a)))
    }

    pub fn has_self_loops(&self) -> bool {
        self.lists
            .iter()
            .enumerate()
            .any(|(a, list)| list.contains(&a))
    }

    /// `histogram[d]` is the number of cells with exactly `d` neighbors.
    pub fn degree_histogram(&self) -> Vec<usize> {
        let max = self.lists.iter().map(|l| l.len()).max().unwrap_or(0);
        let mut histogram = vec![0; max + 1];
        for list in &self.lists {
            histogram[list.len()] += 1;
        }
        histogram
    }

    pub(crate) fn into_lists(self) -> Vec<NeighborList> {
        self.lists
    }
}

/// Distance in meters from each centroid to its closest hashed candidate,
/// `None` when no other centroid shares the surrounding buckets.
pub fn nearest_distances(centroids: &[Point], bucket_size: f64) -> Vec<Option<f64>> {
    let hash = SpatialHash::from_points(centroids, bucket_size);
    centroids
        .iter()
        .enumerate()
        .map(|(a, &pa)| {
            hash.candidates(pa)
                .filter(|&b| b != a)
                .map(|b| great_circle_distance(pa, centroids[b]))
                .reduce(f64::min)
        })
        .collect()
}

/// Warns when a bucket is narrower than the widest band, since real
/// neighbors could then sit two buckets away and be missed.
fn check_bucket_reach(centroids: &[Point], bucket_size: f64, bands: &DistanceBands) {
    if centroids.is_empty() {
        return;
    }
    let mean_lat = centroids.iter().map(|p| p.lat()).sum::<f64>() / centroids.len() as f64;
    let meters_per_degree = EARTH_RADIUS_M * 1.0_f64.to_radians();
    let narrowest = bucket_size * meters_per_degree * mean_lat.to_radians().cos().abs();
    if narrowest < bands.reach() {
        log::warn!(
            "spatial hash bucket spans only {narrowest:.0} m but neighbors may be up to {:.0} m apart",
            bands.reach()
        );
    }
}
