//! Synthetic boards for tests.

use serde_json::json;

use crate::*;

const ORIGIN: Point = Point::new(23.70, 37.95);
const COL_PITCH_M: f64 = 237.0;
const ROW_PITCH_M: f64 = 274.0;
const HEX_RADIUS_M: f64 = 158.0;

fn meters_per_degree() -> f64 {
    EARTH_RADIUS_M * 1.0_f64.to_radians()
}

fn offset_m(dx: f64, dy: f64) -> Point {
    let lat_scale = meters_per_degree();
    let lon_scale = lat_scale * ORIGIN.lat().to_radians().cos();
    Point::new(ORIGIN.lon() + dx / lon_scale, ORIGIN.lat() + dy / lat_scale)
}

/// Closed flat-top hexagon ring in plain units.
pub(crate) fn hexagon(center: Point, radius: f64) -> Vec<Point> {
    let mut ring: Vec<_> = (0..6)
        .map(|k| {
            let angle = (60.0 * k as f64).to_radians();
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect();
    ring.push(ring[0]);
    ring
}

pub(crate) fn lattice_id(rows: usize, col: usize, row: usize) -> CellId {
    col * rows + row
}

fn lattice_offset(col: usize, row: usize) -> (f64, f64) {
    let shift = if col % 2 == 1 { ROW_PITCH_M / 2.0 } else { 0.0 };
    (col as f64 * COL_PITCH_M, row as f64 * ROW_PITCH_M + shift)
}

/// Lon/lat centers of a flat-top lattice with odd columns raised half a row.
pub(crate) fn hex_lattice_centroids(cols: usize, rows: usize) -> Vec<Point> {
    (0..cols)
        .flat_map(|col| (0..rows).map(move |row| lattice_offset(col, row)))
        .map(|(dx, dy)| offset_m(dx, dy))
        .collect()
}

/// GeoJSON feature collection of hexagon polygons laid out like
/// [`hex_lattice_centroids`], with `NUMPOINTS` taken from `count`.
pub(crate) fn hex_lattice_geojson(
    cols: usize,
    rows: usize,
    count: impl Fn(CellId) -> Option<f64>,
) -> String {
    let features: Vec<_> = (0..cols)
        .flat_map(|col| (0..rows).map(move |row| (col, row)))
        .map(|(col, row)| {
            let (dx, dy) = lattice_offset(col, row);
            let ring: Vec<_> = hexagon(Point::new(dx, dy), HEX_RADIUS_M)
                .into_iter()
                .map(|p| {
                    let p = offset_m(p.x, p.y);
                    [p.x, p.y]
                })
                .collect();
            json!({
                "type": "Feature",
                "properties": { "NUMPOINTS": count(lattice_id(rows, col, row)) },
                "geometry": { "type": "Polygon", "coordinates": [ring] },
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features }).to_string()
}

/// Unit hexagons laid out on a line, connected by `edges`.
pub(crate) fn registry_with_edges(counts: &[Option<f64>], edges: &[(CellId, CellId)]) -> CellRegistry {
    let raw = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| RawCell {
            ring: hexagon(Point::new(i as f64 * 2.0, 0.0), 1.0),
            count,
        })
        .collect();
    let mut registry = CellRegistry::from_raw(raw, &ViewConfig::default()).unwrap();
    registry.connect(NeighborGraph::from_edges(counts.len(), edges));
    registry
}

/// Path graph `0 - 1 - 2 - ...`.
pub(crate) fn line_registry(counts: &[Option<f64>]) -> CellRegistry {
    let edges: Vec<_> = (1..counts.len()).map(|i| (i - 1, i)).collect();
    registry_with_edges(counts, &edges)
}
