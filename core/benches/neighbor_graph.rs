use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hexmine_core::{EARTH_RADIUS_M, NeighborConfig, NeighborGraph, Point};
use std::hint::black_box;

/// Flat-top lattice around Athens, odd columns raised half a row.
fn lattice(cols: usize, rows: usize) -> Vec<Point> {
    let lat0: f64 = 37.95;
    let lat_scale = EARTH_RADIUS_M * 1.0_f64.to_radians();
    let lon_scale = lat_scale * lat0.to_radians().cos();
    (0..cols)
        .flat_map(|col| (0..rows).map(move |row| (col, row)))
        .map(|(col, row)| {
            let shift = if col % 2 == 1 { 137.0 } else { 0.0 };
            let dx = col as f64 * 237.0;
            let dy = row as f64 * 274.0 + shift;
            Point::new(23.70 + dx / lon_scale, lat0 + dy / lat_scale)
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let config = NeighborConfig::default();
    let mut group = c.benchmark_group("neighbor_graph");
    for side in [16, 64, 128] {
        let centroids = lattice(side, side);
        group.bench_with_input(BenchmarkId::from_parameter(side * side), &centroids, |b, centroids| {
            b.iter(|| NeighborGraph::build(black_box(centroids), &config))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
