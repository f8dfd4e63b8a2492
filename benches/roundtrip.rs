//! Benchmarks forward/inverse transformation and a binary write+load
//! round trip, grounded on `proj4rs`'s `criterion`-based benches.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geocon::{ByteOrder, Direction, Grid, Header, Interpolation, LatDirection, LonDirection, Node};

fn sample_grid(nrows: i32, ncols: i32) -> Grid {
    let header = Header {
        lat_dir: LatDirection::SouthToNorth,
        lon_dir: LonDirection::WestToEast,
        nrows,
        ncols,
        lat_south: 0.0,
        lat_north: (nrows - 1) as f64,
        lon_west: 0.0,
        lon_east: (ncols - 1) as f64,
        lat_delta: 1.0,
        lon_delta: 1.0,
        horz_scale: 1.0,
        vert_scale: 1.0,
        ..Header::default()
    };
    let mut nodes = Vec::with_capacity((nrows * ncols) as usize);
    for row in 0..nrows {
        for col in 0..ncols {
            let v = ((row + col) % 5) as f32 * 0.01;
            nodes.push(Node {
                lat_value: v,
                lon_value: -v,
                hgt_value: v * 0.5,
            });
        }
    }
    Grid::in_memory(header, nodes).unwrap()
}

fn forward_transform(grid: &Grid, npoints: usize) {
    let mut coords: Vec<[f64; 2]> = (0..npoints)
        .map(|i| [(i % 90) as f64 * 0.5, (i % 45) as f64 * 0.5])
        .collect();
    grid.transform(Interpolation::Biquadratic, 1.0, 1.0, &mut coords, None, Direction::Forward);
}

fn inverse_transform(grid: &Grid, npoints: usize) {
    let mut coords: Vec<[f64; 2]> = (0..npoints)
        .map(|i| [(i % 90) as f64 * 0.5, (i % 45) as f64 * 0.5])
        .collect();
    grid.transform(Interpolation::Biquadratic, 1.0, 1.0, &mut coords, None, Direction::Inverse);
}

fn write_and_load_round_trip(grid: &Grid) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.gcb");
    grid.write(&path, ByteOrder::Native).unwrap();
    let _ = Grid::load(&path, None, true).unwrap();
}

fn bench_transform(c: &mut Criterion) {
    let grid = sample_grid(100, 100);
    c.bench_function("forward 10k points", |b| b.iter(|| forward_transform(black_box(&grid), 10_000)));
    c.bench_function("inverse 10k points", |b| b.iter(|| inverse_transform(black_box(&grid), 10_000)));
}

fn bench_codec(c: &mut Criterion) {
    let grid = sample_grid(100, 100);
    c.bench_function("write+load 100x100 grid", |b| b.iter(|| write_and_load_round_trip(black_box(&grid))));
}

criterion_group!(benches, bench_transform, bench_codec);
criterion_main!(benches);
