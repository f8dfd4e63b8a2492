//! Forward and inverse point transformation.
//!
//! The epsilon-tolerant comparison helpers below are deliberately exact
//! reproductions of a specific relative-tolerance formula, not just "some
//! small epsilon" -- boundary and convergence behavior depends on matching
//! it bit-for-bit.

use log::warn;

use crate::grid::Grid;
use crate::interp::{self, Interpolation};

/// Relative-comparison tolerance used for ghost-cell gating and inverse
/// convergence: `2^-51`.
pub const EPSILON: f64 = 4.440_892_098_500_626_2e-16;

/// Maximum number of fixed-point iterations [`inverse`] will attempt before
/// giving up and returning its last estimate.
pub const MAX_ITERATIONS: u32 = 50;

fn eq_eps(a: f64, b: f64, eps: f64) -> bool {
    a == b || (a - b).abs() <= eps * (1.0 + (a.abs() + b.abs()) / 2.0)
}

fn zero_eps(a: f64, eps: f64) -> bool {
    eq_eps(a, 0.0, eps)
}

fn lt_eps(a: f64, b: f64, eps: f64) -> bool {
    !eq_eps(a, b, eps) && a < b
}

fn gt_eps(a: f64, b: f64, eps: f64) -> bool {
    !eq_eps(a, b, eps) && a > b
}

/// Direction of a grid application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// Source datum to target datum.
    #[default]
    Forward,
    /// Target datum to source datum, computed iteratively.
    Inverse,
}

/// Folds `d` into `(-180, 180]`: one 360-degree fold, then (unless `|d|` is
/// already 180) a modulo-180 step with a symmetric adjustment for the sign.
fn normalize_longitude(mut d: f64) -> f64 {
    if d < -180.0 {
        d += 360.0;
    } else if d > 180.0 {
        d -= 360.0;
    }

    if !eq_eps(d.abs(), 180.0, EPSILON) {
        d %= 180.0;
        d = if d.abs() <= 180.0 {
            d
        } else if d < 0.0 {
            d + 180.0
        } else {
            d - 180.0
        };
    }
    d
}

fn within_ghost(lat: f64, lon: f64, grid: &Grid, eps: f64) -> bool {
    let (lat_min_ghost, lat_max_ghost, lon_min_ghost, lon_max_ghost) = grid.ghost_bounds();
    gt_eps(lat, lat_min_ghost, eps) && lt_eps(lat, lat_max_ghost, eps) && gt_eps(lon, lon_min_ghost, eps) && lt_eps(lon, lon_max_ghost, eps)
}

fn shift_at(grid: &Grid, interp: Interpolation, lat: f64, lon: f64) -> (f64, f64, f64) {
    let shift = interp::calculate_shift(
        interp,
        |row, col| grid.node(row, col),
        lat,
        lon,
        grid.lon_min(),
        grid.lon_delta(),
        grid.lat_min(),
        grid.lat_delta(),
        grid.ncols(),
        grid.nrows(),
    );
    (shift.lat / grid.horz_scale(), shift.lon / grid.horz_scale(), shift.hgt / grid.vert_scale())
}

/// Applies `grid` to every coordinate in `coords` (stored `[lon, lat]`) and,
/// if present, the matching `heights`, in the requested `direction`.
///
/// `deg_factor` converts the caller's horizontal units to degrees;
/// `hgt_factor` converts the caller's height units to metres. Points
/// outside the ghost envelope are left untouched and excluded from the
/// returned count.
#[allow(clippy::too_many_arguments)]
pub fn transform(grid: &Grid, interp: Interpolation, deg_factor: f64, hgt_factor: f64, coords: &mut [[f64; 2]], mut heights: Option<&mut [f64]>, direction: Direction) -> usize {
    let mut count = 0;
    for i in 0..coords.len() {
        let lon_in = coords[i][0] * deg_factor;
        let lat_in = coords[i][1] * deg_factor;
        let hgt_in = heights.as_ref().map(|h| h[i] * hgt_factor).unwrap_or(0.0);

        let transformed = match direction {
            Direction::Forward => forward_one(grid, interp, lat_in, lon_in, hgt_in),
            Direction::Inverse => inverse_one(grid, interp, lat_in, lon_in, hgt_in),
        };

        if let Some((lat_out, lon_out, hgt_out)) = transformed {
            coords[i][1] = lat_out / deg_factor;
            coords[i][0] = lon_out / deg_factor;
            if let Some(h) = heights.as_deref_mut() {
                h[i] = hgt_out / hgt_factor;
            }
            count += 1;
        }
    }
    count
}

fn forward_one(grid: &Grid, interp: Interpolation, lat_deg: f64, lon_deg: f64, hgt_m: f64) -> Option<(f64, f64, f64)> {
    let lon_deg = normalize_longitude(lon_deg);
    if !within_ghost(lat_deg, lon_deg, grid, EPSILON) {
        return None;
    }
    let (dlat, dlon, dhgt) = shift_at(grid, interp, lat_deg, lon_deg);
    let lat_out = lat_deg + dlat;
    let lon_out = normalize_longitude(lon_deg + dlon);
    let hgt_out = hgt_m + dhgt;
    Some((lat_out, lon_out, hgt_out))
}

fn inverse_one(grid: &Grid, interp: Interpolation, lat_in: f64, lon_in: f64, hgt_in: f64) -> Option<(f64, f64, f64)> {
    let lon_in = normalize_longitude(lon_in);
    if !within_ghost(lat_in, lon_in, grid, EPSILON) {
        return None;
    }

    // The running estimate is never longitude-normalized mid-loop, only
    // folded once at the very end. Folding every iteration would change
    // which node cell subsequent shifts are sampled from near the
    // antimeridian.
    let mut lat_n = lat_in;
    let mut lon_n = lon_in;
    let mut hgt_n = hgt_in;
    let mut converged = false;

    for _ in 0..MAX_ITERATIONS {
        let (dlat, dlon, dhgt) = shift_at(grid, interp, lat_n, lon_n);
        let lat_e = lat_n + dlat;
        let lon_e = lon_n + dlon;
        let hgt_e = hgt_n + dhgt;

        let delta_lat = lat_e - lat_in;
        let delta_lon = lon_e - lon_in;
        let delta_hgt = hgt_e - hgt_in;

        if zero_eps(delta_lat, EPSILON) && zero_eps(delta_lon, EPSILON) && zero_eps(delta_hgt, EPSILON) {
            converged = true;
            break;
        }

        lat_n -= delta_lat;
        lon_n -= delta_lon;
        hgt_n -= delta_hgt;
    }

    if !converged {
        warn!("inverse transform did not converge within {MAX_ITERATIONS} iterations");
    }

    Some((lat_n, normalize_longitude(lon_n), hgt_n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{Header, LatDirection, LonDirection};
    use crate::grid::Grid;
    use crate::node::Node;

    fn scenario_grid() -> Grid {
        let header = Header {
            lat_dir: LatDirection::SouthToNorth,
            lon_dir: LonDirection::WestToEast,
            nrows: 2,
            ncols: 2,
            lat_south: 0.0,
            lat_north: 1.0,
            lon_west: 0.0,
            lon_east: 1.0,
            lat_delta: 1.0,
            lon_delta: 1.0,
            horz_scale: 1.0,
            vert_scale: 1.0,
            ..Header::default()
        };
        let nodes = vec![
            Node { lat_value: 0.0, lon_value: 0.0, hgt_value: 0.0 },
            Node { lat_value: 0.0, lon_value: 0.0, hgt_value: 0.0 },
            Node { lat_value: 0.0, lon_value: 0.0, hgt_value: 0.0 },
            Node { lat_value: 1.0, lon_value: 1.0, hgt_value: 1.0 },
        ];
        Grid::in_memory(header, nodes).unwrap()
    }

    #[test]
    fn bilinear_exact_scenario() {
        let grid = scenario_grid();
        let mut coords = [[0.5, 0.5]];
        let count = transform(&grid, Interpolation::Bilinear, 1.0, 1.0, &mut coords, None, Direction::Forward);
        assert_eq!(count, 1);
        assert!((coords[0][0] - 0.75).abs() < 1e-12);
        assert!((coords[0][1] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn ghost_rejection() {
        let grid = scenario_grid();
        let mut coords = [[0.5, 2.5]];
        let count = transform(&grid, Interpolation::Bilinear, 1.0, 1.0, &mut coords, None, Direction::Forward);
        assert_eq!(count, 0);
        assert_eq!(coords[0], [0.5, 2.5]);
    }

    #[test]
    fn ghost_acceptance_ramps_toward_zero() {
        let grid = scenario_grid();
        let mut coords = [[0.5, 1.5]];
        let count = transform(&grid, Interpolation::Bilinear, 1.0, 1.0, &mut coords, None, Direction::Forward);
        assert_eq!(count, 1);
        assert!(coords[0][1] < 1.5 + 0.5);
    }

    #[test]
    fn inverse_converges() {
        let grid = scenario_grid();
        let mut coords = [[0.5, 0.5]];
        transform(&grid, Interpolation::Biquadratic, 1.0, 1.0, &mut coords, None, Direction::Forward);
        transform(&grid, Interpolation::Biquadratic, 1.0, 1.0, &mut coords, None, Direction::Inverse);
        assert!((coords[0][0] - 0.5).abs() < 1e-10);
        assert!((coords[0][1] - 0.5).abs() < 1e-10);
    }
}
