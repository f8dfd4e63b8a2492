//! The four interpolation kernels.
//!
//! Every kernel takes a query point already converted to fractional grid
//! coordinates and a `fetch` callback returning the raw node at a given
//! `(row, col)` (out-of-range coordinates come back as [`Node::ZERO`] --
//! this is the ghost-cell policy, enforced by the caller, not here). Each
//! kernel blends the same three channels (lat, lon, hgt) with an identical
//! formula, so the per-channel blend is factored into a tiny closure-driven
//! loop rather than being written out three times per channel.

use crate::node::Node;

/// Which interpolation kernel to use.
///
/// `Biquadratic` is the default. Because this is a closed enum, there is no
/// "unrecognized tag" state to fall back from -- the choice is enforced at
/// the type level instead of at runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// 2x2 stencil, bilinear blend.
    Bilinear,
    /// 4x4 stencil, Catmull-Rom-style cubic blend.
    Bicubic,
    /// 3x3 stencil with edge-centering, the default.
    #[default]
    Biquadratic,
    /// 2x2 stencil with Hermite smoothstep weights.
    NatSpline,
}

/// Shift triple in raw (unscaled) header units, before dividing by
/// `horz_scale`/`vert_scale`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Shift {
    /// Latitude shift.
    pub lat: f64,
    /// Longitude shift.
    pub lon: f64,
    /// Height shift.
    pub hgt: f64,
}

/// Truncates toward zero for non-negative values, `-1` for anything negative
/// (a negative grid index can only arise one cell before the grid's first
/// column/row, which the ghost-cell envelope allows).
fn floor_index(grid_index: f64) -> i32 {
    if grid_index < 0.0 {
        -1
    } else {
        grid_index as i32
    }
}

/// Blends a single channel from four nodes `a, b, c, d` (lower-left,
/// lower-right, upper-left, upper-right) with the bilinear kernel.
fn bilinear_blend(a: f64, b: f64, c: f64, d: f64, dx: f64, dy: f64) -> f64 {
    let a00 = a;
    let a10 = b - a;
    let a01 = c - a;
    let a11 = (a - b) - (c - d);
    a00 + a10 * dx + a01 * dy + a11 * dx * dy
}

fn bilinear<F: Fn(i32, i32) -> Node>(fetch: F, lat_deg: f64, lon_deg: f64, lon_min: f64, lon_delta: f64, lat_min: f64, lat_delta: f64) -> Shift {
    let gx = (lon_deg - lon_min) / lon_delta;
    let gy = (lat_deg - lat_min) / lat_delta;
    let icol = floor_index(gx);
    let irow = floor_index(gy);
    let dx = gx - f64::from(icol);
    let dy = gy - f64::from(irow);

    let a = fetch(irow, icol);
    let b = fetch(irow, icol + 1);
    let c = fetch(irow + 1, icol);
    let d = fetch(irow + 1, icol + 1);

    Shift {
        lat: bilinear_blend(a.lat_value as f64, b.lat_value as f64, c.lat_value as f64, d.lat_value as f64, dx, dy),
        lon: bilinear_blend(a.lon_value as f64, b.lon_value as f64, c.lon_value as f64, d.lon_value as f64, dx, dy),
        hgt: bilinear_blend(a.hgt_value as f64, b.hgt_value as f64, c.hgt_value as f64, d.hgt_value as f64, dx, dy),
    }
}

/// The 1-D Catmull-Rom-style kernel, anchored at `h1`.
fn cubic_1d(h0: f64, h1: f64, h2: f64, h3: f64, t: f64) -> f64 {
    let a0 = h1;
    let d0 = h0 - a0;
    let d2 = h2 - a0;
    let d3 = h3 - a0;
    let a1 = d2 - (d0 / 3.0 + d3 / 6.0);
    let a2 = (d0 + d2) / 2.0;
    let a3 = (d3 - d0) / 6.0 - d2 / 2.0;
    a0 + t * (a1 + t * (a2 + t * a3))
}

fn bicubic<F: Fn(i32, i32) -> Node>(fetch: F, lat_deg: f64, lon_deg: f64, lon_min: f64, lon_delta: f64, lat_min: f64, lat_delta: f64) -> Shift {
    let gx = (lon_deg - lon_min) / lon_delta;
    let gy = (lat_deg - lat_min) / lat_delta;
    let icol = floor_index(gx);
    let irow = floor_index(gy);
    let dx = gx - f64::from(icol);
    let dy = gy - f64::from(irow);

    // pt[i][j]: i, j in 0..4, shifted by -1 so the query's enclosing cell
    // sits between indices 1 and 2 on each axis.
    let mut pt = [[Node::ZERO; 4]; 4];
    for (i, row) in pt.iter_mut().enumerate() {
        for (j, node) in row.iter_mut().enumerate() {
            *node = fetch(irow - 1 + i as i32, icol - 1 + j as i32);
        }
    }

    let channel = |select: fn(&Node) -> f64| -> f64 {
        let mut c = [0.0; 4];
        for (j, slot) in c.iter_mut().enumerate() {
            *slot = cubic_1d(
                select(&pt[0][j]),
                select(&pt[1][j]),
                select(&pt[2][j]),
                select(&pt[3][j]),
                dy,
            );
        }
        cubic_1d(c[0], c[1], c[2], c[3], dx)
    };

    Shift {
        lat: channel(|n| n.lat_value as f64),
        lon: channel(|n| n.lon_value as f64),
        hgt: channel(|n| n.hgt_value as f64),
    }
}

fn biquadratic<F: Fn(i32, i32) -> Node>(fetch: F, lat_deg: f64, lon_deg: f64, lon_min: f64, lon_delta: f64, lat_min: f64, lat_delta: f64, ncols: i32, nrows: i32) -> Shift {
    let gx = (lon_deg - lon_min) / lon_delta;
    let gy = (lat_deg - lat_min) / lat_delta;

    let mut icol_lft = floor_index(gx);
    let mut icol_cen = icol_lft + 1;
    let mut icol_rgt = icol_lft + 2;

    let mut irow_bot = floor_index(gy);
    let mut irow_cen = irow_bot + 1;
    let mut irow_top = irow_bot + 2;

    while icol_rgt > ncols {
        icol_lft -= 1;
        icol_cen -= 1;
        icol_rgt -= 1;
    }
    let mut dx = (lon_deg - lon_delta * f64::from(icol_lft) - lon_min) / lon_delta;
    if dx < 0.5 && icol_lft > 0 {
        icol_lft -= 1;
        icol_cen -= 1;
        icol_rgt -= 1;
        dx += 1.0;
    }

    while irow_top > nrows {
        irow_bot -= 1;
        irow_cen -= 1;
        irow_top -= 1;
    }
    let mut dy = (lat_deg - lat_delta * f64::from(irow_bot) - lat_min) / lat_delta;
    if dy < 0.5 && irow_bot > 0 {
        irow_bot -= 1;
        irow_cen -= 1;
        irow_top -= 1;
        dy += 1.0;
    }

    let t1 = 0.5 * (dx - 1.0);
    let t2 = 0.5 * (dy - 1.0);

    let a = fetch(irow_bot, icol_lft);
    let b = fetch(irow_bot, icol_cen);
    let c = fetch(irow_bot, icol_rgt);
    let d = fetch(irow_cen, icol_lft);
    let e = fetch(irow_cen, icol_cen);
    let f = fetch(irow_cen, icol_rgt);
    let g = fetch(irow_top, icol_lft);
    let h = fetch(irow_top, icol_cen);
    let i = fetch(irow_top, icol_rgt);

    let row_blend = |lft: f64, cen: f64, rgt: f64| -> f64 { lft + dx * ((cen - lft) + t1 * ((rgt - cen) - (cen - lft))) };

    let channel = |select: fn(&Node) -> f64| -> f64 {
        let f0 = row_blend(select(&a), select(&b), select(&c));
        let f1 = row_blend(select(&d), select(&e), select(&f));
        let f2 = row_blend(select(&g), select(&h), select(&i));
        f0 + dy * ((f1 - f0) + t2 * ((f2 - f1) - (f1 - f0)))
    };

    Shift {
        lat: channel(|n| n.lat_value as f64),
        lon: channel(|n| n.lon_value as f64),
        hgt: channel(|n| n.hgt_value as f64),
    }
}

fn natspline<F: Fn(i32, i32) -> Node>(fetch: F, lat_deg: f64, lon_deg: f64, lon_min: f64, lon_delta: f64, lat_min: f64, lat_delta: f64) -> Shift {
    let gx = (lon_deg - lon_min) / lon_delta;
    let gy = (lat_deg - lat_min) / lat_delta;
    let icol = floor_index(gx);
    let irow = floor_index(gy);
    let dx = gx - f64::from(icol);
    let dy = gy - f64::from(irow);

    fn smoothstep(t: f64) -> f64 {
        t * t * (3.0 - 2.0 * t)
    }
    let wx0 = smoothstep(1.0 - dx);
    let wx1 = smoothstep(dx);
    let wy0 = smoothstep(1.0 - dy);
    let wy1 = smoothstep(dy);

    let a = fetch(irow, icol);
    let b = fetch(irow, icol + 1);
    let c = fetch(irow + 1, icol);
    let d = fetch(irow + 1, icol + 1);

    let channel = |select: fn(&Node) -> f64| -> f64 { select(&a) * wx0 * wy0 + select(&c) * wx0 * wy1 + select(&b) * wx1 * wy0 + select(&d) * wx1 * wy1 };

    Shift {
        lat: channel(|n| n.lat_value as f64),
        lon: channel(|n| n.lon_value as f64),
        hgt: channel(|n| n.hgt_value as f64),
    }
}

/// Computes the raw shift at `(lat_deg, lon_deg)` using `interp`, fetching
/// nodes through `fetch`.
///
/// `lon_min`/`lon_delta`/`lat_min`/`lat_delta` are the grid's in-memory
/// extent and spacing; `ncols`/`nrows` are needed only by
/// [`Interpolation::Biquadratic`]'s edge-centering logic.
#[allow(clippy::too_many_arguments)]
pub(crate) fn calculate_shift<F: Fn(i32, i32) -> Node>(
    interp: Interpolation,
    fetch: F,
    lat_deg: f64,
    lon_deg: f64,
    lon_min: f64,
    lon_delta: f64,
    lat_min: f64,
    lat_delta: f64,
    ncols: i32,
    nrows: i32,
) -> Shift {
    match interp {
        Interpolation::Bilinear => bilinear(fetch, lat_deg, lon_deg, lon_min, lon_delta, lat_min, lat_delta),
        Interpolation::Bicubic => bicubic(fetch, lat_deg, lon_deg, lon_min, lon_delta, lat_min, lat_delta),
        Interpolation::Biquadratic => biquadratic(fetch, lat_deg, lon_deg, lon_min, lon_delta, lat_min, lat_delta, ncols, nrows),
        Interpolation::NatSpline => natspline(fetch, lat_deg, lon_deg, lon_min, lon_delta, lat_min, lat_delta),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner_grid(fetch_a: Node, fetch_b: Node, fetch_c: Node, fetch_d: Node) -> impl Fn(i32, i32) -> Node {
        move |row, col| match (row, col) {
            (0, 0) => fetch_a,
            (0, 1) => fetch_b,
            (1, 0) => fetch_c,
            (1, 1) => fetch_d,
            _ => Node::ZERO,
        }
    }

    #[test]
    fn bilinear_exact_scenario() {
        let fetch = corner_grid(Node::ZERO, Node::ZERO, Node::ZERO, Node {
            lat_value: 1.0,
            lon_value: 1.0,
            hgt_value: 1.0,
        });
        let shift = bilinear(fetch, 0.5, 0.5, 0.0, 1.0, 0.0, 1.0);
        assert!((shift.lat - 0.25).abs() < 1e-12);
        assert!((shift.lon - 0.25).abs() < 1e-12);
        assert!((shift.hgt - 0.25).abs() < 1e-12);
    }

    #[test]
    fn bilinear_and_natspline_collapse_at_node() {
        let node_a = Node {
            lat_value: 3.0,
            lon_value: -2.0,
            hgt_value: 0.5,
        };
        let fetch = corner_grid(node_a, Node::ZERO, Node::ZERO, Node::ZERO);
        let bilinear_shift = bilinear(&fetch, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0);
        let natspline_shift = natspline(&fetch, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0);
        assert_eq!(bilinear_shift.lat as f32, node_a.lat_value);
        assert_eq!(natspline_shift.lat as f32, node_a.lat_value);
    }
}
