//! Bounding-box cropping, applied at load time to reduce a grid's rows and
//! columns before reading node data.
//!
//! Clamp the requested box to the grid's own extent, then snap each edge to
//! the nearest whole multiple of the relevant delta so the crop lines up
//! with existing grid rows/columns. Snapping rounds each edge up to the next
//! full row/column, i.e. the skip count is a ceiling, not a floor (see
//! `DESIGN.md` for why).

use crate::error::{Error, Result};

/// A lower-left/upper-right bounding box used to crop a grid at load time.
///
/// Units are degrees; since shifts are tiny relative to a degree, the exact
/// datum of the box's coordinates does not matter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    /// South latitude of the lower-left corner.
    pub slat: f64,
    /// West longitude of the lower-left corner.
    pub wlon: f64,
    /// North latitude of the upper-right corner.
    pub nlat: f64,
    /// East longitude of the upper-right corner.
    pub elon: f64,
}

impl Extent {
    /// Creates a new extent.
    pub fn new(slat: f64, wlon: f64, nlat: f64, elon: f64) -> Extent {
        Extent {
            slat,
            wlon,
            nlat,
            elon,
        }
    }
}

/// The result of snapping a requested [`Extent`] onto a grid's mesh: how
/// many whole rows/columns to skip on each edge, and the resulting
/// in-memory bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crop {
    /// Rows to skip at the south edge.
    pub skip_south: i32,
    /// Rows to skip at the north edge.
    pub skip_north: i32,
    /// Columns to skip at the west edge.
    pub skip_west: i32,
    /// Columns to skip at the east edge.
    pub skip_east: i32,

    /// Row count after cropping.
    pub nrows: i32,
    /// Column count after cropping.
    pub ncols: i32,
    /// South bound after cropping.
    pub lat_min: f64,
    /// North bound after cropping.
    pub lat_max: f64,
    /// West bound after cropping.
    pub lon_min: f64,
    /// East bound after cropping.
    pub lon_max: f64,
}

/// Computes how `extent` crops a grid with the given full extent and mesh
/// spacing.
///
/// Returns [`Error::InvalidExtent`] if `extent` is degenerate (`slat >=
/// nlat` or `wlon >= elon`) or does not intersect
/// `(lat_min, lat_max, lon_min, lon_max)`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn crop(
    extent: &Extent,
    nrows: i32,
    ncols: i32,
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
    lat_delta: f64,
    lon_delta: f64,
) -> Result<Crop> {
    if extent.slat >= extent.nlat || extent.wlon >= extent.elon {
        return Err(Error::InvalidExtent);
    }
    if extent.slat >= lat_max || extent.nlat <= lat_min || extent.wlon >= lon_max || extent.elon <= lon_min {
        return Err(Error::InvalidExtent);
    }

    let clamped_lat_min = extent.slat.max(lat_min);
    let clamped_lat_max = extent.nlat.min(lat_max);
    let clamped_lon_min = extent.wlon.max(lon_min);
    let clamped_lon_max = extent.elon.min(lon_max);

    let skip_south = snap(clamped_lat_min, lat_min, lat_delta);
    let skip_north = snap(lat_max, clamped_lat_max, lat_delta);
    let skip_west = snap(clamped_lon_min, lon_min, lon_delta);
    let skip_east = snap(lon_max, clamped_lon_max, lon_delta);

    Ok(Crop {
        skip_south,
        skip_north,
        skip_west,
        skip_east,
        nrows: nrows - skip_south - skip_north,
        ncols: ncols - skip_west - skip_east,
        lat_min: lat_min + f64::from(skip_south) * lat_delta,
        lat_max: lat_max - f64::from(skip_north) * lat_delta,
        lon_min: lon_min + f64::from(skip_west) * lon_delta,
        lon_max: lon_max - f64::from(skip_east) * lon_delta,
    })
}

/// Number of whole `delta`-sized steps between `from` and `to`, rounded up
/// to the next full step, clamped to non-negative since a larger-or-equal
/// bound should skip nothing.
fn snap(to: f64, from: f64, delta: f64) -> i32 {
    let steps = ((to - from) / delta).ceil();
    if steps > 0.0 {
        steps as i32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crops_a_ten_by_ten_grid() {
        // A 10x10 grid over lat 0..9, lon 0..9, delta 1.
        let extent = Extent::new(2.3, 3.7, 6.8, 8.2);
        let result = crop(&extent, 10, 10, 0.0, 9.0, 0.0, 9.0, 1.0, 1.0).unwrap();
        assert_eq!(result.lat_min, 3.0);
        assert_eq!(result.lat_max, 6.0);
        assert_eq!(result.lon_min, 4.0);
        assert_eq!(result.lon_max, 8.0);
        assert_eq!(result.nrows, 4);
        assert_eq!(result.ncols, 5);
    }

    #[test]
    fn rejects_degenerate_extent() {
        let extent = Extent::new(5.0, 0.0, 1.0, 1.0);
        assert!(matches!(
            crop(&extent, 10, 10, 0.0, 9.0, 0.0, 9.0, 1.0, 1.0),
            Err(Error::InvalidExtent)
        ));
    }

    #[test]
    fn rejects_non_intersecting_extent() {
        let extent = Extent::new(20.0, 20.0, 21.0, 21.0);
        assert!(matches!(
            crop(&extent, 10, 10, 0.0, 9.0, 0.0, 9.0, 1.0, 1.0),
            Err(Error::InvalidExtent)
        ));
    }
}
