//! Reads, writes, and applies [GEOCON](https://geodesy.noaa.gov/) datum
//! transformation grid files.
//!
//! A grid is a regular latitude/longitude mesh where every node carries a
//! triple of shift values (Δlat, Δlon, Δheight) that convert a point from
//! one geodetic reference frame to another. This crate loads such grids
//! from their binary form, optionally cropped to a bounding extent, and
//! applies them to transform points forward or inverse using any of four
//! interpolation kernels.
//!
//! # Loading and transforming
//!
//! ```no_run
//! use geocon::{Direction, Grid, Interpolation};
//!
//! let grid = Grid::load("example.gcb", None, true)?;
//! let mut coords = [[-83.5, 34.2]]; // [lon, lat]
//! let count = grid.transform(Interpolation::default(), 1.0, 1.0, &mut coords, None, Direction::Forward);
//! assert_eq!(count, 1);
//! # Ok::<(), geocon::Error>(())
//! ```
//!
//! # Scope
//!
//! This crate implements the core transformation engine: the binary grid
//! codec, the in-memory grid model, node fetch (including on-the-fly
//! streamed fetch for large grids), the four interpolation kernels, and
//! forward/inverse point transformation. It does not implement the
//! textual ("ascii") grid format, command-line tooling, or the legacy
//! grid-combiner format -- those are thin wrappers an external crate can
//! build on [`Header`], [`Node`], and [`Grid::in_memory`].

#![deny(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]

mod byte_order;
mod error;
mod extent;
mod grid;
mod header;
mod interp;
mod node;
mod transform;

pub use byte_order::ByteOrder;
pub use error::{Error, Result};
pub use extent::{Crop, Extent};
pub use grid::{filetype, FileType, Grid};
pub use header::{Header, LatDirection, LonDirection};
pub use interp::Interpolation;
pub use node::Node;
pub use transform::Direction;

impl Grid {
    /// Applies this grid to `coords` (and, if given, `heights`) in the
    /// requested `direction`, returning the number of points actually
    /// transformed (points outside the grid's ghost envelope are skipped).
    pub fn transform(&self, interp: Interpolation, deg_factor: f64, hgt_factor: f64, coords: &mut [[f64; 2]], heights: Option<&mut [f64]>, direction: Direction) -> usize {
        transform::transform(self, interp, deg_factor, hgt_factor, coords, heights, direction)
    }
}
