//! A single grid sample.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{from_io, Result};

/// Three shift values at one node of a grid's mesh.
///
/// These are raw, scaled units straight off disk: divide `lat_value` and
/// `lon_value` by the header's `horz_scale`, and `hgt_value` by `vert_scale`,
/// to recover degrees and metres respectively. [`crate::Grid::fetch`] and the
/// interpolation kernels operate entirely in these raw units; the scale
/// division happens once, after interpolation, during a transform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Node {
    /// Latitude shift, in header `horz_scale` units.
    pub lat_value: f32,
    /// Longitude shift, in header `horz_scale` units.
    pub lon_value: f32,
    /// Height shift, in header `vert_scale` units.
    pub hgt_value: f32,
}

/// Byte length of one encoded node record: three 32-bit floats.
pub const NODE_SIZE: usize = 12;

impl Node {
    /// A node with all three shifts zero.
    ///
    /// This is what [`crate::Grid::node`] returns for any row/column outside
    /// the grid's bounds -- the ghost-cell policy.
    pub const ZERO: Node = Node {
        lat_value: 0.0,
        lon_value: 0.0,
        hgt_value: 0.0,
    };

    pub(crate) fn read_from<R: Read>(mut read: R, big_endian: bool) -> Result<Node> {
        let (lat_value, lon_value, hgt_value) = if big_endian {
            (
                from_io(read.read_f32::<BigEndian>())?,
                from_io(read.read_f32::<BigEndian>())?,
                from_io(read.read_f32::<BigEndian>())?,
            )
        } else {
            (
                from_io(read.read_f32::<LittleEndian>())?,
                from_io(read.read_f32::<LittleEndian>())?,
                from_io(read.read_f32::<LittleEndian>())?,
            )
        };
        Ok(Node {
            lat_value,
            lon_value,
            hgt_value,
        })
    }

    pub(crate) fn write_to<W: Write>(&self, mut write: W, big_endian: bool) -> io::Result<()> {
        if big_endian {
            write.write_f32::<BigEndian>(self.lat_value)?;
            write.write_f32::<BigEndian>(self.lon_value)?;
            write.write_f32::<BigEndian>(self.hgt_value)?;
        } else {
            write.write_f32::<LittleEndian>(self.lat_value)?;
            write.write_f32::<LittleEndian>(self.lon_value)?;
            write.write_f32::<LittleEndian>(self.hgt_value)?;
        }
        Ok(())
    }
}
