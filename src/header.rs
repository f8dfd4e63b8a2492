//! The GEOCON file header: file-visible metadata plus its binary codec.
//!
//! This module encodes each field individually rather than transmuting a
//! `repr(C)` struct, which sidesteps compiler-dependent padding -- the
//! encoded size is exactly the sum of the field widths below, with no
//! alignment gaps.

use std::io::{Read, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{from_io, Error, Result};

/// "GCON" in the writer's native byte order.
pub const MAGIC: u32 = 0x4743_4F4E;
/// "GCON" byte-swapped; seeing this instead of [`MAGIC`] on load means the
/// file was written on a foreign-endian host.
pub const MAGIC_SWAPPED: u32 = 0x4E4F_4347;

/// The only header version this crate knows how to read or write.
pub const VERSION: i32 = 1;

const INFO_LEN: usize = 80;
const SOURCE_LEN: usize = 80;
const DATE_LEN: usize = 24;
const NAME_LEN: usize = 80;

/// Encoded size of a [`Header`], in bytes: the sum of every field's width,
/// with no padding.
pub const HEADER_SIZE: usize = 4 * 4 // magic, version, header_length, reserved
    + INFO_LEN + SOURCE_LEN + DATE_LEN
    + 4 * 4 // lat_dir, lon_dir, nrows, ncols
    + 8 * 8 // lat_south .. vert_scale
    + NAME_LEN * 2 + 8 * 2 // from_gcs, from_vcs, from_semi_major, from_flattening
    + NAME_LEN * 2 + 8 * 2; // to_gcs, to_vcs, to_semi_major, to_flattening

/// Storage order of latitude rows in a file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LatDirection {
    /// Rows run from the south edge to the north edge. This is the
    /// canonical in-memory order.
    #[default]
    SouthToNorth,
    /// Rows run from the north edge to the south edge.
    NorthToSouth,
}

/// Storage order of longitude columns in a file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LonDirection {
    /// Columns run from the west edge to the east edge. This is the
    /// canonical in-memory order.
    #[default]
    WestToEast,
    /// Columns run from the east edge to the west edge.
    EastToWest,
}

impl LatDirection {
    fn from_i32(value: i32) -> LatDirection {
        if value == 0 {
            LatDirection::SouthToNorth
        } else {
            LatDirection::NorthToSouth
        }
    }

    fn as_i32(self) -> i32 {
        match self {
            LatDirection::SouthToNorth => 0,
            LatDirection::NorthToSouth => 1,
        }
    }
}

impl LonDirection {
    fn from_i32(value: i32) -> LonDirection {
        if value == 0 {
            LonDirection::WestToEast
        } else {
            LonDirection::EastToWest
        }
    }

    fn as_i32(self) -> i32 {
        match self {
            LonDirection::WestToEast => 0,
            LonDirection::EastToWest => 1,
        }
    }
}

/// File-visible metadata for a GEOCON grid.
///
/// This is a straightforward transcription of the file header: the
/// reference-system descriptors, the free-text fields, the file's storage
/// direction flags, and the extent/scale/delta values as they appear on
/// disk. A [`crate::Grid`] keeps one of these plus its own in-memory extent,
/// which may be smaller than this header's after cropping (see
/// [`crate::extent`]).
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    /// Free-text description of the grid. Capped at 80 bytes.
    pub info: String,
    /// Free-text description of the grid's source. Capped at 80 bytes.
    pub source: String,
    /// `"YYYY-MM-DD[ HH:MM:SS]"`, or any string up to 24 bytes.
    pub date: String,

    /// Storage order of rows in the file this header describes.
    pub lat_dir: LatDirection,
    /// Storage order of columns in the file this header describes.
    pub lon_dir: LonDirection,

    /// Number of rows in the file.
    pub nrows: i32,
    /// Number of columns in the file.
    pub ncols: i32,

    /// South latitude bound, degrees.
    pub lat_south: f64,
    /// North latitude bound, degrees.
    pub lat_north: f64,
    /// West longitude bound, degrees, normalized to `(-180, 180]`.
    pub lon_west: f64,
    /// East longitude bound, degrees, normalized to `(-180, 180]`.
    pub lon_east: f64,

    /// Latitude spacing between rows, degrees.
    pub lat_delta: f64,
    /// Longitude spacing between columns, degrees.
    pub lon_delta: f64,

    /// Horizontal shift units per degree (e.g. `360000000` for 1e-5
    /// arc-seconds).
    pub horz_scale: f64,
    /// Vertical shift units per metre (e.g. `100` for centimetres).
    pub vert_scale: f64,

    /// Name of the source geographic coordinate system. Capped at 80 bytes.
    pub from_gcs: String,
    /// Name of the source vertical coordinate system. Capped at 80 bytes.
    pub from_vcs: String,
    /// Semi-major axis of the source ellipsoid, metres.
    pub from_semi_major: f64,
    /// Flattening of the source ellipsoid.
    pub from_flattening: f64,

    /// Name of the target geographic coordinate system. Capped at 80 bytes.
    pub to_gcs: String,
    /// Name of the target vertical coordinate system. Capped at 80 bytes.
    pub to_vcs: String,
    /// Semi-major axis of the target ellipsoid, metres.
    pub to_semi_major: f64,
    /// Flattening of the target ellipsoid.
    pub to_flattening: f64,
}

impl Default for Header {
    fn default() -> Header {
        Header {
            info: String::new(),
            source: String::new(),
            date: String::new(),
            lat_dir: LatDirection::default(),
            lon_dir: LonDirection::default(),
            nrows: 0,
            ncols: 0,
            lat_south: 0.0,
            lat_north: 0.0,
            lon_west: 0.0,
            lon_east: 0.0,
            lat_delta: 0.0,
            lon_delta: 0.0,
            horz_scale: 1.0,
            vert_scale: 1.0,
            from_gcs: String::new(),
            from_vcs: String::new(),
            from_semi_major: 0.0,
            from_flattening: 0.0,
            to_gcs: String::new(),
            to_vcs: String::new(),
            to_semi_major: 0.0,
            to_flattening: 0.0,
        }
    }
}

impl Header {
    /// Reads a header from `read`.
    ///
    /// Returns the decoded header along with `true` if the file's byte
    /// order differs from this host's (the grid's `flip` flag).
    pub(crate) fn read_from<R: Read>(mut read: R) -> Result<(Header, bool)> {
        let mut magic_bytes = [0u8; 4];
        from_io(read.read_exact(&mut magic_bytes))?;
        let le = u32::from_le_bytes(magic_bytes);
        let be = u32::from_be_bytes(magic_bytes);
        let file_is_big_endian = if le == MAGIC {
            false
        } else if be == MAGIC {
            true
        } else {
            return Err(Error::InvalidFile);
        };
        let flip = file_is_big_endian != !crate::byte_order::is_native_little_endian();

        if file_is_big_endian {
            Header::read_fields::<_, BigEndian>(read)
        } else {
            Header::read_fields::<_, LittleEndian>(read)
        }
        .map(|header| (header, flip))
    }

    fn read_fields<R: Read, E: byteorder::ByteOrder>(mut read: R) -> Result<Header> {
        let _version = from_io(read.read_i32::<E>())?;
        let _header_length = from_io(read.read_i32::<E>())?;
        let _reserved = from_io(read.read_i32::<E>())?;

        let info = read_fixed_str(&mut read, INFO_LEN)?;
        let source = read_fixed_str(&mut read, SOURCE_LEN)?;
        let date = read_fixed_str(&mut read, DATE_LEN)?;

        let lat_dir = LatDirection::from_i32(from_io(read.read_i32::<E>())?);
        let lon_dir = LonDirection::from_i32(from_io(read.read_i32::<E>())?);

        let nrows = from_io(read.read_i32::<E>())?;
        let ncols = from_io(read.read_i32::<E>())?;

        let lat_south = from_io(read.read_f64::<E>())?;
        let lat_north = from_io(read.read_f64::<E>())?;
        let lon_west = from_io(read.read_f64::<E>())?;
        let lon_east = from_io(read.read_f64::<E>())?;

        let lat_delta = from_io(read.read_f64::<E>())?;
        let lon_delta = from_io(read.read_f64::<E>())?;

        let horz_scale = from_io(read.read_f64::<E>())?;
        let vert_scale = from_io(read.read_f64::<E>())?;

        let from_gcs = read_fixed_str(&mut read, NAME_LEN)?;
        let from_vcs = read_fixed_str(&mut read, NAME_LEN)?;
        let from_semi_major = from_io(read.read_f64::<E>())?;
        let from_flattening = from_io(read.read_f64::<E>())?;

        let to_gcs = read_fixed_str(&mut read, NAME_LEN)?;
        let to_vcs = read_fixed_str(&mut read, NAME_LEN)?;
        let to_semi_major = from_io(read.read_f64::<E>())?;
        let to_flattening = from_io(read.read_f64::<E>())?;

        Ok(Header {
            info,
            source,
            date,
            lat_dir,
            lon_dir,
            nrows,
            ncols,
            lat_south,
            lat_north,
            lon_west,
            lon_east,
            lat_delta,
            lon_delta,
            horz_scale,
            vert_scale,
            from_gcs,
            from_vcs,
            from_semi_major,
            from_flattening,
            to_gcs,
            to_vcs,
            to_semi_major,
            to_flattening,
        })
    }

    /// Writes this header as `big_endian` (or the host's native order if
    /// `big_endian` is `None`, which is how `ByteOrder::Native` is
    /// realized).
    ///
    /// `nrows`/`ncols`/the four extent bounds are taken from the caller
    /// (the [`crate::Grid`]'s current in-memory extent) rather than from
    /// `self`, since a grid's extent can shrink via cropping after its
    /// header was read; `self`'s own `nrows`/`ncols`/extent fields are
    /// otherwise unused by the writer.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn write_to<W: Write>(
        &self,
        mut write: W,
        big_endian: bool,
        nrows: i32,
        ncols: i32,
        lat_min: f64,
        lat_max: f64,
        lon_min: f64,
        lon_max: f64,
    ) -> Result<()> {
        if big_endian {
            self.write_fields::<_, BigEndian>(
                &mut write, nrows, ncols, lat_min, lat_max, lon_min, lon_max,
            )
        } else {
            self.write_fields::<_, LittleEndian>(
                &mut write, nrows, ncols, lat_min, lat_max, lon_min, lon_max,
            )
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn write_fields<W: Write, E: byteorder::ByteOrder>(
        &self,
        write: &mut W,
        nrows: i32,
        ncols: i32,
        lat_min: f64,
        lat_max: f64,
        lon_min: f64,
        lon_max: f64,
    ) -> Result<()> {
        write.write_i32::<E>(VERSION)?;
        write.write_i32::<E>(HEADER_SIZE as i32)?;
        write.write_i32::<E>(0)?; // reserved

        write_fixed_str(write, "info", &self.info, INFO_LEN)?;
        write_fixed_str(write, "source", &self.source, SOURCE_LEN)?;
        write_fixed_str(write, "date", &self.date, DATE_LEN)?;

        write.write_i32::<E>(self.lat_dir.as_i32())?;
        write.write_i32::<E>(self.lon_dir.as_i32())?;

        write.write_i32::<E>(nrows)?;
        write.write_i32::<E>(ncols)?;

        write.write_f64::<E>(lat_min)?;
        write.write_f64::<E>(lat_max)?;
        write.write_f64::<E>(lon_min)?;
        write.write_f64::<E>(lon_max)?;

        write.write_f64::<E>(self.lat_delta)?;
        write.write_f64::<E>(self.lon_delta)?;

        write.write_f64::<E>(self.horz_scale)?;
        write.write_f64::<E>(self.vert_scale)?;

        write_fixed_str(write, "from_gcs", &self.from_gcs, NAME_LEN)?;
        write_fixed_str(write, "from_vcs", &self.from_vcs, NAME_LEN)?;
        write.write_f64::<E>(self.from_semi_major)?;
        write.write_f64::<E>(self.from_flattening)?;

        write_fixed_str(write, "to_gcs", &self.to_gcs, NAME_LEN)?;
        write_fixed_str(write, "to_vcs", &self.to_vcs, NAME_LEN)?;
        write.write_f64::<E>(self.to_semi_major)?;
        write.write_f64::<E>(self.to_flattening)?;

        // magic is written separately by the caller, ahead of everything
        // above, since its own byte order is what identifies the file's
        // endianness on a later read.
        Ok(())
    }
}

/// Writes the magic number, in the requested byte order.
pub(crate) fn write_magic<W: Write>(mut write: W, big_endian: bool) -> Result<()> {
    if big_endian {
        write.write_u32::<BigEndian>(MAGIC)?;
    } else {
        write.write_u32::<LittleEndian>(MAGIC)?;
    }
    Ok(())
}

fn read_fixed_str<R: Read>(read: &mut R, width: usize) -> Result<String> {
    let mut buf = vec![0u8; width];
    from_io(read.read_exact(&mut buf))?;
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
}

fn write_fixed_str<W: Write>(
    write: &mut W,
    field: &'static str,
    value: &str,
    width: usize,
) -> Result<()> {
    let bytes = value.as_bytes();
    if bytes.len() > width {
        return Err(Error::TooLong { field, max: width });
    }
    let mut buf = vec![0u8; width];
    buf[..bytes.len()].copy_from_slice(bytes);
    write.write_all(&buf)?;
    Ok(())
}
