//! The in-memory grid: header, extent, node storage, and on-the-fly fetch.
//!
//! One struct owns a header plus either an inline node array or a locked
//! file handle, so the same fetch logic serves both a fully-buffered grid
//! and a streaming one backed by a single open file.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;

use log::debug;

use crate::byte_order::{self, ByteOrder};
use crate::error::{Error, Result};
use crate::extent::{self, Extent};
use crate::header::{self, Header, LatDirection, LonDirection};
use crate::node::{Node, NODE_SIZE};

/// Which format a path names, by extension alone -- no content sniffing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileType {
    /// `.gcb`
    Binary,
    /// `.gca` -- recognized, but this crate does not load or write it (see
    /// the crate documentation).
    Ascii,
    /// Anything else.
    Unknown,
}

/// Classifies `path` by its extension, case-insensitively.
pub fn filetype<P: AsRef<Path>>(path: P) -> FileType {
    match path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("gcb") => FileType::Binary,
        Some("gca") => FileType::Ascii,
        _ => FileType::Unknown,
    }
}

enum Storage {
    Empty,
    InMemory(Vec<Node>),
    Streaming {
        file: Mutex<File>,
        points_start: u64,
        /// Row/column count of the on-disk grid, before cropping -- needed
        /// because node records are laid out in the full grid's row-major
        /// order regardless of how much of it this `Grid` exposes.
        full_nrows: i32,
        full_ncols: i32,
        /// Rows/columns skipped at the south/west edge by cropping, zero if
        /// this grid was loaded without an extent.
        skip_south: i32,
        skip_west: i32,
    },
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Storage::Empty => write!(f, "Empty"),
            Storage::InMemory(nodes) => write!(f, "InMemory({} nodes)", nodes.len()),
            Storage::Streaming { .. } => write!(f, "Streaming"),
        }
    }
}

/// A loaded (or freshly created) GEOCON grid.
#[derive(Debug)]
pub struct Grid {
    header: Header,

    nrows: i32,
    ncols: i32,
    lat_min: f64,
    lat_max: f64,
    lon_min: f64,
    lon_max: f64,
    lat_delta: f64,
    lon_delta: f64,

    lat_min_ghost: f64,
    lat_max_ghost: f64,
    lon_min_ghost: f64,
    lon_max_ghost: f64,

    /// `true` if the file this grid was loaded from stores multi-byte
    /// scalars in non-native order. `false` for a freshly created or
    /// in-memory grid.
    flip: bool,

    storage: Storage,
}

fn ghost_bounds(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64, lat_delta: f64, lon_delta: f64) -> (f64, f64, f64, f64) {
    (lat_min - lat_delta, lat_max + lat_delta, lon_min - lon_delta, lon_max + lon_delta)
}

impl Grid {
    /// Creates an empty grid: a default header, zero rows/columns, no
    /// storage.
    pub fn create() -> Grid {
        Grid {
            header: Header::default(),
            nrows: 0,
            ncols: 0,
            lat_min: 0.0,
            lat_max: 0.0,
            lon_min: 0.0,
            lon_max: 0.0,
            lat_delta: 0.0,
            lon_delta: 0.0,
            lat_min_ghost: 0.0,
            lat_max_ghost: 0.0,
            lon_min_ghost: 0.0,
            lon_max_ghost: 0.0,
            flip: false,
            storage: Storage::Empty,
        }
    }

    /// Builds a grid directly from an already-decoded header and a
    /// row-major, S→N/W→E-ordered node array, skipping the binary codec
    /// entirely.
    ///
    /// This is the seam an external ascii-format collaborator would use,
    /// and how unit tests build small synthetic grids. Returns
    /// [`Error::NullParameter`] if `nodes.len() != header.nrows *
    /// header.ncols`.
    pub fn in_memory(header: Header, nodes: Vec<Node>) -> Result<Grid> {
        let nrows = header.nrows;
        let ncols = header.ncols;
        if nrows < 2 || ncols < 2 || nodes.len() != (nrows as usize) * (ncols as usize) {
            return Err(Error::NullParameter);
        }
        let lat_min = header.lat_south;
        let lat_max = header.lat_north;
        let lon_min = header.lon_west;
        let lon_max = header.lon_east;
        let (lat_min_ghost, lat_max_ghost, lon_min_ghost, lon_max_ghost) =
            ghost_bounds(lat_min, lat_max, lon_min, lon_max, header.lat_delta, header.lon_delta);
        Ok(Grid {
            lat_delta: header.lat_delta,
            lon_delta: header.lon_delta,
            header,
            nrows,
            ncols,
            lat_min,
            lat_max,
            lon_min,
            lon_max,
            lat_min_ghost,
            lat_max_ghost,
            lon_min_ghost,
            lon_max_ghost,
            flip: false,
            storage: Storage::InMemory(nodes),
        })
    }

    /// Loads a binary grid from `path`.
    ///
    /// If `extent` is given, the grid is cropped to it before any
    /// node data is touched. If `load_data` is `true`, every node is read
    /// eagerly and the file is closed; otherwise the header alone is read
    /// and the file is kept open behind a mutex for on-the-fly fetch.
    pub fn load<P: AsRef<Path>>(path: P, extent: Option<Extent>, load_data: bool) -> Result<Grid> {
        let path = path.as_ref();
        if filetype(path) != FileType::Binary {
            return Err(Error::UnknownFileType(path.to_path_buf()));
        }
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let mut file = File::open(path).map_err(|_| Error::CannotOpenFile(path.to_path_buf()))?;

        let (header, flip) = Header::read_from(&mut file)?;
        let header_size = header::HEADER_SIZE as u64;

        let full_nrows = header.nrows;
        let full_ncols = header.ncols;
        let full_lat_min = header.lat_south;
        let full_lat_max = header.lat_north;
        let full_lon_min = header.lon_west;
        let full_lon_max = header.lon_east;

        let (nrows, ncols, lat_min, lat_max, lon_min, lon_max, skip_south, skip_west) = match extent {
            Some(extent) => {
                let crop = extent::crop(
                    &extent,
                    full_nrows,
                    full_ncols,
                    full_lat_min,
                    full_lat_max,
                    full_lon_min,
                    full_lon_max,
                    header.lat_delta,
                    header.lon_delta,
                )?;
                (crop.nrows, crop.ncols, crop.lat_min, crop.lat_max, crop.lon_min, crop.lon_max, crop.skip_south, crop.skip_west)
            }
            None => (full_nrows, full_ncols, full_lat_min, full_lat_max, full_lon_min, full_lon_max, 0, 0),
        };

        let (lat_min_ghost, lat_max_ghost, lon_min_ghost, lon_max_ghost) =
            ghost_bounds(lat_min, lat_max, lon_min, lon_max, header.lat_delta, header.lon_delta);

        debug!(
            "loaded header from {}: {}x{} grid, flip={}",
            path.display(),
            full_nrows,
            full_ncols,
            flip
        );

        let storage = if load_data {
            let mut nodes = vec![Node::ZERO; (nrows as usize) * (ncols as usize)];
            let sequential = skip_south == 0
                && skip_west == 0
                && nrows == full_nrows
                && ncols == full_ncols
                && header.lat_dir == LatDirection::SouthToNorth
                && header.lon_dir == LonDirection::WestToEast;
            if sequential {
                // Uncropped, canonically-ordered file: node records are
                // already laid out in canonical row-major order, so one
                // sequential read covers the whole grid with no per-node
                // seek.
                file.seek(SeekFrom::Start(header_size))?;
                for node in nodes.iter_mut() {
                    *node = Node::read_from(&mut file, flip_means_big_endian(flip))?;
                }
            } else {
                for canonical_row in 0..nrows {
                    for canonical_col in 0..ncols {
                        let file_row = file_index(canonical_row + skip_south, header.lat_dir, full_nrows);
                        let file_col = file_index(canonical_col + skip_west, header.lon_dir, full_ncols);
                        let offset = header_size + (file_row as u64 * full_ncols as u64 + file_col as u64) * NODE_SIZE as u64;
                        file.seek(SeekFrom::Start(offset))?;
                        let node = Node::read_from(&mut file, flip_means_big_endian(flip))?;
                        nodes[(canonical_row as usize) * (ncols as usize) + canonical_col as usize] = node;
                    }
                }
            }
            Storage::InMemory(nodes)
        } else {
            Storage::Streaming {
                file: Mutex::new(file),
                points_start: header_size,
                full_nrows,
                full_ncols,
                skip_south,
                skip_west,
            }
        };

        Ok(Grid {
            lat_delta: header.lat_delta,
            lon_delta: header.lon_delta,
            header,
            nrows,
            ncols,
            lat_min,
            lat_max,
            lon_min,
            lon_max,
            lat_min_ghost,
            lat_max_ghost,
            lon_min_ghost,
            lon_max_ghost,
            flip,
            storage,
        })
    }

    /// Writes this grid to `path` in binary form, in `byte_order`.
    ///
    /// `nrows`/`ncols`/the extent bounds come from this grid's current (possibly
    /// cropped) in-memory state; node order on disk follows this grid's
    /// current `lat_dir`/`lon_dir`, which may differ from the order the
    /// grid was originally loaded in.
    pub fn write<P: AsRef<Path>>(&self, path: P, byte_order: ByteOrder) -> Result<()> {
        let path = path.as_ref();
        if filetype(path) != FileType::Binary {
            return Err(Error::UnknownFileType(path.to_path_buf()));
        }
        let big_endian = match byte_order {
            ByteOrder::Big => true,
            ByteOrder::Little => false,
            ByteOrder::Native => !byte_order::is_native_little_endian(),
            ByteOrder::SameAsSource => self.flip != !byte_order::is_native_little_endian(),
        };

        let file = File::create(path).map_err(|_| Error::CannotOpenFile(path.to_path_buf()))?;
        let mut write = BufWriter::new(file);

        header::write_magic(&mut write, big_endian)?;
        self.header.write_to(&mut write, big_endian, self.nrows, self.ncols, self.lat_min, self.lat_max, self.lon_min, self.lon_max)?;

        for file_row in 0..self.nrows {
            for file_col in 0..self.ncols {
                let canonical_row = canonical_index(file_row, self.header.lat_dir, self.nrows);
                let canonical_col = canonical_index(file_col, self.header.lon_dir, self.ncols);
                let node = self.fetch(canonical_row, canonical_col);
                node.write_to(&mut write, big_endian)?;
            }
        }
        write.flush()?;
        debug!("wrote grid to {}: {}x{}", path.display(), self.nrows, self.ncols);
        Ok(())
    }

    /// Reassigns the storage-order flags used on the next [`Grid::write`],
    /// without touching node storage (which stays canonical S→N/W→E).
    pub fn set_direction(&mut self, lat_dir: LatDirection, lon_dir: LonDirection) {
        self.header.lat_dir = lat_dir;
        self.header.lon_dir = lon_dir;
    }

    /// Closes any open file handle and frees node storage. Idempotent --
    /// calling this more than once, or calling it before drop, is safe.
    pub fn close(&mut self) {
        self.storage = Storage::Empty;
    }

    /// Current in-memory row count.
    pub fn nrows(&self) -> i32 {
        self.nrows
    }

    /// Current in-memory column count.
    pub fn ncols(&self) -> i32 {
        self.ncols
    }

    /// The header this grid was built or loaded from.
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub(crate) fn lat_min(&self) -> f64 {
        self.lat_min
    }

    pub(crate) fn lon_min(&self) -> f64 {
        self.lon_min
    }

    pub(crate) fn lat_delta(&self) -> f64 {
        self.lat_delta
    }

    pub(crate) fn lon_delta(&self) -> f64 {
        self.lon_delta
    }

    pub(crate) fn ghost_bounds(&self) -> (f64, f64, f64, f64) {
        (self.lat_min_ghost, self.lat_max_ghost, self.lon_min_ghost, self.lon_max_ghost)
    }

    pub(crate) fn horz_scale(&self) -> f64 {
        self.header.horz_scale
    }

    pub(crate) fn vert_scale(&self) -> f64 {
        self.header.vert_scale
    }

    /// Returns the node at `(row, col)` in this grid's canonical (S→N,
    /// W→E) in-memory indexing, or [`Node::ZERO`] if either index is
    /// outside `[0, nrows)` / `[0, ncols)` -- the ghost-cell policy.
    ///
    /// Exposed alongside [`Grid::in_memory`] as a building block for an
    /// external collaborator (e.g. an ascii writer) that needs raw node
    /// access without going through interpolation.
    pub fn node(&self, row: i32, col: i32) -> Node {
        self.fetch(row, col)
    }

    fn fetch(&self, row: i32, col: i32) -> Node {
        if row < 0 || row >= self.nrows || col < 0 || col >= self.ncols {
            return Node::ZERO;
        }
        match &self.storage {
            Storage::Empty => Node::ZERO,
            Storage::InMemory(nodes) => nodes[(row as usize) * (self.ncols as usize) + col as usize],
            Storage::Streaming { file, points_start, full_nrows, full_ncols, skip_south, skip_west } => {
                let file_row = file_index(row + skip_south, self.header.lat_dir, *full_nrows);
                let file_col = file_index(col + skip_west, self.header.lon_dir, *full_ncols);
                let offset = points_start + (file_row as u64 * *full_ncols as u64 + file_col as u64) * NODE_SIZE as u64;
                let mut guard = file.lock().unwrap_or_else(|poison| poison.into_inner());
                if guard.seek(SeekFrom::Start(offset)).is_err() {
                    return Node::ZERO;
                }
                Node::read_from(&mut *guard, flip_means_big_endian(self.flip)).unwrap_or(Node::ZERO)
            }
        }
    }
}

/// Whether a node/header read under `flip` should be decoded big-endian.
///
/// `flip` means "file order differs from native order", so the file is
/// big-endian exactly when the host is little-endian.
fn flip_means_big_endian(flip: bool) -> bool {
    flip == byte_order::is_native_little_endian()
}

/// Small trait so [`file_index`] can take either [`LatDirection`] or
/// [`LonDirection`] without duplicating the reversed-or-not logic twice.
trait StorageDirection {
    fn is_reversed(self) -> bool;
}

impl StorageDirection for LatDirection {
    fn is_reversed(self) -> bool {
        self == LatDirection::NorthToSouth
    }
}

impl StorageDirection for LonDirection {
    fn is_reversed(self) -> bool {
        self == LonDirection::EastToWest
    }
}

/// Maps a canonical (S→N, W→E) row or column index to its position in the
/// file, given the file's storage direction.
fn file_index<D: StorageDirection>(canonical: i32, dir: D, total: i32) -> i32 {
    if dir.is_reversed() {
        total - 1 - canonical
    } else {
        canonical
    }
}

/// Inverts [`file_index`]: given a file-order row or column index, returns
/// the canonical index. The mapping is its own inverse.
fn canonical_index<D: StorageDirection>(file: i32, dir: D, total: i32) -> i32 {
    file_index(file, dir, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::Header;

    fn sample_header(lat_dir: LatDirection, lon_dir: LonDirection) -> Header {
        Header {
            lat_dir,
            lon_dir,
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
        }
    }

    fn sample_nodes() -> Vec<Node> {
        vec![
            Node { lat_value: 0.0, lon_value: 0.0, hgt_value: 0.0 },
            Node { lat_value: 0.0, lon_value: 0.0, hgt_value: 0.0 },
            Node { lat_value: 0.0, lon_value: 0.0, hgt_value: 0.0 },
            Node { lat_value: 1.0, lon_value: 1.0, hgt_value: 1.0 },
        ]
    }

    #[test]
    fn fetch_returns_ghost_zero_out_of_range() {
        let grid = Grid::in_memory(sample_header(LatDirection::SouthToNorth, LonDirection::WestToEast), sample_nodes()).unwrap();
        assert_eq!(grid.fetch(-1, 0), Node::ZERO);
        assert_eq!(grid.fetch(0, 2), Node::ZERO);
    }

    #[test]
    fn fetch_returns_stored_node_in_range() {
        let grid = Grid::in_memory(sample_header(LatDirection::SouthToNorth, LonDirection::WestToEast), sample_nodes()).unwrap();
        assert_eq!(grid.fetch(1, 1).lat_value, 1.0);
        assert_eq!(grid.fetch(0, 0).lat_value, 0.0);
    }

    #[test]
    fn close_is_idempotent() {
        let mut grid = Grid::in_memory(sample_header(LatDirection::SouthToNorth, LonDirection::WestToEast), sample_nodes()).unwrap();
        grid.close();
        grid.close();
        assert_eq!(grid.fetch(0, 0), Node::ZERO);
    }

    #[test]
    fn filetype_is_case_insensitive() {
        assert_eq!(filetype("grid.GCB"), FileType::Binary);
        assert_eq!(filetype("grid.Gcb"), FileType::Binary);
        assert_eq!(filetype("grid.gca"), FileType::Ascii);
        assert_eq!(filetype("grid.txt"), FileType::Unknown);
    }

    #[test]
    fn file_index_reverses_only_when_requested() {
        assert_eq!(file_index(0, LatDirection::SouthToNorth, 4), 0);
        assert_eq!(file_index(0, LatDirection::NorthToSouth, 4), 3);
        assert_eq!(file_index(3, LatDirection::NorthToSouth, 4), 0);
    }
}
