//! Crate-specific errors.

use std::io;
use std::path::PathBuf;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Converts an I/O read failure into an [`Error`], distinguishing a
/// truncated file ([`Error::UnexpectedEof`]) from any other I/O failure
/// ([`Error::Io`]).
pub(crate) fn from_io<T>(result: io::Result<T>) -> Result<T> {
    result.map_err(|err| if err.kind() == io::ErrorKind::UnexpectedEof { Error::UnexpectedEof } else { Error::Io(err) })
}

/// Everything that can go wrong loading, writing, or building a [`crate::Grid`].
///
/// The variant set mirrors the error taxonomy of the underlying GEOCON
/// format: every failure a loader or writer can report maps to exactly one
/// of these. `transform` never fails on a valid grid -- out-of-range points
/// are simply skipped, per the ghost-cell policy.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Wraps `std::io::Error`.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// A points array or header buffer could not be allocated.
    ///
    /// Rust's allocator aborts on real allocation failure, so in practice
    /// this variant is only returned when a declared grid size is so large
    /// that `nrows * ncols` would overflow `usize`.
    #[error("no memory for a grid of the requested size")]
    NoMemory,

    /// A required argument was absent (e.g. an empty coordinate slice where
    /// one was expected).
    #[error("null or missing required parameter")]
    NullParameter,

    /// The requested crop extent is degenerate or does not intersect the
    /// grid's extent.
    #[error("invalid extent")]
    InvalidExtent,

    /// The path given to [`crate::Grid::load`] does not exist.
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    /// The file's magic number did not match `GCON` (or its byte-swapped
    /// form) once the header was read.
    #[error("invalid GEOCON file")]
    InvalidFile,

    /// The file exists but could not be opened (permissions, etc).
    #[error("cannot open file: {0}")]
    CannotOpenFile(PathBuf),

    /// The path's extension is neither `gcb` nor `gca`.
    #[error("unknown filetype: {0}")]
    UnknownFileType(PathBuf),

    /// The file ended before the header or the declared number of node
    /// records had been fully read.
    #[error("unexpected end of file")]
    UnexpectedEof,

    /// An ascii record did not tokenize to the expected field count.
    ///
    /// This crate does not implement the ascii codec itself (see the crate
    /// documentation), but the variant is part of the public error taxonomy
    /// so that an external ascii collaborator built on [`crate::Header`] and
    /// [`crate::Node`] can report failures through the same `Error` type.
    #[error("invalid token count on line {line}")]
    InvalidTokenCount {
        /// 1-based line number within the ascii file.
        line: usize,
    },

    /// A caller-supplied string exceeded a header field's fixed width.
    #[error("{field} is longer than {max} bytes")]
    TooLong {
        /// Name of the offending header field.
        field: &'static str,
        /// Maximum width of that field, in bytes.
        max: usize,
    },
}
