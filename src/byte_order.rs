//! Byte-order detection and the four output byte-order choices a writer can
//! request.
//!
//! The binary codec reads and writes every multi-byte scalar through
//! `byteorder`'s `BigEndian`/`LittleEndian` readers and writers, so no manual
//! bit-twiddling swap is needed for the header or node fields themselves.
//! What remains here is the small bit of bookkeeping the format needs on top
//! of that: knowing the host's native order, to implement `ByteOrder::Native`
//! and `ByteOrder::SameAsSource`.

/// The byte order a [`crate::Grid`] should be written in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ByteOrder {
    /// Big-endian, regardless of host or source file order.
    Big,
    /// Little-endian, regardless of host or source file order.
    Little,
    /// The order of the machine doing the writing.
    #[default]
    Native,
    /// The byte order the grid was loaded in (native, if the grid was not
    /// loaded from a binary file).
    SameAsSource,
}

/// Returns `true` if this host stores integers little-endian.
///
/// The magic number at the head of every file is written in the writer's
/// native order, so a reader detects a foreign-endian file just by
/// comparing the raw bytes against both the native and byte-swapped magic
/// constants; a writer that wants `ByteOrder::Native` or an explicit
/// `ByteOrder::Big`/`ByteOrder::Little` needs to know which one native is.
pub fn is_native_little_endian() -> bool {
    cfg!(target_endian = "little")
}
