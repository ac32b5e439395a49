//! Binary format constants and low-level field read/write helpers.
//!
//! ## Entry record
//!
//! ```text
//! [offset: u32 LE][length: u32 LE][name bytes][NUL]
//! ```
//!
//! ## Directory
//!
//! ```text
//! [version: i32 LE][entry record]*[terminator record]
//! ```
//!
//! The terminator is an entry record with `offset = 0`, `length = 0` and an
//! empty name, i.e. nine zero bytes.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Maximum number of name bytes stored for an entry (excluding the NUL).
pub const MAX_NAME_LENGTH: usize = 1024;

/// Size of the fixed fields of an entry record: 4 (`offset`) + 4 (`length`).
pub const ENTRY_FIXED_BYTES: usize = 4 + 4;

/// Size of the terminator entry: the fixed fields plus a lone NUL.
pub const EMPTY_ENTRY_SIZE: usize = ENTRY_FIXED_BYTES + 1;

/// Size of the directory version field.
pub const VERSION_BYTES: usize = 4;

/// Version stamp written by default.
pub const FORMAT_VERSION: i32 = 0;

/// Largest chunk copied from a source in one read during packing.
pub const COPY_CHUNK_SIZE: usize = 4096;

/// Writes one entry record (`offset`, `length`, NUL-terminated `name`) to `w`.
pub fn write_entry_record<W: Write>(
    w: &mut W,
    offset: u32,
    length: u32,
    name: &[u8],
) -> io::Result<()> {
    w.write_u32::<LittleEndian>(offset)?;
    w.write_u32::<LittleEndian>(length)?;
    w.write_all(name)?;
    w.write_u8(0)?;
    Ok(())
}

/// Writes the nine-byte terminator record.
pub fn write_terminator_record<W: Write>(w: &mut W) -> io::Result<()> {
    write_entry_record(w, 0, 0, &[])
}

/// Reads the fixed `(offset, length)` pair of an entry record.
///
/// Returns `Ok(None)` on a clean end of stream, i.e. when not a single byte
/// of the record is available. Running out of bytes part-way through the
/// pair is an [`io::ErrorKind::UnexpectedEof`] error.
pub fn read_entry_fixed<R: Read>(r: &mut R) -> io::Result<Option<(u32, u32)>> {
    let mut raw = [0u8; ENTRY_FIXED_BYTES];
    let mut filled = 0;
    while filled < raw.len() {
        match r.read(&mut raw[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    match filled {
        0 => Ok(None),
        n if n < raw.len() => Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "truncated directory entry",
        )),
        _ => {
            let mut fields = &raw[..];
            let offset = fields.read_u32::<LittleEndian>()?;
            let length = fields.read_u32::<LittleEndian>()?;
            Ok(Some((offset, length)))
        }
    }
}
