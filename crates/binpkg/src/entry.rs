use std::borrow::Cow;

use crate::format::{ENTRY_FIXED_BYTES, MAX_NAME_LENGTH};

/// Describes one packaged item: its name, payload offset and payload length.
///
/// The offset is owned by the [`Directory`](crate::Directory) the entry lives
/// in and is only meaningful after the directory has recomputed its layout.
/// The length is whatever the caller declared when adding the item; it is
/// never derived from the bytes actually copied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// Name bytes, never longer than [`MAX_NAME_LENGTH`] and free of NULs.
    name: Vec<u8>,
    /// Absolute byte offset of the payload in the container stream.
    offset: u32,
    /// Declared payload size in bytes.
    length: u32,
}

impl Entry {
    /// Creates an entry, truncating `name` to [`MAX_NAME_LENGTH`] bytes.
    ///
    /// Names are stored as C strings, so anything from the first NUL byte on
    /// is dropped as well. Neither case is reported as an error.
    pub fn new(name: impl AsRef<[u8]>, offset: u32, length: u32) -> Self {
        let name = name.as_ref();
        let end = name
            .iter()
            .take(MAX_NAME_LENGTH)
            .position(|&b| b == 0)
            .unwrap_or_else(|| name.len().min(MAX_NAME_LENGTH));

        Self {
            name: name[..end].to_vec(),
            offset,
            length,
        }
    }

    /// Raw name bytes, without the on-disk NUL terminator.
    #[must_use]
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// The name decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    pub(crate) fn set_offset(&mut self, offset: u32) {
        self.offset = offset;
    }

    /// Returns `true` if this is the terminator sentinel: zero offset, zero
    /// length and an empty name.
    ///
    /// A real item of length 0 at offset 0 with no name would be
    /// indistinguishable from the terminator. Entries laid out by a
    /// directory always start at or after the directory's own size, so they
    /// never collide with it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offset == 0 && self.length == 0 && self.name.is_empty()
    }

    /// Number of bytes this entry occupies inside the directory section:
    /// `offset` + `length` + name + NUL.
    ///
    /// This is metadata size, unrelated to [`length`](Entry::length).
    #[must_use]
    pub fn size(&self) -> usize {
        ENTRY_FIXED_BYTES + self.name.len() + 1
    }
}
