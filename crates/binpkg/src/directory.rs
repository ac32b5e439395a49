use log::debug;

use crate::entry::Entry;
use crate::error::{PkgError, Result};
use crate::format::{EMPTY_ENTRY_SIZE, FORMAT_VERSION, VERSION_BYTES};

/// The package header: an ordered list of entries plus a format version.
///
/// Insertion order is on-disk order and payload order. The terminator entry
/// is implicit; it is accounted for in [`calc_size`](Directory::calc_size)
/// but never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    entries: Vec<Entry>,
    /// Version of the package format, kept for forward compatibility.
    version: i32,
}

impl Default for Directory {
    fn default() -> Self {
        Self::new(FORMAT_VERSION)
    }
}

impl Directory {
    /// Creates an empty directory stamped with `version`.
    pub fn new(version: i32) -> Self {
        Self {
            entries: Vec::new(),
            version,
        }
    }

    #[must_use]
    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn set_version(&mut self, version: i32) {
        self.version = version;
    }

    /// Number of entries, excluding the implicit terminator.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.entries.len()
    }

    /// Exact byte length of the serialized directory: version field, every
    /// entry record and the terminator record.
    #[must_use]
    pub fn calc_size(&self) -> usize {
        self.entries
            .iter()
            .fold(EMPTY_ENTRY_SIZE + VERSION_BYTES, |acc, e| acc + e.size())
    }

    /// Appends `entry` and recomputes every entry's offset.
    ///
    /// The directory grows by `entry.size()` bytes, which moves the start of
    /// the payload section, so all previously assigned offsets are stale and
    /// the layout is derived again from scratch.
    ///
    /// # Errors
    ///
    /// Returns [`PkgError::OffsetOverflow`] if the new layout places any
    /// payload byte beyond the `u32` range. The directory is left unchanged.
    pub fn append(&mut self, entry: Entry) -> Result<()> {
        self.entries.push(entry);
        if let Err(e) = self.update_offsets() {
            self.entries.pop();
            self.update_offsets()?;
            return Err(e);
        }
        Ok(())
    }

    /// Returns the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PkgError::IndexOutOfRange`] when `index >= item_count()`.
    pub fn get(&self, index: usize) -> Result<&Entry> {
        self.entries.get(index).ok_or(PkgError::IndexOutOfRange {
            index,
            count: self.entries.len(),
        })
    }

    /// All entries, in on-disk order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Offset one past the last payload byte, i.e. the size of a fully
    /// written package. Equals [`calc_size`](Directory::calc_size) when the
    /// directory is empty.
    #[must_use]
    pub fn payload_end(&self) -> u64 {
        match self.entries.last() {
            Some(last) => u64::from(last.offset()) + u64::from(last.length()),
            None => self.calc_size() as u64,
        }
    }

    /// Lays the payloads out back to back, starting right after the
    /// directory.
    fn update_offsets(&mut self) -> Result<()> {
        let mut offset = self.calc_size() as u64;
        let mut previous_length = None;

        for entry in &mut self.entries {
            if let Some(len) = previous_length {
                offset += u64::from(len);
            }
            let Ok(narrow) = u32::try_from(offset) else {
                return Err(PkgError::OffsetOverflow { offset });
            };
            entry.set_offset(narrow);
            previous_length = Some(entry.length());
        }

        let end = self.payload_end();
        if end > u64::from(u32::MAX) {
            return Err(PkgError::OffsetOverflow { offset: end });
        }

        debug!(
            "directory layout: {} entries, header {} bytes, payload end {}",
            self.entries.len(),
            self.calc_size(),
            end
        );
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Directory {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
