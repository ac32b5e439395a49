use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::directory::Directory;
use crate::entry::Entry;
use crate::error::{PkgError, Result};
use crate::format::{
    read_entry_fixed, write_entry_record, write_terminator_record, COPY_CHUNK_SIZE,
    MAX_NAME_LENGTH,
};

/// Outcome of a [`Container::write_all`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackSummary {
    /// Bytes written for the directory, terminator included.
    pub header_bytes: usize,
    /// Payload bytes copied from all sources.
    pub payload_bytes: u64,
    /// Entries whose source ran dry before their declared length.
    pub short_entries: usize,
}

/// Binds a container stream to a [`Directory`] and drives serialization.
///
/// A container is used either to *read* a directory from `stream`
/// ([`parse_directory`](Container::parse_directory),
/// [`read_directory`](Container::read_directory)) or to *build and write* a
/// package ([`append_entry`](Container::append_entry) then
/// [`write_all`](Container::write_all)), not both.
///
/// Sources are borrowed for `'a`: the compiler guarantees each one stays
/// alive until the container, and therefore the write pass, is gone. The
/// stream is held by value; pass `&mut File` or `&mut Cursor<_>` to keep
/// ownership with the caller, or recover it with
/// [`into_inner`](Container::into_inner).
pub struct Container<'a, S> {
    directory: Directory,
    /// Entry index -> payload source. Ordered so the write pass visits
    /// sources in directory order.
    sources: BTreeMap<usize, &'a mut dyn Read>,
    stream: S,
}

impl<'a, S> Container<'a, S> {
    /// Creates a container over `stream` with an empty, version 0 directory.
    pub fn new(stream: S) -> Self {
        Self::with_directory(stream, Directory::default())
    }

    /// Creates a container over `stream` that will build on `directory`.
    pub fn with_directory(stream: S, directory: Directory) -> Self {
        Self {
            directory,
            sources: BTreeMap::new(),
            stream,
        }
    }

    /// Adds an item to the directory and maps `source` to it for the write
    /// pass. Returns the new entry's index.
    ///
    /// The entry starts with a placeholder offset of 0; the directory
    /// recomputes the real layout of every entry as part of the append.
    ///
    /// # Errors
    ///
    /// Returns [`PkgError::OffsetOverflow`] if the item does not fit in a
    /// 32-bit addressable package. Nothing is recorded in that case.
    pub fn append_entry(
        &mut self,
        name: impl AsRef<[u8]>,
        length: u32,
        source: &'a mut dyn Read,
    ) -> Result<usize> {
        let index = self.directory.item_count();
        self.directory.append(Entry::new(name, 0, length))?;
        self.sources.insert(index, source);
        Ok(index)
    }

    /// Returns the entry at `index` of the internal directory.
    pub fn get(&self, index: usize) -> Result<&Entry> {
        self.directory.get(index)
    }

    #[must_use]
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Mutable access to the internal directory.
    ///
    /// Entries appended here have no source; [`write_all`](Container::write_all)
    /// rejects them.
    pub fn directory_mut(&mut self) -> &mut Directory {
        &mut self.directory
    }

    /// Consumes the container and returns the stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<'a, S: Read> Container<'a, S> {
    /// Reads bytes one at a time into `buf` until a NUL is read or `buf` is
    /// full. Returns the number of non-NUL bytes stored.
    ///
    /// When the string in the stream is longer than `buf`, reading stops at
    /// `buf.len()` bytes and neither the excess bytes nor the NUL are
    /// consumed. The stream is then positioned mid-name.
    ///
    /// # Errors
    ///
    /// Any I/O error, including end of stream before the NUL or the limit.
    pub fn read_bounded_cstring(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut length = 0;
        for slot in buf.iter_mut() {
            let byte = self.stream.read_u8()?;
            *slot = byte;
            if byte == 0 {
                break;
            }
            length += 1;
        }
        Ok(length)
    }

    /// Reads entry records from the current position until the terminator
    /// sentinel and returns them as a fresh [`Directory`].
    ///
    /// The version field is **not** read: the stream must already be
    /// positioned on the first entry record. Use
    /// [`read_directory`](Container::read_directory) to read a directory as
    /// written by [`write_directory`](Container::write_directory).
    ///
    /// Parsed entries go through [`Directory::append`], so their offsets are
    /// the recomputed layout rather than the stored values. A clean end of
    /// stream at a record boundary also ends the directory.
    ///
    /// # Errors
    ///
    /// I/O errors, including a stream that ends inside a record.
    pub fn parse_directory(&mut self) -> Result<Directory> {
        let mut directory = Directory::default();
        let mut name = [0u8; MAX_NAME_LENGTH];

        while let Some((offset, length)) = read_entry_fixed(&mut self.stream)? {
            let name_len = self.read_bounded_cstring(&mut name)?;
            let entry = Entry::new(&name[..name_len], offset, length);
            if entry.is_empty() {
                break;
            }
            directory.append(entry)?;
        }

        Ok(directory)
    }

    /// Reads the version field followed by the entry records.
    pub fn read_directory(&mut self) -> Result<Directory> {
        let version = self.stream.read_i32::<LittleEndian>()?;
        let mut directory = self.parse_directory()?;
        directory.set_version(version);
        Ok(directory)
    }
}

impl<'a, S: Write + Seek> Container<'a, S> {
    /// Serializes `directory` at the current stream position: the version,
    /// then each entry's offset, length and NUL-terminated name.
    ///
    /// No terminator record is written; see
    /// [`write_terminator`](Container::write_terminator).
    pub fn write_directory(&mut self, directory: &Directory) -> Result<()> {
        write_directory_to(&mut self.stream, directory)?;
        Ok(())
    }

    /// Writes the nine-byte terminator record at the current position.
    pub fn write_terminator(&mut self) -> Result<()> {
        write_terminator_record(&mut self.stream)?;
        Ok(())
    }

    /// Seeks to `entry.offset()` from the start of the stream and writes
    /// `data` there.
    ///
    /// `data` is not checked against `entry.length()`. Writing more than the
    /// gap to the next entry overwrites that entry's payload.
    pub fn write_payload(&mut self, entry: &Entry, data: &[u8]) -> Result<()> {
        write_payload_at(&mut self.stream, entry, 0, data)?;
        Ok(())
    }

    /// Writes the complete package: directory and terminator from the start
    /// of the stream, then every entry's payload copied from its source.
    ///
    /// Each payload is copied in chunks of at most [`COPY_CHUNK_SIZE`] bytes
    /// and never more than the entry's declared length. A source that runs
    /// out early leaves the rest of its region untouched; this is logged and
    /// counted in [`PackSummary::short_entries`], not treated as an error.
    ///
    /// # Errors
    ///
    /// [`PkgError::MissingSource`] if some entry has no source (checked
    /// before anything is written), or any I/O error from the stream or a
    /// source.
    pub fn write_all(&mut self) -> Result<PackSummary> {
        let Self {
            directory,
            sources,
            stream,
        } = self;

        if let Some(index) = (0..directory.item_count()).find(|i| !sources.contains_key(i)) {
            return Err(PkgError::MissingSource { index });
        }

        stream.seek(SeekFrom::Start(0))?;
        write_directory_to(stream, directory)?;
        write_terminator_record(stream)?;

        let mut summary = PackSummary {
            header_bytes: directory.calc_size(),
            ..PackSummary::default()
        };
        let mut buffer = [0u8; COPY_CHUNK_SIZE];

        for (index, entry) in directory.iter().enumerate() {
            let Some(source) = sources.get_mut(&index) else {
                return Err(PkgError::MissingSource { index });
            };

            let copied = copy_payload(stream, entry, &mut **source, &mut buffer)?;
            summary.payload_bytes += copied;

            if copied < u64::from(entry.length()) {
                summary.short_entries += 1;
                warn!(
                    "source for '{}' ended after {} of {} bytes",
                    entry.name_lossy(),
                    copied,
                    entry.length()
                );
            } else {
                debug!(
                    "wrote {} bytes for '{}' at offset {}",
                    copied,
                    entry.name_lossy(),
                    entry.offset()
                );
            }
        }

        stream.flush()?;
        Ok(summary)
    }
}

fn write_directory_to<W: Write>(w: &mut W, directory: &Directory) -> io::Result<()> {
    w.write_i32::<LittleEndian>(directory.version())?;
    for entry in directory {
        write_entry_record(w, entry.offset(), entry.length(), entry.name())?;
    }
    Ok(())
}

/// Seeks to `at` bytes past `entry.offset()` and writes `data` there.
fn write_payload_at<W: Write + Seek>(
    stream: &mut W,
    entry: &Entry,
    at: u64,
    data: &[u8],
) -> io::Result<()> {
    stream.seek(SeekFrom::Start(u64::from(entry.offset()) + at))?;
    stream.write_all(data)
}

/// Copies at most `entry.length()` bytes from `source` to the entry's region
/// of `stream`, one chunk at a time. Returns the number of bytes copied.
fn copy_payload<W, R>(
    stream: &mut W,
    entry: &Entry,
    source: &mut R,
    buffer: &mut [u8],
) -> io::Result<u64>
where
    W: Write + Seek,
    R: Read + ?Sized,
{
    let declared = u64::from(entry.length());
    let mut copied = 0u64;

    while copied < declared {
        let want = (declared - copied).min(buffer.len() as u64) as usize;
        let n = match source.read(&mut buffer[..want]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        write_payload_at(stream, entry, copied, &buffer[..n])?;
        copied += n as u64;
    }

    Ok(copied)
}
