//! # BinPkg - Binary Package Container
//!
//! Bundles many independent byte streams (usually files) into one container
//! stream. A compact directory at the start of the stream records each item's
//! name, declared length and absolute payload offset, so a consumer can locate
//! any item after reading the directory once.
//!
//! The crate knows nothing about paths or the filesystem. Callers hand in
//! `(name, length, source)` triples and a destination stream; see
//! [`Container::append_entry`] and [`Container::write_all`].
//!
//! ## Container layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ DIRECTORY                                                     │
//! │                                                               │
//! │ version (i32)                                                 │
//! │                                                               │
//! │ offset (u32) | length (u32) | name | NUL                      │
//! │ ... repeated for each entry, in insertion order ...           │
//! │                                                               │
//! │ terminator: offset=0 | length=0 | NUL   (9 bytes)             │
//! ├───────────────────────────────────────────────────────────────┤
//! │ PAYLOAD SECTION                                               │
//! │                                                               │
//! │ entry 0 payload at entry 0 offset                             │
//! │ entry 1 payload at entry 0 offset + entry 0 length            │
//! │ ...                                                           │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. Names are at most
//! [`MAX_NAME_LENGTH`] bytes; longer names are truncated without error.
//!
//! ## Offsets
//!
//! The first payload starts right after the directory, so every entry's
//! offset depends on the size of the whole directory. Appending an entry
//! grows the directory and shifts every payload, which is why
//! [`Directory::append`] recomputes all offsets from scratch each time.
//!
//! ## Example
//!
//! ```rust
//! use binpkg::Container;
//! use std::io::Cursor;
//!
//! let mut first: &[u8] = b"hello";
//! let mut second: &[u8] = b"world!";
//!
//! let mut out = Cursor::new(Vec::new());
//! let mut pkg = Container::new(&mut out);
//! pkg.append_entry("a.txt", 5, &mut first).unwrap();
//! pkg.append_entry("b.txt", 6, &mut second).unwrap();
//! pkg.write_all().unwrap();
//! drop(pkg);
//!
//! out.set_position(0);
//! let mut reader = Container::new(&mut out);
//! let dir = reader.read_directory().unwrap();
//! assert_eq!(dir.item_count(), 2);
//! ```

mod container;
mod directory;
mod entry;
mod error;
mod format;

pub use container::{Container, PackSummary};
pub use directory::Directory;
pub use entry::Entry;
pub use error::{PkgError, Result};
pub use format::{
    COPY_CHUNK_SIZE, EMPTY_ENTRY_SIZE, FORMAT_VERSION, MAX_NAME_LENGTH, VERSION_BYTES,
};
