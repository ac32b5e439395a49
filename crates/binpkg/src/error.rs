use std::io;

use thiserror::Error;

/// Errors that can occur while building, writing or parsing a package.
#[derive(Debug, Error)]
pub enum PkgError {
    /// An underlying I/O error on the container stream or a source.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A directory index past the last entry.
    #[error("entry index {index} out of range (item count {count})")]
    IndexOutOfRange { index: usize, count: usize },

    /// The layout would place a payload beyond what a `u32` offset can address.
    #[error("entry offset {offset} exceeds the 32-bit offset range")]
    OffsetOverflow { offset: u64 },

    /// An entry has no source stream to copy its payload from.
    #[error("no source registered for entry {index}")]
    MissingSource { index: usize },
}

/// Shorthand for results carrying a [`PkgError`].
pub type Result<T> = std::result::Result<T, PkgError>;
