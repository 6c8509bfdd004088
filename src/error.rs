use core::fmt;

/// Errors surfaced while relocating an image.
///
/// All of them are terminal at boot time: the caller of [`crate::start`]
/// never sees them because the fatal path takes over, but the lower-level
/// operations ([`crate::relocate`], [`crate::handoff`]) report them so hosted
/// builds and tests can observe exactly where a relocation went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An indirection-table entry referred to none of the declared text,
    /// data and bss ranges. There is no way to determine where such an
    /// entry should point after relocation.
    UnknownTableEntry {
        /// Word index of the entry within the table.
        index: usize,
        /// The link-time value of the entry.
        value: usize,
    },
    /// A section read fell outside the read-only source window.
    SourceOutOfBounds {
        /// End offset of the attempted read, relative to the image origin.
        offset: usize,
        /// Length of the source window in bytes.
        len: usize,
    },
    /// A write would have advanced the cursor past the destination window.
    DestinationFull {
        /// Total bytes the write would have consumed.
        needed: usize,
        /// Capacity of the destination window in bytes.
        capacity: usize,
    },
    /// The entry point returned control to the bootstrap.
    EntryReturned,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownTableEntry { index, value } => write!(
                f,
                "indirection-table entry {index} ({value:#x}) lies outside the text, data and bss ranges"
            ),
            Error::SourceOutOfBounds { offset, len } => write!(
                f,
                "section read up to offset {offset:#x} exceeds the {len}-byte source window"
            ),
            Error::DestinationFull { needed, capacity } => write!(
                f,
                "destination window exhausted: {needed} bytes needed, capacity is {capacity}"
            ),
            Error::EntryReturned => write!(f, "entry point returned control to the bootstrap"),
        }
    }
}

impl core::error::Error for Error {}

/// Builds the classification failure out of the hot loop.
#[cold]
#[inline(never)]
pub(crate) fn unknown_entry(index: usize, value: usize) -> Error {
    Error::UnknownTableEntry { index, value }
}
