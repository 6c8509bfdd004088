//! Bounds-checked windows over the two memory regions.
//!
//! The relocation touches exactly two disjoint regions: the read-only image
//! and the writable destination. Each gets a typed window carrying its
//! runtime base address and an explicit length, so every read and write is
//! checked against the window instead of trusting raw pointer arithmetic.
//! Raw addresses cross into the crate only through the `from_raw`
//! constructors; everything past them is safe code.

use crate::{
    Result,
    error::Error,
    layout::{SectionRange, WORD_SIZE},
};

/// A read-only view of the image as it sits in ROM.
///
/// Word index 0 corresponds to the image's link-time origin, so section
/// offsets from an [`crate::ImageLayout`] index the window directly; `base`
/// is the runtime address the image actually resides at and only matters
/// when re-basing code addresses.
#[derive(Debug)]
pub struct RomWindow<'rom> {
    base: usize,
    words: &'rom [usize],
}

impl<'rom> RomWindow<'rom> {
    /// Wraps an existing word slice. `base` is the runtime address of the
    /// first word.
    pub const fn new(base: usize, words: &'rom [usize]) -> Self {
        Self { base, words }
    }

    /// Builds a window over `len` bytes of raw memory starting at `addr`.
    ///
    /// # Safety
    /// `addr..addr + len` must be mapped, readable, word-aligned memory that
    /// nothing writes to for the lifetime of the window. `len` must be a
    /// multiple of [`WORD_SIZE`].
    pub unsafe fn from_raw(addr: usize, len: usize) -> Self {
        let words = unsafe { core::slice::from_raw_parts(addr as *const usize, len / WORD_SIZE) };
        Self { base: addr, words }
    }

    /// Runtime address of the image's first byte.
    #[inline]
    pub const fn base(&self) -> usize {
        self.base
    }

    /// Length of the window in bytes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.words.len() * WORD_SIZE
    }

    /// The words of one section, checked against the window.
    pub(crate) fn section(&self, range: SectionRange) -> Result<&'rom [usize]> {
        self.words
            .get(range.start() / WORD_SIZE..range.end() / WORD_SIZE)
            .ok_or(Error::SourceOutOfBounds {
                offset: range.end(),
                len: self.len(),
            })
    }
}

/// A writable view of the destination region with an advancing cursor.
///
/// Words are only ever appended at the cursor; the cursor strictly increases
/// and never steps outside the window, so a correctly sized window makes a
/// stray write impossible rather than merely unlikely.
#[derive(Debug)]
pub struct RamWindow<'ram> {
    base: usize,
    words: &'ram mut [usize],
    cursor: usize,
}

impl<'ram> RamWindow<'ram> {
    /// Wraps an existing word slice. `base` is the runtime address of the
    /// first word.
    pub fn new(base: usize, words: &'ram mut [usize]) -> Self {
        Self {
            base,
            words,
            cursor: 0,
        }
    }

    /// Builds a window over `len` bytes of raw memory starting at `addr`.
    ///
    /// # Safety
    /// `addr..addr + len` must be mapped, writable, word-aligned memory that
    /// nothing else reads or writes for the lifetime of the window. `len`
    /// must be a multiple of [`WORD_SIZE`].
    pub unsafe fn from_raw(addr: usize, len: usize) -> Self {
        let words =
            unsafe { core::slice::from_raw_parts_mut(addr as *mut usize, len / WORD_SIZE) };
        Self {
            base: addr,
            words,
            cursor: 0,
        }
    }

    /// Runtime address of the window's first word.
    #[inline]
    pub const fn base(&self) -> usize {
        self.base
    }

    /// Capacity of the window in bytes.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.words.len() * WORD_SIZE
    }

    /// Runtime address of the next free word.
    #[inline]
    pub const fn cursor(&self) -> usize {
        self.base + self.cursor * WORD_SIZE
    }

    /// Appends one word at the cursor.
    pub(crate) fn push(&mut self, word: usize) -> Result<()> {
        match self.words.get_mut(self.cursor) {
            Some(slot) => {
                *slot = word;
                self.cursor += 1;
                Ok(())
            }
            None => Err(Error::DestinationFull {
                needed: (self.cursor + 1) * WORD_SIZE,
                capacity: self.capacity(),
            }),
        }
    }
}
