//! Section geometry of a position-independent image.
//!
//! The build/link step partitions the image into four contiguous byte
//! ranges (code, indirection table, initialized data, uninitialized data)
//! and exposes each as a start/end boundary-symbol pair. This module holds
//! the in-memory form of those ranges and the classification logic that
//! decides, for a raw indirection-table entry, which range it belongs to.

/// Size of a machine word in bytes.
///
/// Sections are word-aligned and sized in whole words by caller contract;
/// every copy, zero and patch operates one word at a time.
pub const WORD_SIZE: usize = size_of::<usize>();

/// A half-open `[start, end)` range of byte offsets, expressed relative to
/// the image's link-time origin.
///
/// Both boundaries are assumed to be word-aligned. This is enforced by the
/// build step, not checked here in release builds; [`crate::relocate`]
/// debug-asserts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRange {
    start: usize,
    end: usize,
}

impl SectionRange {
    /// Creates a range from its boundary offsets.
    pub const fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// The inclusive start offset.
    #[inline]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// The exclusive end offset.
    #[inline]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Length of the range in bytes.
    #[inline]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Length of the range in machine words.
    #[inline]
    pub const fn word_count(&self) -> usize {
        self.len() / WORD_SIZE
    }

    /// Whether `value` falls inside the range.
    ///
    /// The start is included and the end is excluded; the build step uses the
    /// same convention, and mismatching it would silently misclassify
    /// boundary-adjacent table entries.
    #[inline]
    pub const fn contains(&self, value: usize) -> bool {
        value >= self.start && value < self.end
    }

    pub(crate) const fn is_word_aligned(&self) -> bool {
        self.start % WORD_SIZE == 0 && self.end % WORD_SIZE == 0
    }
}

/// The section a relocatable table entry resolves into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Code; stays in the read-only image, only re-based.
    Text,
    /// Initialized data; moves to the migrated copy in RAM.
    Data,
    /// Uninitialized data; moves to the zero-filled area in RAM.
    Bss,
}

/// The four section ranges of an image, as declared by the build step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLayout {
    /// Code range.
    pub text: SectionRange,
    /// Indirection-table (GOT) range.
    pub got: SectionRange,
    /// Initialized-data range.
    pub data: SectionRange,
    /// Uninitialized-data range.
    pub bss: SectionRange,
}

impl ImageLayout {
    /// Assembles a layout from the four ranges.
    pub const fn new(
        text: SectionRange,
        got: SectionRange,
        data: SectionRange,
        bss: SectionRange,
    ) -> Self {
        Self {
            text,
            got,
            data,
            bss,
        }
    }

    /// Classifies a raw indirection-table entry against the three
    /// relocatable ranges. `None` means the entry refers to an unknown
    /// section and the image cannot be relocated.
    #[inline]
    pub fn classify(&self, value: usize) -> Option<Section> {
        if self.text.contains(value) {
            Some(Section::Text)
        } else if self.data.contains(value) {
            Some(Section::Data)
        } else if self.bss.contains(value) {
            Some(Section::Bss)
        } else {
            None
        }
    }

    /// Extent of the image in bytes: the largest end offset among the four
    /// ranges. The source window must cover at least this much.
    pub fn image_size(&self) -> usize {
        let mut size = self.text.end();
        for end in [self.got.end(), self.data.end(), self.bss.end()] {
            if end > size {
                size = end;
            }
        }
        size
    }

    /// Bytes of writable memory the relocated layout consumes: the migrated
    /// data, the zero-filled bss and the patched table, back to back.
    pub fn ram_size(&self) -> usize {
        self.data.len() + self.bss.len() + self.got.len()
    }

    /// Word alignment is a build-step contract; surface violations in debug
    /// builds instead of silently producing a skewed copy.
    pub(crate) fn debug_assert_word_aligned(&self) {
        debug_assert!(self.text.is_word_aligned(), "text range is not word-aligned");
        debug_assert!(self.got.is_word_aligned(), "got range is not word-aligned");
        debug_assert!(self.data.is_word_aligned(), "data range is not word-aligned");
        debug_assert!(self.bss.is_word_aligned(), "bss range is not word-aligned");
    }
}

/// Builds a [`SectionRange`] from a pair of linker boundary symbols.
///
/// The symbols carry no meaningful value, only an address; the macro binds
/// them and takes those addresses, which in a position-independent image are
/// offsets from the link-time origin.
///
/// ```rust,ignore
/// let data = pic_boot::section_range!(_sdata, _edata);
/// ```
#[macro_export]
macro_rules! section_range {
    ($start:ident, $end:ident) => {{
        unsafe extern "C" {
            static $start: u8;
            static $end: u8;
        }
        // Taking the address of a linker symbol never reads it.
        unsafe {
            $crate::SectionRange::new((&raw const $start) as usize, (&raw const $end) as usize)
        }
    }};
}
