//! # pic-boot
//!
//! **pic-boot** is the trusted bootstrap step between a privileged loader and
//! a position-independent binary image: it copies the image's initialized
//! data out of read-only memory, zero-fills its uninitialized data, patches
//! its global indirection table (GOT) for the new layout, installs the table
//! base in the register the generated code expects it in, and jumps to the
//! image's entry point. It runs once, with nothing underneath it: no
//! operating system, no heap, no unwinding.
//!
//! The writable layout deliberately differs from the image's own ordering so
//! that everything placed in RAM stays contiguous and the free-memory pointer
//! is a single running cursor:
//!
//! ```text
//!                    ROM                                RAM
//!           +------------------+              +------------------+
//! image ->  |      .text       |     ram ->   |      .data       | <--+
//!           +------------------+              +------------------+    |
//!           |      .got        |---+          |      .bss        |    |
//!           +------------------+   |          +------------------+    |
//!           |      .data       |---+--------> |      .got        |----+
//!           +------------------+   |          +------------------+
//!           |      .bss        |   +--> free  |                  |
//!           +------------------+              +------------------+
//! ```
//!
//! Every copy, zero and patch goes through a bounds-checked window
//! ([`RomWindow`], [`RamWindow`]) over one of the two regions; raw addresses
//! enter the crate only through the windows' `from_raw` constructors and the
//! single register write in [`arch`].
//!
//! ## Quick Start
//!
//! ```rust
//! use pic_boot::{ImageLayout, RamWindow, RomWindow, SectionRange, WORD_SIZE, relocate};
//!
//! const W: usize = WORD_SIZE;
//!
//! // A tiny image: one code word, a one-entry table pointing at the data
//! // word, one data word, one uninitialized word.
//! let layout = ImageLayout::new(
//!     SectionRange::new(0, W),         // text
//!     SectionRange::new(W, 2 * W),     // got
//!     SectionRange::new(2 * W, 3 * W), // data
//!     SectionRange::new(3 * W, 4 * W), // bss
//! );
//! let rom_words: [usize; 3] = [0xb672, 2 * W, 0x1111_1111];
//! let rom = RomWindow::new(0x0800_0000, &rom_words);
//!
//! let mut ram_words = [0usize; 3];
//! let mut ram = RamWindow::new(0x2000_0000, &mut ram_words);
//!
//! let out = relocate(&rom, &layout, &mut ram).unwrap();
//! assert_eq!(out.data_base, 0x2000_0000);
//! assert_eq!(out.free_start, 0x2000_0000 + 3 * W);
//! // data copied, bss zeroed, table entry rebased onto the data destination
//! assert_eq!(ram_words, [0x1111_1111, 0, 0x2000_0000]);
//! ```
//!
//! On a real target the privileged loader hands over a [`BootInfo`] and the
//! link step provides the four boundary-symbol pairs; [`start`] then performs
//! the whole relocation and the no-return jump in one call.
#![no_std]
#![warn(
    clippy::unnecessary_wraps,
    clippy::unnecessary_lazy_evaluations,
    clippy::collapsible_if,
    clippy::cast_lossless,
    clippy::explicit_iter_loop,
    clippy::manual_assert,
    clippy::needless_question_mark,
    clippy::needless_return,
    clippy::redundant_clone,
    clippy::redundant_else,
    clippy::redundant_static_lifetimes
)]
#![allow(clippy::len_without_is_empty)]

pub mod arch;
pub mod boot;
mod error;
pub mod layout;
pub mod region;
pub mod relocate;

pub use boot::{BootInfo, Entry, handoff, start};
pub use error::Error;
pub use layout::{ImageLayout, Section, SectionRange, WORD_SIZE};
pub use region::{RamWindow, RomWindow};
pub use relocate::{Relocated, relocate};

/// A type alias for `Result`s returned by `pic_boot` functions.
///
/// This is a convenience alias that eliminates the need to repeatedly specify
/// the `Error` type in function signatures.
pub type Result<T> = core::result::Result<T, Error>;
