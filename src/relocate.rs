//! The three memory stages of the relocation.
//!
//! Control flows strictly migrate → zero-fill → patch; each stage appends to
//! the same destination cursor, so when the last stage finishes the cursor is
//! the new boundary of consumed writable memory.

use crate::{
    Result,
    error,
    layout::{ImageLayout, Section, SectionRange},
    region::{RamWindow, RomWindow},
};

/// Addresses produced by a completed relocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocated {
    /// Destination of the migrated initialized data.
    pub data_base: usize,
    /// Destination of the zero-filled uninitialized data.
    pub bss_base: usize,
    /// Destination of the patched indirection table; this is the value the
    /// table-base register must hold when the image runs.
    pub table_base: usize,
    /// First free word of writable memory after the relocation.
    pub free_start: usize,
}

/// Relocates one image: migrates its data, zero-fills its bss and patches
/// its indirection table into `ram`, in that order.
///
/// On success the destination holds `[data][bss][table]` back to back and
/// [`Relocated::free_start`] equals the window base plus
/// [`ImageLayout::ram_size`]. On failure the cursor stops at the faulting
/// word; nothing past it is written.
pub fn relocate(rom: &RomWindow, layout: &ImageLayout, ram: &mut RamWindow) -> Result<Relocated> {
    layout.debug_assert_word_aligned();
    let data_base = migrate_data(rom, layout.data, ram)?;
    let bss_base = zero_fill(layout.bss, ram)?;
    let table_base = relocate_table(rom, layout, data_base, bss_base, ram)?;
    let free_start = ram.cursor();
    log::debug!(
        "image at {:#x} relocated: data={data_base:#x} bss={bss_base:#x} got={table_base:#x} free={free_start:#x}",
        rom.base()
    );
    Ok(Relocated {
        data_base,
        bss_base,
        table_base,
        free_start,
    })
}

/// Copies the initialized-data section word by word out of the image.
/// Returns the destination base.
fn migrate_data(rom: &RomWindow, data: SectionRange, ram: &mut RamWindow) -> Result<usize> {
    let dest = ram.cursor();
    for &word in rom.section(data)? {
        ram.push(word)?;
    }
    log::debug!("migrated {} data bytes to {dest:#x}", data.len());
    Ok(dest)
}

/// Writes one zero word per word of the uninitialized-data section. Returns
/// the destination base. Does not touch the image.
fn zero_fill(bss: SectionRange, ram: &mut RamWindow) -> Result<usize> {
    let dest = ram.cursor();
    for _ in 0..bss.word_count() {
        ram.push(0)?;
    }
    log::debug!("zero-filled {} bss bytes at {dest:#x}", bss.len());
    Ok(dest)
}

/// Rewrites every indirection-table entry for the relocated layout. Returns
/// the destination base of the patched table.
///
/// Code addresses are re-based onto the image's runtime base (the code never
/// moves); data and bss addresses are re-based onto the sections' new homes
/// in RAM. An entry outside all three ranges is unrecoverable: there is no
/// way to know where it should point, so the stage stops at that entry.
fn relocate_table(
    rom: &RomWindow,
    layout: &ImageLayout,
    data_base: usize,
    bss_base: usize,
    ram: &mut RamWindow,
) -> Result<usize> {
    let dest = ram.cursor();
    for (index, &entry) in rom.section(layout.got)?.iter().enumerate() {
        let patched = match layout.classify(entry) {
            Some(Section::Text) => rom.base() + (entry - layout.text.start()),
            Some(Section::Data) => data_base + (entry - layout.data.start()),
            Some(Section::Bss) => bss_base + (entry - layout.bss.start()),
            None => return Err(error::unknown_entry(index, entry)),
        };
        ram.push(patched)?;
    }
    log::debug!(
        "patched {} table entries at {dest:#x}",
        layout.got.word_count()
    );
    Ok(dest)
}
