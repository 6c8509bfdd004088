//! Descriptor handoff and the entry trampoline.
//!
//! This is where raw addresses become windows, where the one reserved
//! register is written, and where control leaves the crate for good. The
//! fatal path lives here too: at this stage there is no runtime to report
//! to, so an unrecoverable condition either panics (hosted builds) or parks
//! the core permanently (freestanding builds).

use crate::{
    Result, arch,
    error::Error,
    layout::ImageLayout,
    region::{RamWindow, RomWindow},
    relocate::{Relocated, relocate},
};

/// The boot descriptor shared with the privileged loader and the entry
/// point.
///
/// The loader fills it in before invoking the bootstrap; the bootstrap
/// updates `unused_ram_start` to account for the relocated sections and
/// passes the descriptor on to the entry point, which owns it from then on.
/// Field order is part of the ABI with the loader.
#[repr(C)]
#[derive(Debug)]
pub struct BootInfo {
    /// Runtime address of the first byte of the read-only image.
    pub image_base: usize,
    /// First free word of writable memory. Input: where the relocated
    /// sections go. Output: where free memory begins after them.
    pub unused_ram_start: usize,
}

/// Entry point signature: receives the updated descriptor and, by contract,
/// never returns. The return type is deliberately not `!` so the trampoline
/// can still catch a misbehaving entry and park the core.
pub type Entry = unsafe extern "C" fn(info: *mut BootInfo);

/// Relocates the image described by `info` and prepares the handoff:
/// migrates data, zero-fills bss, patches the indirection table, installs
/// the table base in the reserved register and advances
/// [`BootInfo::unused_ram_start`] past the relocated sections.
///
/// On error the descriptor is left untouched and the register is not
/// written.
///
/// # Safety
/// `info.image_base` must point at a readable image laid out per `layout`,
/// and `info.unused_ram_start` at [`ImageLayout::ram_size`] bytes of
/// exclusively owned, word-aligned writable memory. Must be called at most
/// once per image; nothing may concurrently touch either region.
pub unsafe fn handoff(info: &mut BootInfo, layout: &ImageLayout) -> Result<Relocated> {
    let rom = unsafe { RomWindow::from_raw(info.image_base, layout.image_size()) };
    let mut ram = unsafe { RamWindow::from_raw(info.unused_ram_start, layout.ram_size()) };
    let relocated = relocate(&rom, layout, &mut ram)?;
    info.unused_ram_start = relocated.free_start;
    unsafe { arch::set_table_base(relocated.table_base) };
    log::info!(
        "handing off image at {:#x}, free memory starts at {:#x}",
        info.image_base,
        info.unused_ram_start
    );
    Ok(relocated)
}

/// Relocates the image and transfers control to its entry point.
///
/// This is the whole bootstrap in one call: stages 1–3 via [`handoff`],
/// then the jump. It never returns; if the relocation fails or the entry
/// point ever hands control back, the fatal path takes over.
///
/// # Safety
/// Everything [`handoff`] requires, plus: `entry` must be the image's
/// declared entry point, built against the same table-base register
/// convention this crate installs.
pub unsafe fn start(info: &mut BootInfo, layout: &ImageLayout, entry: Entry) -> ! {
    if let Err(err) = unsafe { handoff(info, layout) } {
        fatal(err);
    }
    unsafe { entry(info) };
    // The entry point exited; there is no caller context to fall through to.
    fatal(Error::EntryReturned)
}

/// The single configuration point for unrecoverable conditions.
///
/// Hosted builds (`hosted` feature, on by default) panic with the
/// diagnostic; freestanding builds have nothing to panic to and enter the
/// architecture's permanent wait state instead. Detection there is the
/// watchdog's or the operator's problem.
#[cold]
fn fatal(err: Error) -> ! {
    log::error!("boot failed: {err}");
    cfg_if::cfg_if! {
        if #[cfg(feature = "hosted")] {
            panic!("boot failed: {err}");
        } else {
            arch::halt()
        }
    }
}
