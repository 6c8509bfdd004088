use pic_boot::{
    BootInfo, Error, ImageLayout, RamWindow, RomWindow, SectionRange, WORD_SIZE, handoff,
    relocate, start,
};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicUsize, Ordering};

const W: usize = WORD_SIZE;

const ROM_BASE: usize = 0x0800_0000;
const RAM_BASE: usize = 0x2000_0000;

/// Code-word filler for the parts of a synthetic image no stage reads.
const FILLER: usize = 0xC0DE;

/// A layout with the four sections packed back to back in the image's own
/// order, sized in words.
fn packed_layout(text_w: usize, got_w: usize, data_w: usize, bss_w: usize) -> ImageLayout {
    let text = SectionRange::new(0, text_w * W);
    let got = SectionRange::new(text.end(), text.end() + got_w * W);
    let data = SectionRange::new(got.end(), got.end() + data_w * W);
    let bss = SectionRange::new(data.end(), data.end() + bss_w * W);
    ImageLayout::new(text, got, data, bss)
}

/// Builds the words of a synthetic image for `layout`, with the given table
/// entries and initialized data in place.
fn build_rom(layout: &ImageLayout, got_entries: &[usize], data: &[usize]) -> Vec<usize> {
    let mut words = vec![FILLER; layout.image_size() / W];
    words[layout.got.start() / W..layout.got.end() / W].copy_from_slice(got_entries);
    words[layout.data.start() / W..layout.data.end() / W].copy_from_slice(data);
    words
}

#[test]
fn free_memory_accounting_is_exact() {
    let layout = packed_layout(2, 3, 4, 5);
    let entries = [layout.data.start(), layout.text.start(), layout.bss.start()];
    let rom_words = build_rom(&layout, &entries, &[1, 2, 3, 4]);
    let rom = RomWindow::new(ROM_BASE, &rom_words);

    let mut ram_words = vec![0usize; layout.ram_size() / W];
    let mut ram = RamWindow::new(RAM_BASE, &mut ram_words);

    let out = relocate(&rom, &layout, &mut ram).unwrap();
    assert_eq!(out.data_base, RAM_BASE);
    assert_eq!(out.bss_base, RAM_BASE + 4 * W);
    assert_eq!(out.table_base, RAM_BASE + 9 * W);
    assert_eq!(out.free_start, RAM_BASE + layout.ram_size());
}

#[test]
fn migrated_data_matches_source() {
    let layout = packed_layout(1, 1, 4, 0);
    let data = [usize::MAX, 1, 0xAB, usize::MAX / 7];
    let rom_words = build_rom(&layout, &[layout.data.start()], &data);
    let rom = RomWindow::new(ROM_BASE, &rom_words);

    let mut ram_words = vec![0usize; layout.ram_size() / W];
    let mut ram = RamWindow::new(RAM_BASE, &mut ram_words);

    relocate(&rom, &layout, &mut ram).unwrap();
    assert_eq!(&ram_words[..4], &data);
}

#[test]
fn bss_is_zeroed_regardless_of_prior_contents() {
    let layout = packed_layout(1, 1, 2, 6);
    let rom_words = build_rom(&layout, &[layout.text.start()], &[7, 8]);
    let rom = RomWindow::new(ROM_BASE, &rom_words);

    // Dirty destination memory: the zero fill must not trust it.
    let mut ram_words = vec![usize::MAX; layout.ram_size() / W];
    let mut ram = RamWindow::new(RAM_BASE, &mut ram_words);

    relocate(&rom, &layout, &mut ram).unwrap();
    assert!(ram_words[2..8].iter().all(|&word| word == 0));
}

#[test]
fn table_entries_follow_the_relocation_formulas() {
    // Gaps between the sections so each boundary is decisive on its own.
    let layout = ImageLayout::new(
        SectionRange::new(0, 2 * W),
        SectionRange::new(4 * W, 10 * W),
        SectionRange::new(12 * W, 14 * W),
        SectionRange::new(16 * W, 18 * W),
    );
    // First and last word of each of the three ranges.
    let entries = [0, W, 12 * W, 13 * W, 16 * W, 17 * W];
    let rom_words = build_rom(&layout, &entries, &[0, 0]);
    let rom = RomWindow::new(ROM_BASE, &rom_words);

    let mut ram_words = vec![0usize; layout.ram_size() / W];
    let mut ram = RamWindow::new(RAM_BASE, &mut ram_words);

    let out = relocate(&rom, &layout, &mut ram).unwrap();
    assert_eq!(
        &ram_words[4..],
        &[
            ROM_BASE,
            ROM_BASE + W,
            out.data_base,
            out.data_base + W,
            out.bss_base,
            out.bss_base + W,
        ]
    );
}

#[test]
fn range_ends_are_exclusive() {
    let layout = ImageLayout::new(
        SectionRange::new(0, 2 * W),
        SectionRange::new(4 * W, 5 * W),
        SectionRange::new(12 * W, 14 * W),
        SectionRange::new(16 * W, 18 * W),
    );
    // Each range's end, one byte past an end, and a value in a gap: all of
    // them must classify as outside every range.
    for value in [
        layout.text.end(),
        layout.data.end(),
        layout.bss.end(),
        layout.data.end() + 1,
        3 * W,
    ] {
        let rom_words = build_rom(&layout, &[value], &[0, 0]);
        let rom = RomWindow::new(ROM_BASE, &rom_words);
        let mut ram_words = vec![0usize; layout.ram_size() / W];
        let mut ram = RamWindow::new(RAM_BASE, &mut ram_words);

        let err = relocate(&rom, &layout, &mut ram).unwrap_err();
        assert_eq!(err, Error::UnknownTableEntry { index: 0, value });
    }
}

#[test]
fn relocates_the_reference_image() {
    // Two data words, one bss word, one table entry pointing at the start
    // of the data section.
    let layout = packed_layout(1, 1, 2, 1);
    let data = [0x1111_1111, 0x2222_2222];
    let rom_words = build_rom(&layout, &[layout.data.start()], &data);
    let rom = RomWindow::new(ROM_BASE, &rom_words);

    let mut ram_words = vec![usize::MAX; layout.ram_size() / W];
    let mut ram = RamWindow::new(RAM_BASE, &mut ram_words);

    let out = relocate(&rom, &layout, &mut ram).unwrap();
    assert_eq!(ram_words, [0x1111_1111, 0x2222_2222, 0, RAM_BASE]);
    assert_eq!(out.table_base, RAM_BASE + 3 * W);
    assert_eq!(out.free_start, RAM_BASE + 4 * W);
}

#[test]
fn malformed_entry_stops_the_relocation() {
    let layout = packed_layout(1, 3, 2, 1);
    let bogus = 0xDEAD_BEEF;
    let entries = [layout.data.start(), bogus, layout.data.start()];
    let rom_words = build_rom(&layout, &entries, &[7, 8]);
    let rom = RomWindow::new(ROM_BASE, &rom_words);

    let sentinel = usize::MAX;
    let mut ram_words = vec![sentinel; layout.ram_size() / W];
    let mut ram = RamWindow::new(RAM_BASE, &mut ram_words);

    let err = relocate(&rom, &layout, &mut ram).unwrap_err();
    assert_eq!(err, Error::UnknownTableEntry { index: 1, value: bogus });

    // Stages 1 and 2 ran, the table stopped at the faulting entry and
    // nothing past it was written.
    assert_eq!(&ram_words[..2], &[7, 8]);
    assert_eq!(ram_words[2], 0);
    assert_eq!(ram_words[3], RAM_BASE);
    assert_eq!(&ram_words[4..], &[sentinel, sentinel]);
}

#[test]
fn undersized_destination_is_an_error() {
    let layout = packed_layout(1, 1, 2, 1);
    let rom_words = build_rom(&layout, &[layout.data.start()], &[7, 8]);
    let rom = RomWindow::new(ROM_BASE, &rom_words);

    // One word short of ram_size().
    let mut ram_words = vec![0usize; layout.ram_size() / W - 1];
    let mut ram = RamWindow::new(RAM_BASE, &mut ram_words);

    let err = relocate(&rom, &layout, &mut ram).unwrap_err();
    assert!(matches!(err, Error::DestinationFull { .. }));
}

#[test]
fn undersized_source_is_an_error() {
    let layout = packed_layout(1, 1, 2, 1);
    // Window covers the text and table words only; the data range lies
    // beyond it.
    let rom_words = [FILLER, layout.data.start()];
    let rom = RomWindow::new(ROM_BASE, &rom_words);

    let mut ram_words = vec![0usize; layout.ram_size() / W];
    let mut ram = RamWindow::new(RAM_BASE, &mut ram_words);

    let err = relocate(&rom, &layout, &mut ram).unwrap_err();
    assert!(matches!(err, Error::SourceOutOfBounds { .. }));
}

#[test]
fn empty_sections_leave_the_cursor_in_place() {
    let layout = packed_layout(2, 0, 0, 0);
    let rom_words = build_rom(&layout, &[], &[]);
    let rom = RomWindow::new(ROM_BASE, &rom_words);

    let mut ram_words: [usize; 0] = [];
    let mut ram = RamWindow::new(RAM_BASE, &mut ram_words);

    let out = relocate(&rom, &layout, &mut ram).unwrap();
    assert_eq!(out.free_start, RAM_BASE);
    assert_eq!(out.data_base, RAM_BASE);
    assert_eq!(out.table_base, RAM_BASE);
}

#[test]
fn handoff_updates_descriptor_and_table_base_register() {
    let layout = packed_layout(1, 2, 2, 1);
    let entries = [layout.text.start(), layout.bss.start()];
    let rom_words = build_rom(&layout, &entries, &[3, 4]);
    let mut ram_words = vec![0usize; layout.ram_size() / W];

    let image_base = rom_words.as_ptr() as usize;
    let ram_base = ram_words.as_mut_ptr() as usize;
    let mut info = BootInfo {
        image_base,
        unused_ram_start: ram_base,
    };

    let out = unsafe { handoff(&mut info, &layout) }.unwrap();
    assert_eq!(info.image_base, image_base);
    assert_eq!(info.unused_ram_start, ram_base + layout.ram_size());
    assert_eq!(out.table_base, ram_base + 3 * W);
    // On hosted targets the register write lands in a process-global.
    assert_eq!(pic_boot::arch::table_base(), out.table_base);
    assert_eq!(
        ram_words,
        [3, 4, 0, image_base, ram_base + 2 * W]
    );
}

#[test]
fn start_invokes_entry_and_traps_a_return() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    static SEEN_FREE_START: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn entry_stub(info: *mut BootInfo) {
        CALLS.fetch_add(1, Ordering::Relaxed);
        SEEN_FREE_START.store(unsafe { (*info).unused_ram_start }, Ordering::Relaxed);
        // Returning violates the entry contract; start must trap it.
    }

    let layout = packed_layout(1, 1, 2, 1);
    let rom_words = build_rom(&layout, &[layout.data.start()], &[5, 6]);
    let mut ram_words = vec![0usize; layout.ram_size() / W];
    let ram_base = ram_words.as_mut_ptr() as usize;
    let mut info = BootInfo {
        image_base: rom_words.as_ptr() as usize,
        unused_ram_start: ram_base,
    };

    let trap = catch_unwind(AssertUnwindSafe(|| {
        unsafe { start(&mut info, &layout, entry_stub) };
    }))
    .unwrap_err();

    assert_eq!(CALLS.load(Ordering::Relaxed), 1);
    // The entry saw the descriptor already advanced past the relocated
    // sections.
    assert_eq!(
        SEEN_FREE_START.load(Ordering::Relaxed),
        ram_base + layout.ram_size()
    );
    let message = trap.downcast_ref::<String>().unwrap();
    assert!(message.contains("entry point returned"));
}

#[test]
fn start_halts_before_entry_on_a_malformed_table() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn entry_stub(_info: *mut BootInfo) {
        CALLS.fetch_add(1, Ordering::Relaxed);
    }

    let layout = packed_layout(1, 1, 2, 1);
    let rom_words = build_rom(&layout, &[0xBAD_F00D], &[5, 6]);
    let mut ram_words = vec![0usize; layout.ram_size() / W];
    let ram_base = ram_words.as_mut_ptr() as usize;
    let mut info = BootInfo {
        image_base: rom_words.as_ptr() as usize,
        unused_ram_start: ram_base,
    };

    let trap = catch_unwind(AssertUnwindSafe(|| {
        unsafe { start(&mut info, &layout, entry_stub) };
    }))
    .unwrap_err();

    assert_eq!(CALLS.load(Ordering::Relaxed), 0);
    // The descriptor is only updated after a successful relocation.
    assert_eq!(info.unused_ram_start, ram_base);
    // The faulting entry's slot and everything after it stayed untouched.
    assert_eq!(ram_words[3], 0);
    let message = trap.downcast_ref::<String>().unwrap();
    assert!(message.contains("indirection-table entry"));
}
