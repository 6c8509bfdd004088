//! ARM: the boot protocol dedicates `r10` (`sl`, the static base register
//! of the AAPCS read-write position independence model) to the table base.

/// Installs the relocated table base in `r10`.
///
/// # Safety
/// Overwrites a register the surrounding code is told nothing about; only
/// meaningful immediately before the jump to the entry point, which is the
/// first code compiled against the convention.
#[inline(always)]
pub unsafe fn set_table_base(addr: usize) {
    unsafe {
        core::arch::asm!(
            "mov r10, {addr}",
            addr = in(reg) addr,
            out("r10") _,
            options(nomem, nostack, preserves_flags)
        )
    };
}

/// Parks the core in a permanent wait state.
pub fn halt() -> ! {
    loop {
        unsafe { core::arch::asm!("wfe", options(nomem, nostack, preserves_flags)) };
    }
}
