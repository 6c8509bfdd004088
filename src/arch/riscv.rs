//! RISC-V: the boot protocol dedicates `gp` to the table base. `gp` is
//! reserved by the compiler, so it cannot appear as an operand; the move
//! goes through a scratch register instead.

/// Installs the relocated table base in `gp`.
///
/// # Safety
/// Overwrites a register the surrounding code is told nothing about; only
/// meaningful immediately before the jump to the entry point, which is the
/// first code compiled against the convention.
#[inline(always)]
pub unsafe fn set_table_base(addr: usize) {
    unsafe {
        core::arch::asm!(
            "mv gp, {addr}",
            addr = in(reg) addr,
            options(nomem, nostack, preserves_flags)
        )
    };
}

/// Parks the core in a permanent wait state.
pub fn halt() -> ! {
    loop {
        unsafe { core::arch::asm!("wfi", options(nomem, nostack, preserves_flags)) };
    }
}
