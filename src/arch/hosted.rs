//! Fallback for targets without a reserved table-base register: the value
//! is kept in a process-global instead, so hosted builds and tests can
//! observe the write that would otherwise disappear into machine state.

use core::sync::atomic::{AtomicUsize, Ordering};

static TABLE_BASE: AtomicUsize = AtomicUsize::new(0);

/// Records the table base in the process-global stand-in for the reserved
/// register.
///
/// # Safety
/// Always safe here; the signature is `unsafe` for parity with the real
/// targets, where it clobbers machine state.
#[inline(always)]
pub unsafe fn set_table_base(addr: usize) {
    TABLE_BASE.store(addr, Ordering::Relaxed);
}

/// The last value handed to [`set_table_base`].
pub fn table_base() -> usize {
    TABLE_BASE.load(Ordering::Relaxed)
}

/// Parks the thread in a permanent wait state.
pub fn halt() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
