//! Architecture-specific primitives: the table-base register and the
//! permanent wait state.
//!
//! Position-independent code built for this boot protocol resolves every
//! global reference through the indirection table, and the calling
//! convention reserves one general register to hold the table's base. That
//! register write and the halt-forever loop are the two operations no safe
//! abstraction can model, so they live here and nowhere else.

cfg_if::cfg_if! {
    if #[cfg(target_arch = "arm")] {
        mod arm;
        pub use arm::{halt, set_table_base};
    } else if #[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))] {
        mod riscv;
        pub use riscv::{halt, set_table_base};
    } else {
        mod hosted;
        pub use hosted::{halt, set_table_base, table_base};
    }
}
