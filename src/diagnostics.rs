//! Runtime diagnostics.
//!
//! The panic hook reports through both channels — the engineering log and
//! the operator console — before the runtime aborts.  With no supervising
//! watchdog, a panic otherwise dies silently from the operator's point of
//! view.

use crate::adapters::console;

/// Install the process-wide panic hook.  Call once, early in `main`.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        log::error!("panic: {info}");
        console::print_line("*** PANIC ***");
    }));
}
