//! Registration events and the cross-context attach signal.
//!
//! The modem adapter translates raw firmware notifications into
//! [`ModemEvent`] values and delivers them through the installed hook on
//! the **notification context** — outside the main control flow.
//! [`handle_modem_event`] is that hook's body: it emits user-visible
//! console lines and sets the [`RegistrationSignal`], and nothing else.
//! It must never block.
//!
//! The signal is a single-slot boolean: the producer side is one atomic
//! store (idempotent — re-setting an already-set slot is a no-op), and
//! the consumer polls [`take`](RegistrationSignal::take) against its own
//! deadline, resetting the slot before each new attach attempt's wait.

use core::sync::atomic::{AtomicBool, Ordering};
use log::debug;

use crate::adapters::console;

// ───────────────────────────────────────────────────────────────
// Event model
// ───────────────────────────────────────────────────────────────

/// Network-registration status, numbered as in the 3GPP +CEREG codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RegStatus {
    NotRegistered = 0,
    RegisteredHome = 1,
    Searching = 2,
    Denied = 3,
    Unknown = 4,
    RegisteredRoaming = 5,
}

/// Radio access technology reported by the modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LteMode {
    None,
    LteM,
    NbIot,
}

/// Modem notifications relevant to the attach flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemEvent {
    /// Network-registration status changed.
    RegStatus(RegStatus),
    /// The serving cell changed.
    CellUpdate { cell_id: u32, tac: u32 },
    /// The radio access technology changed.
    ModeUpdate(LteMode),
    /// Miscellaneous modem notice (diagnostic only).
    Notice(u32),
}

// ───────────────────────────────────────────────────────────────
// Registration signal (single slot, capacity 1)
// ───────────────────────────────────────────────────────────────

/// Single-slot boolean signal between the notification context (producer)
/// and the main context (consumer).
pub struct RegistrationSignal {
    attached: AtomicBool,
}

impl Default for RegistrationSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationSignal {
    pub const fn new() -> Self {
        Self {
            attached: AtomicBool::new(false),
        }
    }

    /// Set the slot.  Idempotent; never blocks.  Safe from any context.
    pub fn set(&self) {
        self.attached.store(true, Ordering::Release);
    }

    /// Consume the slot: returns `true` at most once per set.
    pub fn take(&self) -> bool {
        self.attached.swap(false, Ordering::Acquire)
    }

    /// Clear the slot without consuming.  Called before each new attach
    /// attempt's wait so a stale set from a previous attempt is not
    /// observed.
    pub fn reset(&self) {
        self.attached.store(false, Ordering::Release);
    }

    /// Non-consuming peek, for diagnostics.
    pub fn is_set(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }
}

// ───────────────────────────────────────────────────────────────
// Event handler (notification-context body)
// ───────────────────────────────────────────────────────────────

/// Translate one modem event into console output and, for a successful
/// registration, the attach signal.  No other state is touched.
pub fn handle_modem_event(evt: &ModemEvent, signal: &RegistrationSignal) {
    match evt {
        ModemEvent::RegStatus(status) => match status {
            RegStatus::Searching => {
                console::print_line("SEARCHING");
            }
            RegStatus::RegisteredHome | RegStatus::RegisteredRoaming => {
                console::print_line("REGISTERED");
                signal.set();
            }
            // NotRegistered / Denied / Unknown carry no transition for the
            // attach flow; the per-attempt timeout covers them.
            _ => {}
        },
        ModemEvent::CellUpdate { cell_id, tac } => {
            debug!("cell update: cell_id={cell_id} tac={tac}");
        }
        ModemEvent::ModeUpdate(mode) => {
            debug!("mode update: {mode:?}");
        }
        ModemEvent::Notice(code) => {
            debug!("modem notice: {code}");
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
