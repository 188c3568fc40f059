//! Application core — pure bootstrap and supervision logic, zero I/O.
//!
//! All interaction with the modem, the endpoint service, and the board
//! peripherals happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real hardware.  The one
//! explicit process-wide value is the [`context::BootContext`].

pub mod context;
pub mod ports;
