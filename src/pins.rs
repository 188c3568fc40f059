//! GPIO / peripheral pin assignments for the CellPoint main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Boot indicator LED (active HIGH).  Solid during bootstrap, fast blink
/// in the terminal fallback state.
pub const LED_BOOT_GPIO: i32 = 11;
/// State indicator LED (active HIGH).  Heartbeat in normal operation,
/// solid during a file transfer.
pub const LED_STATE_GPIO: i32 = 12;

// ---------------------------------------------------------------------------
// User button (active-high with external pull-down)
// ---------------------------------------------------------------------------

/// Momentary push-button triggering the on-demand file download.
pub const BUTTON_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// Cellular modem module (UART-attached)
// ---------------------------------------------------------------------------

/// UART TX to the modem (modem RXD).
pub const MODEM_UART_TX_GPIO: i32 = 17;
/// UART RX from the modem (modem TXD).
pub const MODEM_UART_RX_GPIO: i32 = 18;
/// Modem AT-link baud rate.
pub const MODEM_UART_BAUD: u32 = 115_200;

// ---------------------------------------------------------------------------
// Console UART
// ---------------------------------------------------------------------------

pub const CONSOLE_TX_GPIO: i32 = 43;
pub const CONSOLE_RX_GPIO: i32 = 44;
