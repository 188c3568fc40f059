//! Polled button input with rising-edge detection.
//!
//! The supervisory loop samples the instantaneous level once per tick and
//! acts only on a 0→1 transition: holding the button does not re-trigger,
//! and the falling edge is ignored.  A failed read leaves the previous
//! level untouched so a transient GPIO error can never fabricate an edge.

use log::error;

use crate::app::ports::InputPort;
use crate::error::GpioError;

/// Edge state across supervisory ticks.
pub struct EdgeDetector {
    prev: bool,
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self { prev: false }
    }

    /// Feed one sampled level (or a read error).  Returns `true` exactly on
    /// a rising edge.
    pub fn feed(&mut self, level: Result<bool, GpioError>) -> bool {
        match level {
            Err(e) => {
                error!("button read failed: {e}");
                false
            }
            Ok(level) => {
                let rising = !self.prev && level;
                self.prev = level;
                rising
            }
        }
    }

    /// Last successfully observed level.
    pub fn level(&self) -> bool {
        self.prev
    }
}

/// The physical button, wired through the board GPIO.
#[derive(Default)]
pub struct ButtonInput;

impl ButtonInput {
    pub fn new() -> Self {
        Self
    }
}

impl InputPort for ButtonInput {
    fn read_level(&mut self) -> Result<bool, GpioError> {
        crate::drivers::hw_init::gpio_read(crate::pins::BUTTON_GPIO)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
