//! Boot / state indicator LED pair.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the two indicator GPIOs via hw_init.
//! On host/test: tracks state in-memory only.

use crate::app::ports::IndicatorPort;
use crate::drivers::hw_init;
use crate::pins;

pub struct BoardLeds {
    boot: bool,
    state: bool,
}

impl Default for BoardLeds {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardLeds {
    pub fn new() -> Self {
        Self {
            boot: false,
            state: false,
        }
    }

    pub fn boot_level(&self) -> bool {
        self.boot
    }

    pub fn state_level(&self) -> bool {
        self.state
    }
}

impl IndicatorPort for BoardLeds {
    fn set_boot(&mut self, on: bool) {
        hw_init::gpio_write(pins::LED_BOOT_GPIO, on);
        self.boot = on;
    }

    fn toggle_boot(&mut self) {
        let level = !self.boot;
        self.set_boot(level);
    }

    fn set_state(&mut self, on: bool) {
        hw_init::gpio_write(pins::LED_STATE_GPIO, on);
        self.state = on;
    }

    fn toggle_state(&mut self) {
        let level = !self.state;
        self.set_state(level);
    }
}
