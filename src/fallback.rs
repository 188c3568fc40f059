//! Terminal diagnostic fallback state.
//!
//! Entered on any fatal bootstrap failure.  The boot indicator blinks at
//! a fast fixed period — visibly distinct from the 500 ms steady-state
//! heartbeat — and nothing else runs.  No recovery path short of a power
//! cycle.

use log::error;

use crate::app::ports::{IndicatorPort, TimePort};
use crate::config::BootConfig;
use crate::error::Error;

/// Blink the boot indicator forever.
pub fn run(
    cause: Error,
    leds: &mut impl IndicatorPort,
    clock: &impl TimePort,
    config: &BootConfig,
) -> ! {
    error!("fatal boot failure: {cause} — entering fallback state");
    loop {
        leds.toggle_boot();
        clock.sleep_ms(config.fallback_blink_ms);
    }
}
