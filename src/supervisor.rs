//! Supervisory loop — the cooperative steady-state of the firmware.
//!
//! Runs after the bootstrap completes and never exits.  Each 10 ms tick
//! multiplexes three concerns:
//!
//! 1. **Heartbeat** — the state indicator toggles every 500 ms.  The next
//!    deadline is rescheduled relative to "now", so drift accumulates by
//!    up to one tick period per toggle; accepted, not corrected.
//! 2. **Button edge** — the input level is polled once per tick; a rising
//!    edge triggers the file download.  Read errors skip the sample.
//! 3. **File download** — blocking; the state indicator is held active for
//!    its duration and everything else (including the heartbeat) stalls.

use core::fmt::Write as _;

use log::info;

use crate::adapters::console;
use crate::app::ports::{FileTransferPort, IndicatorPort, InputPort, TimePort};
use crate::config::{BootConfig, DOWNLOAD_CHUNK_CAPACITY};
use crate::drivers::button::EdgeDetector;
use crate::error::TransferError;

/// Tick state of the supervisory loop.
pub struct Supervisor {
    next_heartbeat_ms: u64,
    button: EdgeDetector,
}

impl Supervisor {
    /// `now_ms` anchors the first heartbeat deadline.
    pub fn new(now_ms: u64, config: &BootConfig) -> Self {
        Self {
            next_heartbeat_ms: now_ms + u64::from(config.heartbeat_period_ms),
            button: EdgeDetector::new(),
        }
    }

    /// Run one supervisory tick.  Returns `true` if a download was
    /// triggered this tick (the blocking action already completed).
    pub fn tick(
        &mut self,
        now_ms: u64,
        input: &mut impl InputPort,
        leds: &mut impl IndicatorPort,
        transfer: &mut impl FileTransferPort,
        config: &BootConfig,
    ) -> bool {
        // Heartbeat.
        if now_ms >= self.next_heartbeat_ms {
            self.next_heartbeat_ms = now_ms + u64::from(config.heartbeat_period_ms);
            leds.toggle_state();
        }

        // Button edge → download.
        let rising = self.button.feed(input.read_level());
        if rising {
            console::print_line("File download Button Pushed");
            info!("download triggered for '{}'", config.download_file);

            leds.set_state(true);
            match download_to_console(transfer, config.download_file.as_str()) {
                Ok(total) => {
                    console::print_line(&format!("Received: {total} bytes."));
                }
                Err(e) => {
                    info!("download failed: {e}");
                    console::print_line("FAILED");
                }
            }
            leds.set_state(false);
        }
        rising
    }

    /// Deadline of the next heartbeat toggle (test hook).
    pub fn next_heartbeat_ms(&self) -> u64 {
        self.next_heartbeat_ms
    }
}

/// Fetch `name` and hex-dump it to the console.
///
/// Each chunk is emitted as lowercase hex.  The line terminator is emitted
/// only when a chunk is strictly shorter than the chunk capacity — the
/// stream's end-of-file heuristic.  A final chunk that exactly fills the
/// buffer is indistinguishable from a mid-stream chunk and gets no
/// terminator; preserved as-is for output compatibility.
fn download_to_console(
    transfer: &mut impl FileTransferPort,
    name: &str,
) -> Result<usize, TransferError> {
    transfer.download(name, None, DOWNLOAD_CHUNK_CAPACITY, &mut |bytes| {
        let mut hex: heapless::String<{ 2 * DOWNLOAD_CHUNK_CAPACITY }> = heapless::String::new();
        for b in bytes {
            let _ = write!(hex, "{b:02x}");
        }
        console::print(&hex);
        if bytes.len() < DOWNLOAD_CHUNK_CAPACITY {
            console::print_line("");
        }
    })
}

/// Drive the supervisory loop forever at the configured tick period.
pub fn run(
    mut supervisor: Supervisor,
    clock: &impl TimePort,
    input: &mut impl InputPort,
    leds: &mut impl IndicatorPort,
    transfer: &mut impl FileTransferPort,
    config: &BootConfig,
) -> ! {
    loop {
        supervisor.tick(clock.now_ms(), input, leds, transfer, config);
        clock.sleep_ms(config.tick_period_ms);
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
