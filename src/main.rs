//! CellPoint Firmware — Main Entry Point
//!
//! Boot sequence and supervision:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  CellularModem      EndpointClient     MonotonicClock          │
//! │  (Modem+Store+Pdn)  (Auth+Transfer)    (TimePort)              │
//! │  console            BoardLeds          ButtonInput             │
//! │  (text sink)        (IndicatorPort)    (InputPort)             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │   bootstrap (cert → PDN → attach → PSM → auth)         │    │
//! │  │   supervisor (heartbeat · button edge · download)      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any fatal bootstrap error diverts into the fallback blink loop; there
//! is no supervising watchdog and no recovery short of a power cycle.
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info};

use cellpoint::adapters::console;
use cellpoint::adapters::endpoint::EndpointClient;
use cellpoint::adapters::modem::CellularModem;
use cellpoint::adapters::time::MonotonicClock;
use cellpoint::app::context::BootContext;
use cellpoint::app::ports::{IndicatorPort, TimePort};
use cellpoint::config::BootConfig;
use cellpoint::drivers::button::ButtonInput;
use cellpoint::drivers::indicator::BoardLeds;
use cellpoint::error::Error;
use cellpoint::supervisor::Supervisor;
use cellpoint::{bootstrap, diagnostics, drivers, fallback, supervisor};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    console::print_line(&format!("*** CellPoint v{}", env!("CARGO_PKG_VERSION")));
    #[cfg(feature = "plmn-lock")]
    console::print_line("* PLMN lock enabled");

    diagnostics::install_panic_handler();

    // ── 2. Board peripherals ──────────────────────────────────
    let mut leds = BoardLeds::new();
    let clock = MonotonicClock::new();
    let ctx_config = BootConfig::default();

    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Not even the indicators are trustworthy here; blink anyway —
        // a dead LED loses nothing.
        error!("peripheral init failed: {e}");
        leds.set_boot(false);
        fallback::run(Error::Init("peripheral init"), &mut leds, &clock, &ctx_config);
    }
    leds.set_boot(true);

    // ── 3. Boot context + adapters ────────────────────────────
    let mut ctx = BootContext::new(ctx_config);
    let mut modem = CellularModem::new();
    let mut endpoint = EndpointClient::with_defaults();
    let mut button = ButtonInput::new();

    // ── 4. Bootstrap: connectivity, then credentials ──────────
    if let Err(e) = bootstrap::run(&mut ctx, &mut modem, &mut endpoint, &clock) {
        fallback::run(e, &mut leds, &clock, &ctx.config);
    }

    // ── 5. Supervisory loop ───────────────────────────────────
    console::print_line("+++ Ready +++");
    info!("bootstrap complete, entering supervisory loop");
    leds.set_state(true);

    let sup = Supervisor::new(clock.now_ms(), &ctx.config);
    supervisor::run(sup, &clock, &mut button, &mut leds, &mut endpoint, &ctx.config)
}
