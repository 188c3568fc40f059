//! Boot configuration parameters
//!
//! All build-time constants for the CellPoint bootstrap and supervisory
//! loop.  Collected in one struct so the bootstrap routines and the test
//! harness share a single source of truth.

use serde::{Deserialize, Serialize};

/// Capacity of each credential buffer (bytes).
pub const CREDENTIAL_CAPACITY: usize = 255;

/// Capacity of the file-download working buffer (bytes).
pub const DOWNLOAD_CHUNK_CAPACITY: usize = 1024;

/// Security tag of the CA-chain slot in the modem credential store.
pub const TLS_SEC_TAG: u32 = 42;

/// Core boot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootConfig {
    // --- LTE attach ---
    /// Per-attempt network-attach timeout (milliseconds)
    pub attach_timeout_ms: u32,
    /// Maximum number of attach attempts before the boot is declared failed
    pub attach_attempts: u8,
    /// Poll interval while waiting on the registration signal (milliseconds)
    pub signal_poll_ms: u32,

    // --- PDN ---
    /// Access Point Name for the packet-data context
    pub apn: heapless::String<32>,

    // --- Authentication ---
    /// Backoff between failed authentication requests (milliseconds)
    pub auth_retry_backoff_ms: u32,

    // --- Supervisory loop ---
    /// Heartbeat toggle period for the state indicator (milliseconds)
    pub heartbeat_period_ms: u32,
    /// Supervisory tick period (milliseconds)
    pub tick_period_ms: u32,
    /// File requested when the download button is pressed
    pub download_file: heapless::String<64>,

    // --- Fallback ---
    /// Boot-indicator blink period in the terminal fallback state (milliseconds)
    pub fallback_blink_ms: u32,
}

impl Default for BootConfig {
    fn default() -> Self {
        let mut apn = heapless::String::new();
        let _ = apn.push_str("m2m.cell-iot.net");
        let mut download_file = heapless::String::new();
        let _ = download_file.push_str("endpoint_file_sample.txt");

        Self {
            // LTE attach
            attach_timeout_ms: 120_000,
            attach_attempts: 3,
            signal_poll_ms: 10,

            // PDN
            apn,

            // Authentication
            auth_retry_backoff_ms: 10_000,

            // Supervisory loop
            heartbeat_period_ms: 500,
            tick_period_ms: 10,
            download_file,

            // Fallback
            fallback_blink_ms: 100,
        }
    }
}
