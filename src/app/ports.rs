//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ bootstrap / supervisor (domain)
//! ```
//!
//! Driven adapters (modem, endpoint service, GPIO, clock) implement these
//! traits.  The bootstrap and supervisory routines consume them via
//! generics, so the domain core never touches hardware directly.
//!
//! ## Blocking discipline
//!
//! Everything here runs on the single cooperative main context.  The only
//! exception is the [`ModemEventHook`] installed via
//! [`ModemControlPort::connect_async`]: the adapter invokes it from the
//! modem notification context, and the hook must never block.

use std::sync::Arc;

use crate::conn::registration::ModemEvent;
use crate::error::{AuthError, GpioError, ModemError, PdnError, StoreError, TransferError};

// ───────────────────────────────────────────────────────────────
// Time port (driven adapter: monotonic clock → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source and blocking sleep.
///
/// Injected everywhere a deadline or a fixed delay appears, so the test
/// harness can substitute a simulated clock.
pub trait TimePort {
    /// Milliseconds since boot (monotonic).
    fn now_ms(&self) -> u64;

    /// Block the calling context for `ms` milliseconds.
    fn sleep_ms(&self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Modem secure credential store
// ───────────────────────────────────────────────────────────────

/// Credential slot types in the modem-resident store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// Root CA chain used by the modem to validate TLS servers.
    CaChain,
    /// Client certificate (unused by this firmware, present in the store API).
    ClientCert,
    /// Client private key (unused by this firmware, present in the store API).
    ClientKey,
}

/// Modem-resident secure credential storage, addressed by security tag.
pub trait SecureStorePort {
    /// Whether a credential of `kind` exists at `tag`.
    fn cred_exists(&mut self, tag: u32, kind: CredentialKind) -> Result<bool, StoreError>;

    /// Delete the credential at `tag`.
    fn cred_delete(&mut self, tag: u32, kind: CredentialKind) -> Result<(), StoreError>;

    /// Write `data` to `tag`, replacing nothing — the slot must be free.
    fn cred_write(&mut self, tag: u32, kind: CredentialKind, data: &[u8])
        -> Result<(), StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Packet-data network context
// ───────────────────────────────────────────────────────────────

/// IP address family for a PDN context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    V4,
    V6,
    V4V6,
}

/// PDN context lifecycle: create a context handle, then bind it to an APN.
pub trait PdnPort {
    /// Allocate a fresh PDN context; returns its context id.
    fn pdn_create(&mut self) -> Result<u8, PdnError>;

    /// Configure APN and address family for context `cid`.
    fn pdn_configure(&mut self, cid: u8, apn: &str, family: IpFamily) -> Result<(), PdnError>;
}

// ───────────────────────────────────────────────────────────────
// Modem / LTE control
// ───────────────────────────────────────────────────────────────

/// Hook invoked by the adapter on the modem notification context for every
/// translated modem event.  Must never block or sleep.
pub type ModemEventHook = Arc<dyn Fn(ModemEvent) + Send + Sync>;

/// Control surface of the cellular modem and its LTE stack.
pub trait ModemControlPort {
    /// One-shot modem library initialisation.  Precedes everything else.
    fn lib_init(&mut self) -> Result<(), ModemError>;

    /// Initialize the LTE control stack.  Called once per attach attempt
    /// (the stack is torn down again by [`lte_deinit`](Self::lte_deinit)
    /// after a timed-out attempt).
    fn lte_init(&mut self) -> Result<(), ModemError>;

    /// Enable delivery of modem event notifications.
    fn events_enable(&mut self) -> Result<(), ModemError>;

    /// Issue the asynchronous network-attach request.  Registration
    /// progress is reported through `hook` on the notification context.
    fn connect_async(&mut self, hook: ModemEventHook) -> Result<(), ModemError>;

    /// Drive the modem to flight mode, dropping any half-associated state.
    fn offline(&mut self);

    /// Tear down the LTE control stack.
    fn lte_deinit(&mut self);

    /// Request Power Saving Mode from the network.
    fn psm_request(&mut self, enable: bool) -> Result<(), ModemError>;
}

// ───────────────────────────────────────────────────────────────
// Endpoint service: authentication
// ───────────────────────────────────────────────────────────────

/// Authentication handshake with the endpoint service.
///
/// `request_auth` blocks until the service answers or the request fails;
/// there is no timeout at this boundary.
pub trait AuthPort {
    /// Obtain operator credentials, writing them into the fixed-capacity
    /// buffers.  The buffers are only valid when `Ok` is returned.
    fn request_auth(
        &mut self,
        user: &mut heapless::String<{ crate::config::CREDENTIAL_CAPACITY }>,
        pass: &mut heapless::String<{ crate::config::CREDENTIAL_CAPACITY }>,
    ) -> Result<(), AuthError>;

    /// Commit credentials for all subsequent endpoint requests.
    fn set_auth_info(&mut self, user: &str, pass: &str) -> Result<(), AuthError>;
}

// ───────────────────────────────────────────────────────────────
// Endpoint service: file transfer
// ───────────────────────────────────────────────────────────────

/// Inclusive byte range of a partial download request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u32,
    pub end: u32,
}

/// Blocking file download from the endpoint service.
///
/// `on_chunk` is invoked synchronously zero or more times with at most
/// `max_chunk` bytes each; the final call may be shorter.  The call blocks
/// until the transfer completes or fails — no timeout, no cancellation.
pub trait FileTransferPort {
    fn download(
        &mut self,
        name: &str,
        range: Option<ByteRange>,
        max_chunk: usize,
        on_chunk: &mut dyn FnMut(&[u8]),
    ) -> Result<usize, TransferError>;
}

// ───────────────────────────────────────────────────────────────
// Board I/O
// ───────────────────────────────────────────────────────────────

/// Read-side port for the user button.
pub trait InputPort {
    /// Instantaneous logic level of the input (true = pressed).
    fn read_level(&mut self) -> Result<bool, GpioError>;
}

/// Write-side port for the two board indicators.
pub trait IndicatorPort {
    /// Drive the boot indicator.
    fn set_boot(&mut self, on: bool);

    /// Toggle the boot indicator.
    fn toggle_boot(&mut self);

    /// Drive the state indicator.
    fn set_state(&mut self, on: bool);

    /// Toggle the state indicator.
    fn toggle_state(&mut self);
}
