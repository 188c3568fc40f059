//! Connectivity bootstrap: modem init, credential provisioning, PDN
//! configuration, and the bounded-retry LTE attach state machine.
//!
//! ```text
//! Uninitialized ──▶ ModemInitialized ──▶ CertProvisioned ──▶ PdnConfigured
//!                                                                │
//!                                       ┌────────────────────────┘
//!                                       ▼
//!                                   Attaching ──timeout──▶ (offline+deinit, retry)
//!                                       │                        │
//!                                    signal                 attempts
//!                                       ▼                   exhausted
//!                                   Registered                   │
//!                                       │                        ▼
//!                                       ▼                     Failed
//!                                  PsmRequested
//! ```
//!
//! The attach wait consumes the [`registration::RegistrationSignal`] set by
//! the notification context; one wait per attempt, signal reset before each.
//! A timed-out attempt tears the LTE stack fully down before retrying — a
//! half-associated attach can leave firmware state inconsistent for the
//! next attempt.

pub mod cert;
pub mod registration;

use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::adapters::console;
use crate::app::ports::{
    IpFamily, ModemControlPort, ModemEventHook, PdnPort, SecureStorePort, TimePort,
};
use crate::config::BootConfig;
use crate::error::{Error, Result};
use registration::RegistrationSignal;

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Lifecycle states of the connectivity bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    ModemInitialized,
    CertProvisioned,
    PdnConfigured,
    Attaching,
    Registered,
    /// Terminal success: attached and PSM negotiation issued.
    PsmRequested,
    /// Terminal failure: attach attempts exhausted or a fatal setup error.
    Failed,
}

/// Bootstrap session bookkeeping.  Owned exclusively by
/// [`ConnectivityManager`]; created at boot, discarded when the bootstrap
/// completes or fails.
#[derive(Debug)]
pub struct ConnectivitySession {
    state: SessionState,
    pdn_cid: Option<u8>,
    /// Attach attempts started so far (0..=bound).
    attempts_started: u8,
    /// Monotonic deadline of the attempt currently waiting, if any.
    deadline_ms: u64,
}

impl ConnectivitySession {
    fn new() -> Self {
        Self {
            state: SessionState::Uninitialized,
            pdn_cid: None,
            attempts_started: 0,
            deadline_ms: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pdn_cid(&self) -> Option<u8> {
        self.pdn_cid
    }

    pub fn attempts_started(&self) -> u8 {
        self.attempts_started
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Drives the connectivity bootstrap to one of its two terminal states.
pub struct ConnectivityManager {
    session: ConnectivitySession,
}

impl Default for ConnectivityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityManager {
    pub fn new() -> Self {
        Self {
            session: ConnectivitySession::new(),
        }
    }

    pub fn session(&self) -> &ConnectivitySession {
        &self.session
    }

    /// Run the full bootstrap: modem library, certificate, PDN, attach, PSM.
    ///
    /// Returns `Ok` with the session in `PsmRequested`, or the first fatal
    /// error with the session in `Failed`.
    pub fn establish(
        &mut self,
        modem: &mut (impl ModemControlPort + SecureStorePort + PdnPort),
        clock: &impl TimePort,
        signal: &Arc<RegistrationSignal>,
        config: &BootConfig,
    ) -> Result<()> {
        let outcome = self.run_states(modem, clock, signal, config);
        if outcome.is_err() {
            self.session.state = SessionState::Failed;
        }
        outcome
    }

    fn run_states(
        &mut self,
        modem: &mut (impl ModemControlPort + SecureStorePort + PdnPort),
        clock: &impl TimePort,
        signal: &Arc<RegistrationSignal>,
        config: &BootConfig,
    ) -> Result<()> {
        // 1. Modem library.
        modem.lib_init().map_err(|e| {
            error!("failed to initialize modem library: {e}");
            Error::from(e)
        })?;
        self.session.state = SessionState::ModemInitialized;

        // 2. Root credential — must precede any attach.
        cert::provision(modem).map_err(|e| {
            error!("failed to provision certificate: {e}");
            Error::from(e)
        })?;
        self.session.state = SessionState::CertProvisioned;

        // 3. PDN context, fixed APN, IPv4 only.
        let cid = modem.pdn_create()?;
        modem.pdn_configure(cid, config.apn.as_str(), IpFamily::V4)?;
        self.session.pdn_cid = Some(cid);
        self.session.state = SessionState::PdnConfigured;
        debug!("PDN context {cid} configured for APN '{}'", config.apn);

        // 4. Bounded attach loop.
        for attempt in 0..config.attach_attempts {
            self.session.attempts_started = attempt + 1;
            self.session.state = SessionState::Attaching;

            // LTE stack up + notifications.  Failures here are fatal, not
            // part of the retry budget.
            modem.lte_init()?;
            modem.events_enable()?;

            info!(
                "[{attempt}] trying to attach to LTE network (timeout: {} ms)",
                config.attach_timeout_ms
            );
            console::print_line(&format!(
                "Trying to attach to LTE network (TIMEOUT: {} ms)",
                config.attach_timeout_ms
            ));

            // One wait per attempt: clear any stale set, then install the
            // notification hook and issue the connect request.
            signal.reset();
            let hook: ModemEventHook = {
                let signal = Arc::clone(signal);
                Arc::new(move |evt| registration::handle_modem_event(&evt, &signal))
            };
            modem.connect_async(hook)?;

            if self.wait_for_registration(clock, signal, config) {
                self.session.state = SessionState::Registered;

                // PSM refusal degrades power consumption, not connectivity.
                match modem.psm_request(true) {
                    Ok(()) => debug!("PSM is enabled"),
                    Err(e) => error!("PSM request failed: {e}"),
                }
                self.session.state = SessionState::PsmRequested;
                return Ok(());
            }

            console::print_line("TIMEOUT");
            warn!("[{attempt}] attach timed out, resetting LTE stack");
            modem.offline();
            modem.lte_deinit();
        }

        error!("failed to attach to LTE network");
        Err(Error::AttachExhausted)
    }

    /// Poll the registration signal until it is set or the per-attempt
    /// deadline passes.  The deadline is evaluated at poll granularity, so
    /// the wait may overshoot by at most one poll interval.
    fn wait_for_registration(
        &mut self,
        clock: &impl TimePort,
        signal: &RegistrationSignal,
        config: &BootConfig,
    ) -> bool {
        self.session.deadline_ms = clock.now_ms() + u64::from(config.attach_timeout_ms);
        loop {
            if signal.take() {
                return true;
            }
            if clock.now_ms() >= self.session.deadline_ms {
                return false;
            }
            clock.sleep_ms(config.signal_poll_ms);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
