//! Simulated modem for host-side tests.
//!
//! Deterministic stand-in for the UART module: an in-memory credential
//! store, counted PDN contexts, and a background thread that reports
//! SEARCHING then REGISTERED a fixed delay after each connect request.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use log::info;

use crate::app::ports::{CredentialKind, IpFamily, ModemEventHook};
use crate::conn::registration::{ModemEvent, RegStatus};
use crate::error::{ModemError, PdnError, StoreError};

/// Delay before the simulated network starts searching.
const SEARCH_DELAY_MS: u64 = 10;

pub(super) struct SimModem {
    lib_ready: bool,
    lte_ready: bool,
    events_enabled: bool,
    store: HashMap<(u32, CredentialKind), Vec<u8>>,
    next_cid: u8,
    pub(super) register_delay_ms: u64,
}

impl SimModem {
    pub(super) fn new() -> Self {
        Self {
            lib_ready: false,
            lte_ready: false,
            events_enabled: false,
            store: HashMap::new(),
            next_cid: 1,
            register_delay_ms: 150,
        }
    }

    pub(super) fn lib_init(&mut self) -> Result<(), ModemError> {
        self.lib_ready = true;
        info!("modem(sim): library initialized");
        Ok(())
    }

    pub(super) fn lte_init(&mut self) -> Result<(), ModemError> {
        if !self.lib_ready {
            return Err(ModemError::LteInitFailed);
        }
        self.lte_ready = true;
        Ok(())
    }

    pub(super) fn events_enable(&mut self) -> Result<(), ModemError> {
        if !self.lte_ready {
            return Err(ModemError::EventsEnableFailed);
        }
        self.events_enabled = true;
        Ok(())
    }

    pub(super) fn connect_async(&mut self, hook: ModemEventHook) -> Result<(), ModemError> {
        if !self.lte_ready {
            return Err(ModemError::ConnectRequestFailed);
        }
        if !self.events_enabled {
            // Without notifications the attach would only ever time out;
            // treat it as a sequencing bug in the caller.
            return Err(ModemError::ConnectRequestFailed);
        }
        let register_delay = self.register_delay_ms;
        // The spawned thread is the simulated notification context.
        let _ = thread::spawn(move || {
            thread::sleep(Duration::from_millis(SEARCH_DELAY_MS));
            hook(ModemEvent::RegStatus(RegStatus::Searching));
            thread::sleep(Duration::from_millis(register_delay));
            hook(ModemEvent::RegStatus(RegStatus::RegisteredHome));
        });
        info!("modem(sim): connect requested (registers in {register_delay} ms)");
        Ok(())
    }

    pub(super) fn offline(&mut self) {
        info!("modem(sim): offline");
    }

    pub(super) fn lte_deinit(&mut self) {
        self.lte_ready = false;
        self.events_enabled = false;
        info!("modem(sim): LTE stack deinitialized");
    }

    pub(super) fn psm_request(&mut self, enable: bool) -> Result<(), ModemError> {
        info!("modem(sim): PSM {}", if enable { "enabled" } else { "disabled" });
        Ok(())
    }

    // ── Credential store ──────────────────────────────────────

    pub(super) fn cred_exists(
        &mut self,
        tag: u32,
        kind: CredentialKind,
    ) -> Result<bool, StoreError> {
        Ok(self.store.contains_key(&(tag, kind)))
    }

    pub(super) fn cred_delete(
        &mut self,
        tag: u32,
        kind: CredentialKind,
    ) -> Result<(), StoreError> {
        self.store.remove(&(tag, kind));
        Ok(())
    }

    pub(super) fn cred_write(
        &mut self,
        tag: u32,
        kind: CredentialKind,
        data: &[u8],
    ) -> Result<(), StoreError> {
        self.store.insert((tag, kind), data.to_vec());
        Ok(())
    }

    // ── PDN ───────────────────────────────────────────────────

    pub(super) fn pdn_create(&mut self) -> Result<u8, PdnError> {
        let cid = self.next_cid;
        self.next_cid = self.next_cid.checked_add(1).ok_or(PdnError::ContextCreateFailed)?;
        Ok(cid)
    }

    pub(super) fn pdn_configure(
        &mut self,
        cid: u8,
        apn: &str,
        family: IpFamily,
    ) -> Result<(), PdnError> {
        if cid == 0 || cid >= self.next_cid || apn.is_empty() {
            return Err(PdnError::ConfigureFailed);
        }
        info!("modem(sim): PDN {cid} configured (APN='{apn}', {family:?})");
        Ok(())
    }
}
