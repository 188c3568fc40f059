//! Cellular modem adapter (AT-over-UART).
//!
//! Implements the three modem-facing ports — [`ModemControlPort`],
//! [`SecureStorePort`], [`PdnPort`] — against the UART-attached cellular
//! module.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real AT link over UART1.  A reader thread
//!   owns the receive side: unsolicited result codes are translated to
//!   [`ModemEvent`]s and delivered through the installed hook (the modem
//!   notification context), everything else is routed back to the command
//!   issuer.
//! - **all other targets**: a deterministic simulated modem for host-side
//!   tests — in-memory credential store, counted PDN contexts, and a
//!   background thread that reports SEARCHING then REGISTERED a fixed
//!   delay after each connect request.
//!
//! ## URC translation
//!
//! Registration progress arrives as `+CEREG` unsolicited result codes
//! (`AT+CEREG=2` enables the extended form with cell identity and access
//! technology).  [`parse_urc`] maps one line to up to three events:
//! registration status, serving-cell update, and mode update.

#[cfg(target_os = "espidf")]
use log::{info, warn};

use crate::app::ports::{
    CredentialKind, IpFamily, ModemControlPort, ModemEventHook, PdnPort, SecureStorePort,
};
use crate::conn::registration::{LteMode, ModemEvent, RegStatus};
use crate::error::{ModemError, PdnError, StoreError};

#[cfg(target_os = "espidf")]
mod esp_impl;

#[cfg(not(target_os = "espidf"))]
mod sim;

// ───────────────────────────────────────────────────────────────
// URC parsing (shared, host-tested)
// ───────────────────────────────────────────────────────────────

/// Translate one unsolicited result line into modem events.
///
/// `+CEREG: <stat>[,"<tac>","<ci>"[,<AcT>]]` — status always, cell and
/// mode updates when the extended fields are present.  Anything else is
/// not a URC this firmware cares about and yields no events.
pub fn parse_urc(line: &str) -> heapless::Vec<ModemEvent, 3> {
    let mut events = heapless::Vec::new();

    let Some(rest) = line.strip_prefix("+CEREG:") else {
        return events;
    };
    let mut fields = rest.split(',').map(str::trim);

    let Some(stat) = fields.next().and_then(|f| f.parse::<u8>().ok()) else {
        return events;
    };
    let _ = events.push(ModemEvent::RegStatus(reg_status_from(stat)));

    let tac = fields.next().and_then(parse_hex_field);
    let ci = fields.next().and_then(parse_hex_field);
    if let (Some(tac), Some(cell_id)) = (tac, ci) {
        let _ = events.push(ModemEvent::CellUpdate { cell_id, tac });
    }

    if let Some(act) = fields.next().and_then(|f| f.parse::<u8>().ok()) {
        let mode = match act {
            7 => LteMode::LteM,
            9 => LteMode::NbIot,
            _ => LteMode::None,
        };
        let _ = events.push(ModemEvent::ModeUpdate(mode));
    }

    events
}

fn reg_status_from(stat: u8) -> RegStatus {
    match stat {
        0 => RegStatus::NotRegistered,
        1 => RegStatus::RegisteredHome,
        2 => RegStatus::Searching,
        3 => RegStatus::Denied,
        5 => RegStatus::RegisteredRoaming,
        _ => RegStatus::Unknown,
    }
}

/// `"1A2B"` (with or without quotes) → 0x1A2B.
fn parse_hex_field(field: &str) -> Option<u32> {
    let trimmed = field.trim_matches('"');
    u32::from_str_radix(trimmed, 16).ok()
}

/// Credential-store slot name for a security tag.
#[cfg(target_os = "espidf")]
fn slot_name(tag: u32) -> heapless::String<24> {
    use core::fmt::Write as _;
    let mut name = heapless::String::new();
    let _ = write!(name, "cellpoint_ca_{tag}");
    name
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

/// The UART-attached cellular modem.
pub struct CellularModem {
    #[cfg(target_os = "espidf")]
    link: Option<esp_impl::AtLink>,

    #[cfg(not(target_os = "espidf"))]
    sim: sim::SimModem,
}

impl Default for CellularModem {
    fn default() -> Self {
        Self::new()
    }
}

impl CellularModem {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            link: None,
            #[cfg(not(target_os = "espidf"))]
            sim: sim::SimModem::new(),
        }
    }

    /// Delay between a simulated connect request and the REGISTERED event
    /// (test hook, host targets only).
    #[cfg(not(target_os = "espidf"))]
    pub fn set_sim_register_delay_ms(&mut self, delay: u64) {
        self.sim.register_delay_ms = delay;
    }

    #[cfg(target_os = "espidf")]
    fn link(&self) -> Result<&esp_impl::AtLink, ModemError> {
        self.link.as_ref().ok_or(ModemError::LibInitFailed)
    }
}

// ── ModemControlPort ──────────────────────────────────────────

impl ModemControlPort for CellularModem {
    #[cfg(target_os = "espidf")]
    fn lib_init(&mut self) -> Result<(), ModemError> {
        let link = esp_impl::AtLink::init()?;
        // Echo off, numeric errors on — everything downstream parses
        // machine-form responses.
        link.command("ATE0", 1_000)?;
        link.command("AT+CMEE=1", 1_000)?;
        self.link = Some(link);
        info!("modem: AT link up");
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn lib_init(&mut self) -> Result<(), ModemError> {
        self.sim.lib_init()
    }

    #[cfg(target_os = "espidf")]
    fn lte_init(&mut self) -> Result<(), ModemError> {
        // Known detached baseline for the attempt about to start.
        self.link()?
            .command("AT+CFUN=4", 5_000)
            .map_err(|_| ModemError::LteInitFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn lte_init(&mut self) -> Result<(), ModemError> {
        self.sim.lte_init()
    }

    #[cfg(target_os = "espidf")]
    fn events_enable(&mut self) -> Result<(), ModemError> {
        self.link()?
            .command("AT+CEREG=2", 1_000)
            .map_err(|_| ModemError::EventsEnableFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn events_enable(&mut self) -> Result<(), ModemError> {
        self.sim.events_enable()
    }

    #[cfg(target_os = "espidf")]
    fn connect_async(&mut self, hook: ModemEventHook) -> Result<(), ModemError> {
        let link = self.link()?;
        link.install_hook(hook);
        link.command("AT+CFUN=1", 5_000)
            .map_err(|_| ModemError::ConnectRequestFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn connect_async(&mut self, hook: ModemEventHook) -> Result<(), ModemError> {
        self.sim.connect_async(hook)
    }

    #[cfg(target_os = "espidf")]
    fn offline(&mut self) {
        if let Ok(link) = self.link() {
            if link.command("AT+CFUN=4", 5_000).is_err() {
                warn!("modem: offline request failed");
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn offline(&mut self) {
        self.sim.offline();
    }

    #[cfg(target_os = "espidf")]
    fn lte_deinit(&mut self) {
        if let Ok(link) = self.link() {
            link.clear_hook();
            if link.command("AT+CFUN=0", 5_000).is_err() {
                warn!("modem: power-down request failed");
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn lte_deinit(&mut self) {
        self.sim.lte_deinit();
    }

    #[cfg(target_os = "espidf")]
    fn psm_request(&mut self, enable: bool) -> Result<(), ModemError> {
        let cmd = if enable { "AT+CPSMS=1" } else { "AT+CPSMS=0" };
        self.link()?
            .command(cmd, 2_000)
            .map_err(|_| ModemError::PsmRefused)
    }

    #[cfg(not(target_os = "espidf"))]
    fn psm_request(&mut self, enable: bool) -> Result<(), ModemError> {
        self.sim.psm_request(enable)
    }
}

// ── SecureStorePort ───────────────────────────────────────────

impl SecureStorePort for CellularModem {
    #[cfg(target_os = "espidf")]
    fn cred_exists(&mut self, tag: u32, kind: CredentialKind) -> Result<bool, StoreError> {
        let listing = self
            .link
            .as_ref()
            .ok_or(StoreError::QueryFailed)?
            .query("AT+USECMNG=3", 5_000)
            .map_err(|_| StoreError::QueryFailed)?;
        let name = slot_name(tag);
        let type_tag = usecmng_type(kind);
        Ok(listing
            .iter()
            .any(|line| line.contains(name.as_str()) && line.contains(type_tag)))
    }

    #[cfg(not(target_os = "espidf"))]
    fn cred_exists(&mut self, tag: u32, kind: CredentialKind) -> Result<bool, StoreError> {
        self.sim.cred_exists(tag, kind)
    }

    #[cfg(target_os = "espidf")]
    fn cred_delete(&mut self, tag: u32, kind: CredentialKind) -> Result<(), StoreError> {
        use core::fmt::Write as _;
        let mut cmd = heapless::String::<64>::new();
        let _ = write!(
            cmd,
            "AT+USECMNG=2,{},\"{}\"",
            usecmng_type_code(kind),
            slot_name(tag)
        );
        self.link
            .as_ref()
            .ok_or(StoreError::DeleteFailed)?
            .command(&cmd, 5_000)
            .map_err(|_| StoreError::DeleteFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn cred_delete(&mut self, tag: u32, kind: CredentialKind) -> Result<(), StoreError> {
        self.sim.cred_delete(tag, kind)
    }

    #[cfg(target_os = "espidf")]
    fn cred_write(
        &mut self,
        tag: u32,
        kind: CredentialKind,
        data: &[u8],
    ) -> Result<(), StoreError> {
        use core::fmt::Write as _;
        let mut cmd = heapless::String::<80>::new();
        let _ = write!(
            cmd,
            "AT+USECMNG=0,{},\"{}\",{}",
            usecmng_type_code(kind),
            slot_name(tag),
            data.len()
        );
        self.link
            .as_ref()
            .ok_or(StoreError::WriteFailed)?
            .command_with_payload(&cmd, data, 10_000)
            .map_err(|_| StoreError::WriteFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn cred_write(
        &mut self,
        tag: u32,
        kind: CredentialKind,
        data: &[u8],
    ) -> Result<(), StoreError> {
        self.sim.cred_write(tag, kind, data)
    }
}

#[cfg(target_os = "espidf")]
fn usecmng_type_code(kind: CredentialKind) -> u8 {
    match kind {
        CredentialKind::CaChain => 0,
        CredentialKind::ClientCert => 1,
        CredentialKind::ClientKey => 2,
    }
}

#[cfg(target_os = "espidf")]
fn usecmng_type(kind: CredentialKind) -> &'static str {
    match kind {
        CredentialKind::CaChain => "\"CA\"",
        CredentialKind::ClientCert => "\"CC\"",
        CredentialKind::ClientKey => "\"PK\"",
    }
}

// ── PdnPort ───────────────────────────────────────────────────

impl PdnPort for CellularModem {
    #[cfg(target_os = "espidf")]
    fn pdn_create(&mut self) -> Result<u8, PdnError> {
        // A single application context; CID 1 is the module's first
        // user-definable context.
        Ok(1)
    }

    #[cfg(not(target_os = "espidf"))]
    fn pdn_create(&mut self) -> Result<u8, PdnError> {
        self.sim.pdn_create()
    }

    #[cfg(target_os = "espidf")]
    fn pdn_configure(&mut self, cid: u8, apn: &str, family: IpFamily) -> Result<(), PdnError> {
        use core::fmt::Write as _;
        let family_tag = match family {
            IpFamily::V4 => "IP",
            IpFamily::V6 => "IPV6",
            IpFamily::V4V6 => "IPV4V6",
        };
        let mut cmd = heapless::String::<96>::new();
        let _ = write!(cmd, "AT+CGDCONT={cid},\"{family_tag}\",\"{apn}\"");
        self.link
            .as_ref()
            .ok_or(PdnError::ConfigureFailed)?
            .command(&cmd, 5_000)
            .map_err(|_| PdnError::ConfigureFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn pdn_configure(&mut self, cid: u8, apn: &str, family: IpFamily) -> Result<(), PdnError> {
        self.sim.pdn_configure(cid, apn, family)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests (host path)
// ───────────────────────────────────────────────────────────────
