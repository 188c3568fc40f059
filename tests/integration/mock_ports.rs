//! Shared mock adapters for the integration suites.
//!
//! One `OpLog` is threaded through every mock so the suites can assert
//! cross-port ordering (certificate before PDN, attach before auth, …).

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cellpoint::adapters::console::{self, ConsoleSink};
use cellpoint::app::context::CredentialBuf;
use cellpoint::app::ports::{
    AuthPort, ByteRange, CredentialKind, FileTransferPort, IndicatorPort, InputPort, IpFamily,
    ModemControlPort, ModemEventHook, PdnPort, SecureStorePort, TimePort,
};
use cellpoint::conn::registration::{ModemEvent, RegStatus};
use cellpoint::error::{
    AuthError, GpioError, ModemError, PdnError, StoreError, TransferError,
};

// ───────────────────────────────────────────────────────────────
// Operation log
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    LibInit,
    CredExists,
    CredDelete,
    CredWrite,
    PdnCreate,
    PdnConfigure,
    LteInit,
    EventsEnable,
    ConnectAsync,
    Offline,
    LteDeinit,
    PsmRequest,
    AuthRequest,
    AuthCommit,
}

pub type OpLog = Rc<RefCell<Vec<Op>>>;

pub fn new_op_log() -> OpLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn position(log: &OpLog, op: Op) -> Option<usize> {
    log.borrow().iter().position(|o| *o == op)
}

// ───────────────────────────────────────────────────────────────
// Simulated clock
// ───────────────────────────────────────────────────────────────

/// Virtual clock: `sleep_ms` advances virtual time and fires any scheduled
/// registration hooks that fall due — the test's stand-in for the modem
/// notification context.
pub struct SimClock {
    now: Cell<u64>,
    sleeps: RefCell<Vec<u32>>,
    schedule: RefCell<Vec<(u64, ModemEventHook)>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(0),
            sleeps: RefCell::new(Vec::new()),
            schedule: RefCell::new(Vec::new()),
        }
    }

    pub fn schedule_registration(&self, at_ms: u64, hook: ModemEventHook) {
        self.schedule.borrow_mut().push((at_ms, hook));
    }

    /// Sleeps of exactly `ms`, in order (backoff assertions).
    pub fn sleeps_of(&self, ms: u32) -> usize {
        self.sleeps.borrow().iter().filter(|&&s| s == ms).count()
    }
}

impl TimePort for SimClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn sleep_ms(&self, ms: u32) {
        let next = self.now.get() + u64::from(ms);
        self.now.set(next);
        self.sleeps.borrow_mut().push(ms);

        let due: Vec<_> = {
            let mut sched = self.schedule.borrow_mut();
            let (fire, keep) = std::mem::take(&mut *sched)
                .into_iter()
                .partition(|(at, _)| *at <= next);
            *sched = keep;
            fire
        };
        for (_, hook) in due {
            hook(ModemEvent::RegStatus(RegStatus::Searching));
            hook(ModemEvent::RegStatus(RegStatus::RegisteredHome));
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Mock modem
// ───────────────────────────────────────────────────────────────

/// Scripted modem: registers `register_delay_ms` after the connect request
/// of attempt `register_on_attempt` (1-based); other attempts time out.
pub struct MockModem<'a> {
    pub clock: &'a SimClock,
    pub log: OpLog,
    pub register_on_attempt: u8,
    pub register_delay_ms: u64,
    pub cert_present: bool,
    pub stored_cert: Option<Vec<u8>>,
    connects: u8,
}

impl<'a> MockModem<'a> {
    pub fn new(clock: &'a SimClock, log: OpLog, register_on_attempt: u8) -> Self {
        Self {
            clock,
            log,
            register_on_attempt,
            register_delay_ms: 500,
            cert_present: false,
            stored_cert: None,
            connects: 0,
        }
    }

    pub fn resets(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|&&o| o == Op::Offline)
            .count()
    }
}

impl ModemControlPort for MockModem<'_> {
    fn lib_init(&mut self) -> Result<(), ModemError> {
        self.log.borrow_mut().push(Op::LibInit);
        Ok(())
    }

    fn lte_init(&mut self) -> Result<(), ModemError> {
        self.log.borrow_mut().push(Op::LteInit);
        Ok(())
    }

    fn events_enable(&mut self) -> Result<(), ModemError> {
        self.log.borrow_mut().push(Op::EventsEnable);
        Ok(())
    }

    fn connect_async(&mut self, hook: ModemEventHook) -> Result<(), ModemError> {
        self.log.borrow_mut().push(Op::ConnectAsync);
        self.connects += 1;
        if self.connects == self.register_on_attempt {
            self.clock
                .schedule_registration(self.clock.now_ms() + self.register_delay_ms, hook);
        }
        Ok(())
    }

    fn offline(&mut self) {
        self.log.borrow_mut().push(Op::Offline);
    }

    fn lte_deinit(&mut self) {
        self.log.borrow_mut().push(Op::LteDeinit);
    }

    fn psm_request(&mut self, _enable: bool) -> Result<(), ModemError> {
        self.log.borrow_mut().push(Op::PsmRequest);
        Ok(())
    }
}

impl SecureStorePort for MockModem<'_> {
    fn cred_exists(&mut self, _tag: u32, _kind: CredentialKind) -> Result<bool, StoreError> {
        self.log.borrow_mut().push(Op::CredExists);
        Ok(self.cert_present)
    }

    fn cred_delete(&mut self, _tag: u32, _kind: CredentialKind) -> Result<(), StoreError> {
        self.log.borrow_mut().push(Op::CredDelete);
        self.cert_present = false;
        Ok(())
    }

    fn cred_write(
        &mut self,
        _tag: u32,
        _kind: CredentialKind,
        data: &[u8],
    ) -> Result<(), StoreError> {
        self.log.borrow_mut().push(Op::CredWrite);
        self.stored_cert = Some(data.to_vec());
        self.cert_present = true;
        Ok(())
    }
}

impl PdnPort for MockModem<'_> {
    fn pdn_create(&mut self) -> Result<u8, PdnError> {
        self.log.borrow_mut().push(Op::PdnCreate);
        Ok(1)
    }

    fn pdn_configure(&mut self, cid: u8, apn: &str, family: IpFamily) -> Result<(), PdnError> {
        self.log.borrow_mut().push(Op::PdnConfigure);
        assert_eq!(cid, 1);
        assert!(!apn.is_empty());
        assert_eq!(family, IpFamily::V4);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Mock auth endpoint
// ───────────────────────────────────────────────────────────────

pub struct MockAuth {
    pub log: OpLog,
    pub failures_before_success: u32,
    pub requests: u32,
    pub committed: Option<(String, String)>,
}

impl MockAuth {
    pub fn new(log: OpLog, failures_before_success: u32) -> Self {
        Self {
            log,
            failures_before_success,
            requests: 0,
            committed: None,
        }
    }
}

impl AuthPort for MockAuth {
    fn request_auth(
        &mut self,
        user: &mut CredentialBuf,
        pass: &mut CredentialBuf,
    ) -> Result<(), AuthError> {
        self.log.borrow_mut().push(Op::AuthRequest);
        self.requests += 1;
        if self.requests <= self.failures_before_success {
            return Err(AuthError::RequestFailed);
        }
        user.clear();
        pass.clear();
        let _ = user.push_str(&format!("device-{:04}", self.requests));
        let _ = pass.push_str("operator-secret");
        Ok(())
    }

    fn set_auth_info(&mut self, user: &str, pass: &str) -> Result<(), AuthError> {
        self.log.borrow_mut().push(Op::AuthCommit);
        self.committed = Some((user.to_owned(), pass.to_owned()));
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Board mocks
// ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeLeds {
    pub boot: bool,
    pub state: bool,
    pub state_toggles: u32,
    pub boot_toggles: u32,
}

impl IndicatorPort for FakeLeds {
    fn set_boot(&mut self, on: bool) {
        self.boot = on;
    }
    fn toggle_boot(&mut self) {
        self.boot = !self.boot;
        self.boot_toggles += 1;
    }
    fn set_state(&mut self, on: bool) {
        self.state = on;
    }
    fn toggle_state(&mut self) {
        self.state = !self.state;
        self.state_toggles += 1;
    }
}

pub struct ScriptedButton {
    levels: Vec<Result<bool, GpioError>>,
    cursor: usize,
}

impl ScriptedButton {
    pub fn new(levels: Vec<Result<bool, GpioError>>) -> Self {
        Self { levels, cursor: 0 }
    }
}

impl InputPort for ScriptedButton {
    fn read_level(&mut self) -> Result<bool, GpioError> {
        let level = self.levels.get(self.cursor).copied().unwrap_or(Ok(false));
        self.cursor += 1;
        level
    }
}

pub struct FakeTransfer {
    pub chunks: Vec<Vec<u8>>,
    pub result: Result<usize, TransferError>,
    pub downloads: u32,
    pub last_name: Option<String>,
}

impl FakeTransfer {
    pub fn new(chunks: Vec<Vec<u8>>, result: Result<usize, TransferError>) -> Self {
        Self {
            chunks,
            result,
            downloads: 0,
            last_name: None,
        }
    }
}

impl FileTransferPort for FakeTransfer {
    fn download(
        &mut self,
        name: &str,
        _range: Option<ByteRange>,
        _max_chunk: usize,
        on_chunk: &mut dyn FnMut(&[u8]),
    ) -> Result<usize, TransferError> {
        self.downloads += 1;
        self.last_name = Some(name.to_owned());
        for c in &self.chunks {
            on_chunk(c);
        }
        self.result
    }
}

// ───────────────────────────────────────────────────────────────
// Console capture
// ───────────────────────────────────────────────────────────────

/// The console sink is process-global; tests that install one hold this.
static CONSOLE_SERIAL: Mutex<()> = Mutex::new(());

pub fn console_guard() -> MutexGuard<'static, ()> {
    CONSOLE_SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone, Default)]
pub struct ConsoleCapture {
    buf: Arc<Mutex<String>>,
}

impl ConsoleCapture {
    pub fn install() -> Self {
        let cap = Self::default();
        let _ = console::install(Box::new(CaptureSink {
            buf: Arc::clone(&cap.buf),
        }));
        cap
    }

    pub fn contents(&self) -> String {
        self.buf.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn line_count(&self, line: &str) -> usize {
        self.contents()
            .split("\r\n")
            .filter(|l| *l == line)
            .count()
    }
}

struct CaptureSink {
    buf: Arc<Mutex<String>>,
}

impl ConsoleSink for CaptureSink {
    fn write_text(&mut self, text: &str) {
        if let Ok(mut buf) = self.buf.lock() {
            buf.push_str(text);
        }
    }
}
