//! Unified error types for the CellPoint firmware.
//!
//! Follows embedded best practice: a single `Error` enum that every subsystem
//! can convert into, keeping the top-level boot sequence's error handling
//! uniform.  All variants are `Copy` so they can be cheaply passed through
//! the bootstrap state machine without allocation.
//!
//! Every variant reaching `main` is fatal-boot and diverts the firmware
//! into the fallback blink loop; non-fatal conditions (PSM refusal,
//! certificate delete failure, button read errors, download failures) are
//! absorbed where they occur and never surface here.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fatal-boot condition in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The modem library or LTE control stack failed.
    Modem(ModemError),
    /// The modem credential store rejected an operation.
    Store(StoreError),
    /// Packet-data context creation or configuration failed.
    Pdn(PdnError),
    /// All network-attach attempts were exhausted without registration.
    AttachExhausted,
    /// Committing operator credentials to the endpoint client failed.
    Auth(AuthError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modem(e) => write!(f, "modem: {e}"),
            Self::Store(e) => write!(f, "credential store: {e}"),
            Self::Pdn(e) => write!(f, "pdn: {e}"),
            Self::AttachExhausted => write!(f, "attach attempts exhausted"),
            Self::Auth(e) => write!(f, "auth: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Modem control errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemError {
    /// Modem library initialisation failed.
    LibInitFailed,
    /// LTE control stack initialisation failed.
    LteInitFailed,
    /// The asynchronous connect request was rejected.
    ConnectRequestFailed,
    /// Enabling modem event notifications failed.
    EventsEnableFailed,
    /// The PSM negotiation was refused (non-fatal at the call site).
    PsmRefused,
    /// The AT link to the modem returned an error or garbage.
    LinkError,
}

impl fmt::Display for ModemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LibInitFailed => write!(f, "library init failed"),
            Self::LteInitFailed => write!(f, "LTE stack init failed"),
            Self::ConnectRequestFailed => write!(f, "connect request failed"),
            Self::EventsEnableFailed => write!(f, "event enable failed"),
            Self::PsmRefused => write!(f, "PSM request refused"),
            Self::LinkError => write!(f, "AT link error"),
        }
    }
}

impl From<ModemError> for Error {
    fn from(e: ModemError) -> Self {
        Self::Modem(e)
    }
}

// ---------------------------------------------------------------------------
// Credential store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The existence query itself failed.
    QueryFailed,
    /// Deleting the previous credential failed.
    DeleteFailed,
    /// Writing the credential failed.
    WriteFailed,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueryFailed => write!(f, "existence query failed"),
            Self::DeleteFailed => write!(f, "delete failed"),
            Self::WriteFailed => write!(f, "write failed"),
        }
    }
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

// ---------------------------------------------------------------------------
// PDN errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdnError {
    /// No free packet-data context is available.
    ContextCreateFailed,
    /// The APN / address-family configuration was rejected.
    ConfigureFailed,
}

impl fmt::Display for PdnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContextCreateFailed => write!(f, "context create failed"),
            Self::ConfigureFailed => write!(f, "APN configure failed"),
        }
    }
}

impl From<PdnError> for Error {
    fn from(e: PdnError) -> Self {
        Self::Pdn(e)
    }
}

// ---------------------------------------------------------------------------
// Authentication errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// The authentication request was refused or timed out (retryable).
    RequestFailed,
    /// The returned credential material did not fit the fixed buffers.
    CredentialOverflow,
    /// Committing credentials to the endpoint client failed (fatal).
    CommitFailed,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed => write!(f, "request failed"),
            Self::CredentialOverflow => write!(f, "credential too large"),
            Self::CommitFailed => write!(f, "credential commit failed"),
        }
    }
}

impl From<AuthError> for Error {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

// ---------------------------------------------------------------------------
// File-transfer errors (operation-local; never reach `Error`)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError {
    /// The transfer connection could not be established.
    ConnectFailed,
    /// The endpoint refused the request (bad name, bad range).
    Rejected,
    /// The stream broke mid-transfer.
    Aborted,
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed => write!(f, "connect failed"),
            Self::Rejected => write!(f, "request rejected"),
            Self::Aborted => write!(f, "stream aborted"),
        }
    }
}

// ---------------------------------------------------------------------------
// GPIO errors (degraded-non-fatal at the read site)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// The pin read returned an error.
    ReadFailed,
    /// The pin could not be configured.
    ConfigFailed,
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "pin read failed"),
            Self::ConfigFailed => write!(f, "pin config failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
