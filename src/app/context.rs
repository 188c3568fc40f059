//! The explicit boot context.
//!
//! Everything that is process-wide mutable state lives in one value
//! constructed at the top of `main` and threaded by reference through the
//! bootstrap and supervisory routines: the build-time configuration, the
//! operator credentials, and the registration signal shared with the modem
//! notification context.  The diagnostic console is the single exception
//! (see [`crate::adapters::console`]).

use std::sync::Arc;

use crate::config::{BootConfig, CREDENTIAL_CAPACITY};
use crate::conn::registration::RegistrationSignal;

/// Fixed-capacity credential buffer.
pub type CredentialBuf = heapless::String<CREDENTIAL_CAPACITY>;

/// Operator credentials for the endpoint service.
///
/// Written once per boot by the auth bootstrapper, strictly before any
/// reader exists; treated as immutable afterwards.
#[derive(Debug, Default)]
pub struct Credentials {
    pub user: CredentialBuf,
    pub pass: CredentialBuf,
    committed: bool,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the credentials were committed to the endpoint client.
    /// Called exactly once per successful boot.
    pub fn mark_committed(&mut self) {
        debug_assert!(!self.committed, "credentials committed twice");
        self.committed = true;
    }

    /// Whether the credentials have been committed and may be read.
    pub fn is_committed(&self) -> bool {
        self.committed
    }
}

/// Process-wide boot state, constructed once in `main`.
pub struct BootContext {
    pub config: BootConfig,
    pub credentials: Credentials,
    /// Shared with the modem notification context via the event hook.
    pub registration: Arc<RegistrationSignal>,
}

impl BootContext {
    pub fn new(config: BootConfig) -> Self {
        Self {
            config,
            credentials: Credentials::new(),
            registration: Arc::new(RegistrationSignal::new()),
        }
    }
}
