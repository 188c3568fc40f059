//! Boot sequence composition.
//!
//! Strings the bootstrap stages together in their required order:
//! connectivity (modem library → certificate → PDN → attach → PSM), then
//! authentication.  Any fatal error propagates to the caller, which
//! diverts into the fallback state.

use log::info;

use crate::app::context::BootContext;
use crate::app::ports::{AuthPort, ModemControlPort, PdnPort, SecureStorePort, TimePort};
use crate::auth;
use crate::conn::ConnectivityManager;
use crate::error::Result;

/// Run the full bootstrap against the given collaborators.
pub fn run(
    ctx: &mut BootContext,
    modem: &mut (impl ModemControlPort + SecureStorePort + PdnPort),
    endpoint: &mut impl AuthPort,
    clock: &impl TimePort,
) -> Result<()> {
    let mut conn = ConnectivityManager::new();
    conn.establish(modem, clock, &ctx.registration, &ctx.config)?;
    info!(
        "connectivity up after {} attempt(s)",
        conn.session().attempts_started()
    );

    auth::bootstrap(endpoint, clock, &ctx.config, &mut ctx.credentials)?;
    info!("credentials committed");

    Ok(())
}
