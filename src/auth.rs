//! Authentication bootstrap against the endpoint service.
//!
//! Unlike the attach loop, the auth handshake retries without bound:
//! an auth failure is assumed transient (the service may simply not have
//! learned our address yet), so the loop backs off a fixed period and
//! tries again until it succeeds.  Committing the obtained credentials to
//! the endpoint client is a single attempt; a commit failure is fatal-boot.

use log::{debug, error};

use crate::adapters::console;
use crate::app::context::Credentials;
use crate::app::ports::{AuthPort, TimePort};
use crate::config::BootConfig;
use crate::error::Result;

/// Obtain and commit operator credentials.
///
/// Blocks until the handshake succeeds; an unresponsive service hangs the
/// boot here indefinitely (no timeout at this boundary).
pub fn bootstrap(
    endpoint: &mut impl AuthPort,
    clock: &impl TimePort,
    config: &BootConfig,
    credentials: &mut Credentials,
) -> Result<()> {
    loop {
        console::print_line("Requesting endpoint credentials...");
        match endpoint.request_auth(&mut credentials.user, &mut credentials.pass) {
            Ok(()) => {
                console::print_line("OK");
                break;
            }
            Err(e) => {
                debug!("auth request failed: {e}");
                console::print_line(&format!(
                    "failed (retry after {}s)",
                    config.auth_retry_backoff_ms / 1000
                ));
                clock.sleep_ms(config.auth_retry_backoff_ms);
            }
        }
    }

    endpoint
        .set_auth_info(credentials.user.as_str(), credentials.pass.as_str())
        .map_err(|e| {
            error!("credential commit failed: {e}");
            e
        })?;
    credentials.mark_committed();

    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
