//! Bootstrap integration: certificate → PDN → attach → PSM → auth.

use std::rc::Rc;
use std::sync::Arc;

use cellpoint::app::context::BootContext;
use cellpoint::app::ports::TimePort;
use cellpoint::bootstrap;
use cellpoint::config::BootConfig;
use cellpoint::conn::registration::RegistrationSignal;
use cellpoint::conn::{ConnectivityManager, SessionState};
use cellpoint::error::Error;

use crate::mock_ports::*;

// ───────────────────────────────────────────────────────────────
// End-to-end attach scenarios (deployment timeouts, simulated)
// ───────────────────────────────────────────────────────────────

/// First attempt times out after the full 120,000 simulated ms with no
/// signal; the second receives registered-home 500 ms in.  Exactly two
/// attempts, exactly one offline+deinit reset.
#[test]
fn end_to_end_two_attempts_one_reset() {
    let _console = console_guard();
    let console = ConsoleCapture::install();

    let config = BootConfig::default();
    let clock = SimClock::new();
    let log = new_op_log();
    let mut modem = MockModem::new(&clock, Rc::clone(&log), 2);
    modem.register_delay_ms = 500;

    let mut mgr = ConnectivityManager::new();
    let signal = Arc::new(RegistrationSignal::new());
    mgr.establish(&mut modem, &clock, &signal, &config).unwrap();

    assert_eq!(mgr.session().state(), SessionState::PsmRequested);
    assert_eq!(mgr.session().attempts_started(), 2);
    assert_eq!(modem.resets(), 1);

    // Attempt 1 burned its whole budget; attempt 2 registered at +500 ms.
    let attempt_ms = u64::from(config.attach_timeout_ms);
    assert!(clock.now_ms() >= attempt_ms + 500);
    assert!(clock.now_ms() < attempt_ms + 500 + 2 * u64::from(config.signal_poll_ms));

    assert_eq!(console.line_count("TIMEOUT"), 1);
    assert_eq!(console.line_count("REGISTERED"), 1);
    assert_eq!(
        console.line_count(&format!(
            "Trying to attach to LTE network (TIMEOUT: {} ms)",
            config.attach_timeout_ms
        )),
        2
    );

    let _ = cellpoint::adapters::console::uninstall();
}

#[test]
fn exhaustion_after_three_full_timeouts() {
    let _console = console_guard();
    let console = ConsoleCapture::install();

    let config = BootConfig::default();
    let clock = SimClock::new();
    let log = new_op_log();
    let mut modem = MockModem::new(&clock, Rc::clone(&log), u8::MAX);

    let mut mgr = ConnectivityManager::new();
    let signal = Arc::new(RegistrationSignal::new());
    let err = mgr
        .establish(&mut modem, &clock, &signal, &config)
        .unwrap_err();

    assert_eq!(err, Error::AttachExhausted);
    assert_eq!(mgr.session().state(), SessionState::Failed);
    assert_eq!(mgr.session().attempts_started(), config.attach_attempts);
    assert_eq!(modem.resets(), usize::from(config.attach_attempts));
    assert!(clock.now_ms() >= 3 * u64::from(config.attach_timeout_ms));
    assert_eq!(console.line_count("TIMEOUT"), 3);
    assert_eq!(console.line_count("REGISTERED"), 0);

    let _ = cellpoint::adapters::console::uninstall();
}

// ───────────────────────────────────────────────────────────────
// Full bootstrap composition
// ───────────────────────────────────────────────────────────────

#[test]
fn bootstrap_orders_cert_pdn_attach_auth() {
    let _console = console_guard();
    let _capture = ConsoleCapture::install();

    let clock = SimClock::new();
    let log = new_op_log();
    let mut modem = MockModem::new(&clock, Rc::clone(&log), 1);
    modem.register_delay_ms = 100;
    let mut auth = MockAuth::new(Rc::clone(&log), 0);

    let mut ctx = BootContext::new(BootConfig::default());
    bootstrap::run(&mut ctx, &mut modem, &mut auth, &clock).unwrap();

    // Ordering invariants: cert before PDN, PDN before attach, attach
    // before any auth traffic, request before commit.
    let cred_write = position(&log, Op::CredWrite).unwrap();
    let pdn_create = position(&log, Op::PdnCreate).unwrap();
    let lte_init = position(&log, Op::LteInit).unwrap();
    let connect = position(&log, Op::ConnectAsync).unwrap();
    let auth_request = position(&log, Op::AuthRequest).unwrap();
    let auth_commit = position(&log, Op::AuthCommit).unwrap();

    assert!(position(&log, Op::CredExists).unwrap() < cred_write);
    assert!(cred_write < pdn_create);
    assert!(pdn_create < lte_init);
    assert!(lte_init < connect);
    assert!(connect < auth_request);
    assert!(auth_request < auth_commit);

    assert!(ctx.credentials.is_committed());
    assert_eq!(
        auth.committed,
        Some(("device-0001".to_owned(), "operator-secret".to_owned()))
    );

    let _ = cellpoint::adapters::console::uninstall();
}

#[test]
fn bootstrap_writes_compiled_in_certificate() {
    let _console = console_guard();
    let _capture = ConsoleCapture::install();

    let clock = SimClock::new();
    let log = new_op_log();
    let mut modem = MockModem::new(&clock, Rc::clone(&log), 1);
    modem.register_delay_ms = 50;
    modem.cert_present = true; // pre-existing credential gets replaced
    let mut auth = MockAuth::new(Rc::clone(&log), 0);

    let mut ctx = BootContext::new(BootConfig::default());
    bootstrap::run(&mut ctx, &mut modem, &mut auth, &clock).unwrap();

    assert!(position(&log, Op::CredDelete).is_some());
    let stored = modem.stored_cert.as_deref().unwrap();
    assert_eq!(stored, cellpoint::conn::cert::payload());

    let _ = cellpoint::adapters::console::uninstall();
}

#[test]
fn auth_backoff_two_failures_then_third_call_wins() {
    let _console = console_guard();
    let console = ConsoleCapture::install();

    let config = BootConfig::default();
    let clock = SimClock::new();
    let log = new_op_log();
    let mut modem = MockModem::new(&clock, Rc::clone(&log), 1);
    modem.register_delay_ms = 50;
    let mut auth = MockAuth::new(Rc::clone(&log), 2);

    let mut ctx = BootContext::new(config);
    bootstrap::run(&mut ctx, &mut modem, &mut auth, &clock).unwrap();

    assert_eq!(auth.requests, 3);
    assert_eq!(clock.sleeps_of(ctx.config.auth_retry_backoff_ms), 2);
    assert_eq!(ctx.credentials.user.as_str(), "device-0003");
    assert_eq!(
        console.line_count(&format!(
            "failed (retry after {}s)",
            ctx.config.auth_retry_backoff_ms / 1000
        )),
        2
    );
    assert_eq!(console.line_count("OK"), 1);

    let _ = cellpoint::adapters::console::uninstall();
}

#[test]
fn attach_failure_prevents_any_auth_traffic() {
    let _console = console_guard();
    let _capture = ConsoleCapture::install();

    let clock = SimClock::new();
    let log = new_op_log();
    let mut modem = MockModem::new(&clock, Rc::clone(&log), u8::MAX);
    let mut auth = MockAuth::new(Rc::clone(&log), 0);

    let mut ctx = BootContext::new(BootConfig::default());
    let err = bootstrap::run(&mut ctx, &mut modem, &mut auth, &clock).unwrap_err();

    assert_eq!(err, Error::AttachExhausted);
    assert_eq!(auth.requests, 0);
    assert!(!ctx.credentials.is_committed());

    let _ = cellpoint::adapters::console::uninstall();
}
