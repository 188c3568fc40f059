//! ESP-IDF AT link — UART1 plumbing for the modem adapter.
//!
//! One reader thread owns the receive side for the life of the link.
//! Complete lines are classified exactly once:
//!
//! - unsolicited result codes (`+CEREG: …`) → translated by
//!   [`super::parse_urc`] and delivered through the installed hook on this
//!   thread (the modem notification context);
//! - everything else → routed to the command issuer over a channel.
//!
//! Commands are therefore always issued from the main context and never
//! race the reader for UART bytes.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use esp_idf_svc::sys::*;
use log::{debug, warn};

use crate::app::ports::ModemEventHook;
use crate::error::ModemError;
use crate::pins;

/// UART port wired to the modem module.
const MODEM_UART: uart_port_t = 1;

/// Driver receive buffer (bytes).
const UART_RX_BUF: i32 = 2048;

/// Longest response line we accept before discarding.
const MAX_LINE: usize = 256;

pub(super) struct AtLink {
    responses: Mutex<Receiver<heapless::String<MAX_LINE>>>,
    hook: Arc<Mutex<Option<ModemEventHook>>>,
}

impl AtLink {
    /// Install the UART driver and start the reader thread.
    pub(super) fn init() -> Result<Self, ModemError> {
        let cfg = uart_config_t {
            baud_rate: pins::MODEM_UART_BAUD as i32,
            data_bits: uart_word_length_t_UART_DATA_8_BITS,
            parity: uart_parity_t_UART_PARITY_DISABLE,
            stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
            flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
            ..Default::default()
        };

        // SAFETY: one-shot init from the main context before any use.
        let rc = unsafe { uart_param_config(MODEM_UART, &cfg) };
        if rc != ESP_OK as i32 {
            return Err(ModemError::LibInitFailed);
        }
        let rc = unsafe {
            uart_set_pin(
                MODEM_UART,
                pins::MODEM_UART_TX_GPIO,
                pins::MODEM_UART_RX_GPIO,
                -1,
                -1,
            )
        };
        if rc != ESP_OK as i32 {
            return Err(ModemError::LibInitFailed);
        }
        let rc = unsafe {
            uart_driver_install(MODEM_UART, UART_RX_BUF, 0, 0, core::ptr::null_mut(), 0)
        };
        if rc != ESP_OK as i32 {
            return Err(ModemError::LibInitFailed);
        }

        let (tx, rx) = mpsc::channel();
        let hook: Arc<Mutex<Option<ModemEventHook>>> = Arc::new(Mutex::new(None));
        spawn_reader(tx, Arc::clone(&hook));

        Ok(Self {
            responses: Mutex::new(rx),
            hook,
        })
    }

    /// Make `hook` the notification sink.  Replaces any previous hook.
    pub(super) fn install_hook(&self, hook: ModemEventHook) {
        if let Ok(mut slot) = self.hook.lock() {
            *slot = Some(hook);
        }
    }

    /// Drop the notification sink; subsequent URCs are logged and discarded.
    pub(super) fn clear_hook(&self) {
        if let Ok(mut slot) = self.hook.lock() {
            *slot = None;
        }
    }

    /// Issue `cmd` and wait for the final result code.
    pub(super) fn command(&self, cmd: &str, timeout_ms: u32) -> Result<(), ModemError> {
        self.write_bytes(cmd.as_bytes())?;
        self.write_bytes(b"\r\n")?;
        self.await_final(timeout_ms, None)
    }

    /// Issue `cmd`, stream `payload` after it, then wait for the result.
    /// Used by credential imports, where the module expects the raw bytes
    /// immediately after the command line.
    pub(super) fn command_with_payload(
        &self,
        cmd: &str,
        payload: &[u8],
        timeout_ms: u32,
    ) -> Result<(), ModemError> {
        self.write_bytes(cmd.as_bytes())?;
        self.write_bytes(b"\r\n")?;
        self.write_bytes(payload)?;
        self.await_final(timeout_ms, None)
    }

    /// Issue `cmd` and collect intermediate lines until the final result.
    pub(super) fn query(
        &self,
        cmd: &str,
        timeout_ms: u32,
    ) -> Result<Vec<heapless::String<MAX_LINE>>, ModemError> {
        self.write_bytes(cmd.as_bytes())?;
        self.write_bytes(b"\r\n")?;
        let mut lines = Vec::new();
        self.await_final(timeout_ms, Some(&mut lines))?;
        Ok(lines)
    }

    fn write_bytes(&self, bytes: &[u8]) -> Result<(), ModemError> {
        let written = unsafe {
            uart_write_bytes(MODEM_UART, bytes.as_ptr().cast(), bytes.len())
        };
        if written < 0 || written as usize != bytes.len() {
            return Err(ModemError::LinkError);
        }
        Ok(())
    }

    /// Drain response lines until OK / ERROR or the deadline.
    fn await_final(
        &self,
        timeout_ms: u32,
        mut collect: Option<&mut Vec<heapless::String<MAX_LINE>>>,
    ) -> Result<(), ModemError> {
        let rx = self.responses.lock().map_err(|_| ModemError::LinkError)?;
        let deadline = std::time::Instant::now() + Duration::from_millis(u64::from(timeout_ms));
        loop {
            let now = std::time::Instant::now();
            if now >= deadline {
                return Err(ModemError::LinkError);
            }
            let line = match rx.recv_timeout(deadline - now) {
                Ok(line) => line,
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                    return Err(ModemError::LinkError);
                }
            };
            match line.as_str() {
                "OK" => return Ok(()),
                "ERROR" => return Err(ModemError::LinkError),
                l if l.starts_with("+CME ERROR") || l.starts_with("+CMS ERROR") => {
                    warn!("modem: {l}");
                    return Err(ModemError::LinkError);
                }
                _ => {
                    if let Some(lines) = collect.as_mut() {
                        lines.push(line);
                    }
                }
            }
        }
    }
}

/// Reader thread: assemble lines, classify, dispatch.
fn spawn_reader(
    responses: Sender<heapless::String<MAX_LINE>>,
    hook: Arc<Mutex<Option<ModemEventHook>>>,
) {
    let _ = thread::spawn(move || {
        let mut line: heapless::String<MAX_LINE> = heapless::String::new();
        let mut byte = [0u8; 1];
        loop {
            let n = unsafe {
                uart_read_bytes(
                    MODEM_UART,
                    byte.as_mut_ptr().cast(),
                    1,
                    100, // RTOS ticks; bounded so the thread stays responsive
                )
            };
            if n <= 0 {
                continue;
            }
            match byte[0] {
                b'\r' => {}
                b'\n' => {
                    if line.is_empty() {
                        continue;
                    }
                    dispatch_line(&line, &responses, &hook);
                    line.clear();
                }
                b => {
                    if line.push(b as char).is_err() {
                        warn!("modem: response line over {MAX_LINE} bytes, discarding");
                        line.clear();
                    }
                }
            }
        }
    });
}

fn dispatch_line(
    line: &heapless::String<MAX_LINE>,
    responses: &Sender<heapless::String<MAX_LINE>>,
    hook: &Arc<Mutex<Option<ModemEventHook>>>,
) {
    let events = super::parse_urc(line.as_str());
    if events.is_empty() {
        // Command response — back to the issuer.
        let _ = responses.send(line.clone());
        return;
    }
    match hook.lock() {
        Ok(slot) => match slot.as_ref() {
            Some(hook) => {
                for evt in events {
                    hook(evt);
                }
            }
            None => debug!("modem: URC with no hook installed: {line}"),
        },
        Err(_) => {}
    }
}
