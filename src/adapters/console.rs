//! Process-wide diagnostic console sink.
//!
//! User-visible terminal lines (attach progress, auth results, download
//! hex dumps) are distinct from engineering logs: operators tail this
//! stream, tooling parses it, and the registration handler writes to it
//! from the modem notification context.  That last point is why the sink
//! is the one ambient global in the firmware — the handler owns no `&mut`
//! reference into the boot context.
//!
//! Output is best-effort and unbuffered: a missing or failing sink drops
//! text silently, never blocks, never propagates an error.
//!
//! By default text goes to the standard output (the ESP-IDF console UART
//! on target, stdout on the host).  Tests and alternative front-ends can
//! [`install`] their own [`ConsoleSink`].

use std::sync::Mutex;

/// Byte-oriented text sink.  Implementations must not block for long —
/// the registration handler calls into this from the notification context.
pub trait ConsoleSink: Send {
    fn write_text(&mut self, text: &str);
}

static SINK: Mutex<Option<Box<dyn ConsoleSink>>> = Mutex::new(None);

/// Replace the process-wide sink.  Returns the previous one, if any.
pub fn install(sink: Box<dyn ConsoleSink>) -> Option<Box<dyn ConsoleSink>> {
    match SINK.lock() {
        Ok(mut slot) => slot.replace(sink),
        Err(_) => None,
    }
}

/// Remove the installed sink, reverting to the default output.
pub fn uninstall() -> Option<Box<dyn ConsoleSink>> {
    match SINK.lock() {
        Ok(mut slot) => slot.take(),
        Err(_) => None,
    }
}

/// Emit `text` verbatim.
pub fn print(text: &str) {
    // Poisoning is impossible to act on here; drop the text instead.
    if let Ok(mut slot) = SINK.lock() {
        match slot.as_mut() {
            Some(sink) => sink.write_text(text),
            None => default_write(text),
        }
    }
}

/// Emit `text` followed by the terminal line ending.
pub fn print_line(text: &str) {
    print(text);
    print("\r\n");
}

fn default_write(text: &str) {
    // ESP-IDF routes stdout to the console UART, so one path serves both
    // targets.
    use std::io::Write;
    let mut out = std::io::stdout();
    let _ = out.write_all(text.as_bytes());
    let _ = out.flush();
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
