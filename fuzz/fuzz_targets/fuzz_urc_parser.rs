//! Fuzz target: `modem::parse_urc`
//!
//! Drives arbitrary byte sequences (as lossy UTF-8 lines) into the URC
//! parser and asserts it never panics and never yields more events than a
//! single `+CEREG` line can encode.
//!
//! cargo fuzz run fuzz_urc_parser

#![no_main]

use cellpoint::adapters::modem::parse_urc;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);
    let events = parse_urc(&line);

    // Status, cell update, mode update — at most one of each per line.
    assert!(events.len() <= 3, "more events than a +CEREG line encodes");

    // Parsing is a pure function of the line.
    let again = parse_urc(&line);
    assert_eq!(events.as_slice(), again.as_slice());
});
