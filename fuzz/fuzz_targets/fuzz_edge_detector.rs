//! Fuzz target: `drivers::button::EdgeDetector`
//!
//! Feeds arbitrary level/error sample sequences and asserts the detector
//! never panics and never reports more edges than successful high samples.
//!
//! cargo fuzz run fuzz_edge_detector

#![no_main]

use cellpoint::drivers::button::EdgeDetector;
use cellpoint::error::GpioError;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut det = EdgeDetector::new();
    let mut edges = 0usize;
    let mut highs = 0usize;

    for byte in data {
        let sample = match byte % 3 {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(GpioError::ReadFailed),
        };
        if sample == Ok(true) {
            highs += 1;
        }
        if det.feed(sample) {
            edges += 1;
        }
    }

    assert!(edges <= highs, "more edges than high samples");
});
