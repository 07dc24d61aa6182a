//! Fuzz target for the text model-record decoder.
//!
//! Tests that decoding handles arbitrary input without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // The decoder should never panic, only return an error
    if let Ok(records) = mt_core::io::text::decode(data) {
        let _ = records.into_model();
    }
});
