//! Fuzz target for the binary model-record decoder.
//!
//! Models may be loaded from untrusted files; decoding must reject
//! malformed input with an error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(records) = mt_core::io::binary::decode(data) {
        let _ = records.into_model();
    }
});
