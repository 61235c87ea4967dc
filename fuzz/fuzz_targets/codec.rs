#![no_main]

use libfuzzer_sys::fuzz_target;
use uqconn_core::codec;

fuzz_target!(|data: &[u8]| {
    // Fuzz frame decoding - should never panic on any input
    let _ = codec::decode(data);
});
