#![no_main]

use jsbon_codec::decode_with_limits;
use jsbon_format::Limits;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = decode_with_limits(data, &Limits::default());
});
