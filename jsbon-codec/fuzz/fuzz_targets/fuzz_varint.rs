#![no_main]

use jsbon_format::stream::ByteReader;
use jsbon_format::varint::read_count;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = ByteReader::new(data);
    let _ = read_count(&mut reader);
});
