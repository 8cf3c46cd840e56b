#![no_main]
use ciphersearch_core::{BitSeq, Radix};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(bits) = BitSeq::parse_transmission(s) {
        assert_eq!(bits.to_transmission_string(), s);
        let _ = Radix::Base62.render(&bits);
        let _ = Radix::Decimal.render(&bits);
    }
});
