//! Fuzz target for `host[:port]` parsing.
//!
//! Run with: cargo +nightly fuzz run fuzz_bind_addr
//!
//! A parsed address must survive a trip through its `Display` form.

#![no_main]

use codeport_config::Address;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(addr) = Address::parse_bind_addr(s) {
        let again = Address::parse_bind_addr(&addr.to_string());
        assert_eq!(again.as_ref(), Ok(&addr));
    }
});
