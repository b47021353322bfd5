//! Fuzz target for the argument scanner.
//!
//! Run with: cargo +nightly fuzz run fuzz_args_parser
//!
//! Splits the input on NUL bytes into an argument vector and scans it. Any
//! outcome is fine as long as the scanner does not panic, and a successful
//! scan must only hold options the registry knows.

#![no_main]

use codeport_config::{Registry, Scanner};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let argv: Vec<&str> = s.split('\0').collect();
    let registry = Registry::standard();
    if let Ok(raw) = Scanner::new(registry, "/fuzz").scan(&argv) {
        for name in raw.names() {
            assert!(registry.get(name).is_some());
        }
    }
});
