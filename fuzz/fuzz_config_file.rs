//! Fuzz target for the TOML config-file layer.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_file

#![no_main]

use std::path::Path;

use codeport_config::{ConfigFile, Registry};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = ConfigFile::parse(Path::new("/fuzz/config.toml"), s, Registry::standard());
    }
});
