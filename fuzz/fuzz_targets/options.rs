//! Fuzz target for declarative options loading.
//!
//! Feeds arbitrary JSON to the options deserializer.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_options
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use sideload_core::SerializeOptions;

fuzz_target!(|data: &[u8]| {
    // Loading should never panic, only return errors
    if let Ok(options) = serde_json::from_slice::<SerializeOptions>(data) {
        for path in options.include_paths() {
            assert!(!path.trim().is_empty());
        }
    }
});
