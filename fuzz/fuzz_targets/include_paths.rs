//! Fuzz target for include path parsing.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_include_paths
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sideload_core::{InclusionTree, normalize_paths};

#[derive(Debug, Arbitrary)]
struct Input {
    raw: String,
    paths: Vec<String>,
}

fuzz_target!(|input: Input| {
    // Parsing never fails and never panics.
    let Ok(tree) = input.raw.parse::<InclusionTree>();
    let _ = tree.linkage_names();

    let normalized = normalize_paths(&input.paths);
    let once = InclusionTree::parse(&normalized);
    let twice = InclusionTree::parse(&normalized).merge(InclusionTree::parse(&normalized));
    assert_eq!(once, twice);

    for path in &normalized {
        assert!(once.contains(path.trim()));
    }
});
