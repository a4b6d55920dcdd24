//! Fuzz target for CURIE checking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sample_annotator::identifier::{StaticPrefixRegistry, check_curie};

fuzz_target!(|data: &[u8]| {
    let registry = StaticPrefixRegistry::builtin();
    if let Ok(input) = std::str::from_utf8(data) {
        let check = check_curie(input, "id", &registry);
        // The identifier is never dropped, only rewritten.
        assert!(!check.identifier.is_empty() || input.trim().is_empty());
    }
});
