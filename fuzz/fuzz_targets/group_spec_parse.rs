//! Fuzz target for group specification parsing.
//!
//! This fuzzer feeds arbitrary text to the JSON-then-literal spec parser and
//! resolves whatever parses, checking for panics, crashes, or hangs.

#![no_main]

use labelmerge::groups::{parse_group_text, resolve, ResolveOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(spec) = parse_group_text(text) {
        let _ = resolve(&spec, &ResolveOptions::default());
    }
});
