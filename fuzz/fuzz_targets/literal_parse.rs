//! Fuzz target for the permissive literal parser.

#![no_main]

use labelmerge::groups::parse_literal;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_literal(text);
    }
});
