// SPDX-License-Identifier: PMPL-1.0-or-later
#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Parsing must never panic; pruning must be idempotent
        if let Ok(doc) = contrastbot::parse(s) {
            let pruned = contrastbot::prune_color_declarations(&doc);
            assert_eq!(pruned, contrastbot::prune_color_declarations(&pruned));
        }
    }
});
