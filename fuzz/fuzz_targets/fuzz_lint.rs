// SPDX-License-Identifier: PMPL-1.0-or-later
#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(report) = contrastbot::lint(s) {
            for ratio in report.results.iter().filter_map(|r| r.ratio()) {
                assert!((1.0..=21.0 + 1e-9).contains(&ratio));
            }
        }
    }
});
