#![no_main]

use diff_dispatch::DiffParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Any input must either parse or stop at the first diagnostic.
    let mut errors = 0;
    for item in DiffParser::new(data, "fuzz.diff") {
        if item.is_err() {
            errors += 1;
        }
    }
    assert!(errors <= 1);
});
