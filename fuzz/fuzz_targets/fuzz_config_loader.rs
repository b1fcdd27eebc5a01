#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml) = std::str::from_utf8(data) {
        // Loading must reject bad input with an error, never a panic.
        let _ = confession::config::load_str(yaml, "<fuzz>");
    }
});
