#![no_main]

use confession::cli::script::{ReplayScript, parse_command};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        for line in text.lines() {
            let _ = parse_command(line);
        }
        let _ = ReplayScript::from_yaml(text);
    }
});
