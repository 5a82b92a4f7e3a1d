#![no_main]
use libfuzzer_sys::fuzz_target;
use nbft::DecodeConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = DecodeConfig::from_yaml_str(text);
    }
});
