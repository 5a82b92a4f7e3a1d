#![no_main]
use libfuzzer_sys::fuzz_target;
use nbft::{ChecksumPolicy, DecodeConfig, Nbft};

fuzz_target!(|data: &[u8]| {
    let config = DecodeConfig {
        checksum: ChecksumPolicy::Ignore,
        ..DecodeConfig::default()
    };
    if let Ok(table) = Nbft::parse_with(data, &config) {
        let report = table.report();
        let _ = serde_json::to_vec(&report);
    }
});
