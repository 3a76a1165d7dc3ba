#![no_main]

use libfuzzer_sys::fuzz_target;
use subiq_core::timing::{parse, Protocol};
use subiq_core::{convert_capture, ParamOverrides};

fuzz_target!(|data: &[u8]| {
    let _ = parse(data, None);
    let _ = parse(data, Some(Protocol::Raw));
    let _ = parse(data, Some(Protocol::BinRaw));

    // Only convert short captures.
    if let Ok(capture) = parse(data, None) {
        if capture.stats().total_us() <= 100_000 {
            let overrides = ParamOverrides::new().auto();
            let _ = convert_capture(data, None, &overrides, std::io::sink());
        }
    }
});
