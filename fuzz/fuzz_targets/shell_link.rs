#![no_main]

use bottlescope::{DecoderConfig, ShellLinkDecoder};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let decoder = ShellLinkDecoder::new(DecoderConfig::default());
    if let Ok(link) = decoder.decode(data) {
        let _ = link.target();
    }
});
