#![no_main]

use bottlescope::{PeHeaderDecoder, DecodeFailure};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Err(failure) = PeHeaderDecoder::decode(data) {
        assert_eq!(failure, DecodeFailure::INVALID_PE_FILE);
    }
});
