//! Fuzz target: `decode_record`
//!
//! Feeds arbitrary blobs to the settings record validator.  Anything it
//! accepts must re-encode to the exact same bytes.
//!
//! cargo fuzz run fuzz_record_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use lapsecam::store::{decode_record, encode_record};

fuzz_target!(|data: &[u8]| {
    if let Ok(settings) = decode_record(data) {
        let record = encode_record(&settings).expect("decoded settings re-encode");
        assert_eq!(&record[..], data);
    }
});
