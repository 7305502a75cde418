//! Fuzz target: `decode` + `dispatch`
//!
//! Drives arbitrary byte sequences through the frame truncation, the
//! command decoder and the dispatcher, and asserts that nothing panics
//! and that the reply bounds always hold.
//!
//! cargo fuzz run fuzz_command_decoder

#![no_main]

use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;
use lapsecam::config::{MAX_FRAME_LEN, MAX_REPLY_LEN, MIN_PICTURE_INTERVAL_S, Settings};
use lapsecam::protocol::{Counters, decode, dispatch, frame_from_bytes};

fuzz_target!(|data: &[u8]| {
    let frame = frame_from_bytes(data);
    assert!(frame.len() <= MAX_FRAME_LEN);

    let Some(now) = NaiveDate::from_ymd_opt(2022, 1, 24).and_then(|d| d.and_hms_opt(12, 0, 0))
    else {
        return;
    };

    let cmd = decode(&frame);
    let out = dispatch(&cmd, &Settings::default(), now, &Counters::default());

    assert!(!out.replies.is_empty(), "every command is answered");
    for reply in &out.replies {
        assert!(reply.len() <= MAX_REPLY_LEN);
    }
    if let Some(next) = out.settings {
        assert!(next.picture_interval_s >= MIN_PICTURE_INTERVAL_S);
    }
});
