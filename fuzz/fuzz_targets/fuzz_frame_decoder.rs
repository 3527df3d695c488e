//! Fuzz target: `FrameDecoder::feed` + response decoding
//!
//! Drives arbitrary bytes, split at an arbitrary point, into the streaming
//! frame decoder and decodes any accepted payload as a `Response`, the
//! same path `SpiLink` takes with bytes clocked in from the coprocessor.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use ahrscomms::proto::codec::{FrameDecoder, MAX_PAYLOAD};
use ahrscomms::proto::Response;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let split = usize::from(split).min(rest.len());
    let (head, tail) = rest.split_at(split);

    let mut decoder = FrameDecoder::new();
    for chunk in [head, tail] {
        match decoder.feed(chunk) {
            Some(Ok(payload)) => {
                assert!(!payload.is_empty() && payload.len() <= MAX_PAYLOAD);
                let _ = postcard::from_bytes::<Response>(payload);
                break;
            }
            Some(Err(_)) => break,
            None => {}
        }
    }

    // After a reset the decoder must accept bytes cleanly again.
    decoder.reset();
    assert!(decoder.is_idle());
    let _ = decoder.feed(data);
});
