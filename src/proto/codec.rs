//! Sync-byte + length-prefix frame codec for the coprocessor link.
//!
//! Wire format:
//! ```text
//! ┌──────┬────────────┬───────────────────────────┬───────┐
//! │ 0xA5 │ Length (2B)│ postcard payload (N B)    │ CRC-8 │
//! │      │ LE u16     │                           │       │
//! └──────┴────────────┴───────────────────────────┴───────┘
//! ```
//!
//! The CRC covers the length bytes and the payload.  The decoder hunts
//! for the sync byte, so idle filler clocked out by the peer between
//! frames is skipped.  A single `feed` call may hold part of a frame, a
//! whole frame, or filler around one.

/// Maximum frame payload size.
pub const MAX_PAYLOAD: usize = 256;

/// Sync marker opening every frame.
pub const SYNC_BYTE: u8 = 0xA5;

/// Sync + length.
const HEADER_SIZE: usize = 3;
const CRC_SIZE: usize = 1;

/// Largest encoded frame.
pub const MAX_FRAME: usize = HEADER_SIZE + MAX_PAYLOAD + CRC_SIZE;

/// Frame-level decode failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Length field of zero or above [`MAX_PAYLOAD`].
    BadLength,
    /// Checksum mismatch.
    Checksum,
}

/// Decoder state machine.
#[derive(Debug, Clone, Copy)]
enum DecoderState {
    /// Skipping bytes until a sync marker.
    Hunting,
    /// Sync seen, reading the little-endian length.
    ReadingLength { collected: usize },
    /// Length known, reading payload.
    ReadingPayload { expected: usize, collected: usize },
    /// Payload complete, waiting for the CRC byte.
    ReadingCrc { expected: usize },
}

/// Streaming frame decoder.
pub struct FrameDecoder {
    state: DecoderState,
    len_buf: [u8; 2],
    payload_buf: [u8; MAX_PAYLOAD],
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::Hunting,
            len_buf: [0; 2],
            payload_buf: [0; MAX_PAYLOAD],
        }
    }

    /// Feed bytes into the decoder.
    ///
    /// Returns `Some(Ok(payload))` when a complete, checksummed frame is
    /// available and `Some(Err(_))` when a frame was rejected.  Bytes that
    /// follow a completed or rejected frame in the same call are dropped:
    /// the link is half-duplex, so nothing meaningful follows a response.
    pub fn feed(&mut self, data: &[u8]) -> Option<Result<&[u8], FrameError>> {
        let mut outcome: Option<Result<usize, FrameError>> = None;

        for &byte in data {
            match &mut self.state {
                DecoderState::Hunting => {
                    if byte == SYNC_BYTE {
                        self.state = DecoderState::ReadingLength { collected: 0 };
                    }
                }

                DecoderState::ReadingLength { collected } => {
                    self.len_buf[*collected] = byte;
                    *collected += 1;

                    if *collected == self.len_buf.len() {
                        let expected = u16::from_le_bytes(self.len_buf) as usize;
                        if expected == 0 || expected > MAX_PAYLOAD {
                            self.state = DecoderState::Hunting;
                            outcome = Some(Err(FrameError::BadLength));
                            break;
                        }
                        self.state = DecoderState::ReadingPayload {
                            expected,
                            collected: 0,
                        };
                    }
                }

                DecoderState::ReadingPayload { expected, collected } => {
                    self.payload_buf[*collected] = byte;
                    *collected += 1;

                    if *collected == *expected {
                        self.state = DecoderState::ReadingCrc {
                            expected: *expected,
                        };
                    }
                }

                DecoderState::ReadingCrc { expected } => {
                    let len = *expected;
                    self.state = DecoderState::Hunting;

                    let crc = crc8_update(crc8(&self.len_buf), &self.payload_buf[..len]);
                    outcome = Some(if crc == byte {
                        Ok(len)
                    } else {
                        Err(FrameError::Checksum)
                    });
                    break;
                }
            }
        }

        outcome.map(|r| r.map(|len| &self.payload_buf[..len]))
    }

    /// Reset decoder state (e.g. before a resync).
    pub fn reset(&mut self) {
        self.state = DecoderState::Hunting;
    }

    /// True while the decoder is between frames.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, DecoderState::Hunting)
    }
}

/// Encode a payload into a frame.
///
/// Writes `[sync][LE-u16 length][payload][crc]` into `out_buf`.
/// Returns the total number of bytes written.
pub fn encode_frame(payload: &[u8], out_buf: &mut [u8]) -> Option<usize> {
    let total = HEADER_SIZE + payload.len() + CRC_SIZE;
    if payload.is_empty() || payload.len() > MAX_PAYLOAD || total > out_buf.len() {
        return None;
    }

    let len_bytes = (payload.len() as u16).to_le_bytes();
    out_buf[0] = SYNC_BYTE;
    out_buf[1..HEADER_SIZE].copy_from_slice(&len_bytes);
    out_buf[HEADER_SIZE..total - CRC_SIZE].copy_from_slice(payload);
    out_buf[total - CRC_SIZE] = crc8_update(crc8(&len_bytes), payload);

    Some(total)
}

/// CRC-8 (polynomial 0x07, init 0).
pub fn crc8(data: &[u8]) -> u8 {
    crc8_update(0, data)
}

fn crc8_update(mut crc: u8, data: &[u8]) -> u8 {
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ 0x07
            } else {
                crc << 1
            };
        }
    }
    crc
}
