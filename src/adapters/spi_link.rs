//! SPI link to the coprocessor.
//!
//! Implements [`AhrsLink`] over any `embedded_hal::spi::SpiDevice`.  The
//! flight controller is bus master: it clocks one request frame out, then
//! keeps clocking filler bytes in until the coprocessor's response frame
//! decodes or the poll budget runs out.
//!
//! ```text
//!  write  [A5 len len payload.. crc]
//!  read   [00 00 00 ...]            ◀── peer still working
//!  read   [00 A5 len len payload..] ◀── response starts mid-chunk
//!  read   [.. crc 00 00]            ◀── frame complete
//! ```

use embedded_hal::spi::{Error as _, SpiDevice};
use log::debug;

use crate::app::ports::AhrsLink;
use crate::config::CommsConfig;
use crate::error::LinkError;
use crate::proto::codec::{self, FrameDecoder, MAX_FRAME, MAX_PAYLOAD};
use crate::proto::{Request, Response};

/// Bytes clocked in per poll.
pub const POLL_CHUNK: usize = 16;

pub struct SpiLink<S> {
    spi: S,
    decoder: FrameDecoder,
    max_polls: u16,
    payload_buf: [u8; MAX_PAYLOAD],
    tx_buf: [u8; MAX_FRAME],
    rx_buf: [u8; POLL_CHUNK],
}

impl<S: SpiDevice> SpiLink<S> {
    pub fn new(spi: S, config: &CommsConfig) -> Self {
        Self {
            spi,
            decoder: FrameDecoder::new(),
            max_polls: config.max_response_polls,
            payload_buf: [0; MAX_PAYLOAD],
            tx_buf: [0; MAX_FRAME],
            rx_buf: [0; POLL_CHUNK],
        }
    }

    /// Give the bus back (used by tests to inspect the simulated peer).
    pub fn release(self) -> S {
        self.spi
    }

    fn send(&mut self, request: &Request) -> Result<(), LinkError> {
        let payload = postcard::to_slice(request, &mut self.payload_buf)
            .map_err(|_| LinkError::Encode)?;
        let len = codec::encode_frame(payload, &mut self.tx_buf).ok_or(LinkError::Encode)?;

        self.spi.write(&self.tx_buf[..len]).map_err(|e| {
            debug!("SPI write failed: {:?}", e.kind());
            LinkError::Transfer
        })
    }

    fn receive(&mut self) -> Result<Response, LinkError> {
        for _ in 0..self.max_polls {
            self.rx_buf.fill(0);
            self.spi.read(&mut self.rx_buf).map_err(|e| {
                debug!("SPI read failed: {:?}", e.kind());
                LinkError::Transfer
            })?;

            match self.decoder.feed(&self.rx_buf) {
                None => {}
                Some(Ok(payload)) => {
                    return postcard::from_bytes(payload).map_err(|_| LinkError::Decode);
                }
                Some(Err(e)) => {
                    debug!("Dropped response frame: {:?}", e);
                    return Err(LinkError::Framing);
                }
            }
        }
        Err(LinkError::Timeout)
    }
}

impl<S: SpiDevice> AhrsLink for SpiLink<S> {
    fn resync(&mut self) -> Result<(), LinkError> {
        self.decoder.reset();
        match self.exchange(&Request::ResyncProbe)? {
            Response::ResyncProbe => Ok(()),
            _ => Err(LinkError::ResyncFailed),
        }
    }

    fn exchange(&mut self, request: &Request) -> Result<Response, LinkError> {
        self.send(request)?;
        let result = self.receive();
        if result.is_err() {
            // Never carry a half-read frame into the next exchange.
            self.decoder.reset();
        }
        result
    }
}
