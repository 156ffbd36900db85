//! HTTP response encoder module
//!
//! Encodes a response head followed by its body. The [`Disposition`] given
//! with the head selects how the body items that follow are framed.

use crate::codec::body::PayloadEncoder;
use crate::codec::header::HeaderEncoder;
use crate::protocol::{Disposition, Message, ResponseHead, SendError};
use bytes::{Buf, BytesMut};
use std::io;
use std::io::ErrorKind;
use tokio_util::codec::Encoder;
use tracing::error;

/// Encoder for one response at a time.
///
/// - `Message::Header` writes the status line and headers. Interim (1xx)
///   heads leave the encoder ready for the next head.
/// - `Message::Payload` writes body data framed for the last head; `Eof`
///   completes the response.
#[derive(Debug)]
pub struct ResponseEncoder {
    header_encoder: HeaderEncoder,
    payload_encoder: Option<PayloadEncoder>,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns true while body items for the current response are expected.
    pub fn in_payload(&self) -> bool {
        self.payload_encoder.is_some()
    }

    /// Drops any unfinished response body state.
    pub(crate) fn reset(&mut self) {
        self.payload_encoder.take();
    }
}

impl Default for ResponseEncoder {
    fn default() -> Self {
        Self { header_encoder: HeaderEncoder, payload_encoder: None }
    }
}

impl<D: Buf> Encoder<Message<(ResponseHead, Disposition), D>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Message<(ResponseHead, Disposition), D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Message::Header((head, disposition)) => {
                if self.payload_encoder.is_some() {
                    error!("expect payload item but receive response head");
                    return Err(io::Error::from(ErrorKind::InvalidInput).into());
                }

                self.header_encoder.encode((head, disposition), dst)?;
                self.payload_encoder = PayloadEncoder::from_disposition(disposition).filter(|encoder| !encoder.is_finish());
                Ok(())
            }

            Message::Payload(payload_item) => {
                let payload_encoder = if let Some(encoder) = &mut self.payload_encoder {
                    encoder
                } else {
                    error!("expect response header but receive payload item");
                    return Err(io::Error::from(ErrorKind::InvalidInput).into());
                };

                let result = payload_encoder.encode(payload_item, dst);

                let is_eof = payload_encoder.is_finish();
                if is_eof {
                    self.payload_encoder.take();
                }

                result
            }
        }
    }
}
