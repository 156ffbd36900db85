//! HTTP request decoder module
//!
//! This module decodes HTTP requests from a growing buffer. It parses the head
//! first and then the body through a state machine.
//!
//! # Components
//!
//! - [`RequestDecoder`]: Main decoder that coordinates header and payload parsing
//! - Header parsing: Uses [`HeaderDecoder`] for parsing request heads
//! - Payload handling: Uses [`PayloadDecoder`] for handling request bodies if any
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use micro_h1::codec::RequestDecoder;
//! use micro_h1::protocol::{Message, PayloadItem};
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = RequestDecoder::default();
//! let mut buffer = BytesMut::from(&b"POST /echo HTTP/1.1\r\nContent-Length: 2\r\n\r\nhi"[..]);
//!
//! let Some(Message::Header((head, _framing))) = decoder.decode(&mut buffer).unwrap() else { panic!() };
//! assert_eq!(head.target(), "/echo");
//!
//! let Some(Message::Payload(PayloadItem::Chunk(body))) = decoder.decode(&mut buffer).unwrap() else { panic!() };
//! assert_eq!(&body[..], b"hi");
//! ```

use crate::codec::body::PayloadDecoder;
use crate::codec::header::HeaderDecoder;
use crate::config::HeaderLimits;
use crate::protocol::{Framing, Message, ParseError, PayloadItem, RequestHead};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// A decoder for HTTP requests that handles both headers and payload
///
/// The decoder operates in two phases:
/// 1. Header parsing: Decodes the request head using [`HeaderDecoder`]
/// 2. Payload parsing: Decodes the request body using [`PayloadDecoder`]
///
/// # State Machine
///
/// The decoder maintains its state through the `payload_decoder` field:
/// - `None`: Currently parsing headers
/// - `Some(PayloadDecoder)`: Currently parsing payload
#[derive(Debug)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    payload_decoder: Option<PayloadDecoder>,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` enforcing `limits` on every request head
    pub fn new(limits: HeaderLimits) -> Self {
        Self { header_decoder: HeaderDecoder::new(limits), payload_decoder: None }
    }

    /// Returns true while a request body is being decoded
    pub fn in_payload(&self) -> bool {
        self.payload_decoder.is_some()
    }

    /// Returns true if a request head has been partially consumed
    pub fn is_partial(&self) -> bool {
        self.header_decoder.is_partial()
    }

    /// Decodes at most `limit` bytes of the current request body.
    ///
    /// Returns `Ok(None)` if no body is being decoded, more input is needed,
    /// or the limit is zero while body data is pending. Framing bytes are
    /// consumed regardless of `limit`.
    pub fn decode_payload(&mut self, src: &mut BytesMut, limit: usize) -> Result<Option<PayloadItem>, ParseError> {
        let Some(payload_decoder) = &mut self.payload_decoder else {
            return Ok(None);
        };

        let item = payload_decoder.decode(src, limit)?;
        if matches!(item, Some(PayloadItem::Eof)) {
            // no need payload decoder in this request now
            self.payload_decoder.take();
        }
        Ok(item)
    }

    /// Forgets the body of the current request, if any.
    pub(crate) fn reset_payload(&mut self) {
        self.payload_decoder.take();
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::new(HeaderLimits::default())
    }
}

impl Decoder for RequestDecoder {
    type Item = Message<(RequestHead, Framing)>;
    type Error = ParseError;

    /// Attempts to decode an HTTP request from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Message::Header(_)))`: Successfully decoded request head
    /// - `Ok(Some(Message::Payload(_)))`: Successfully decoded a payload chunk
    /// - `Ok(None)`: Need more data to proceed
    /// - `Err(_)`: Encountered a parsing error
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // parse payload if have payload_decoder
        if self.payload_decoder.is_some() {
            return Ok(self.decode_payload(src, usize::MAX)?.map(Message::Payload));
        }

        // parse request
        let message = match self.header_decoder.decode(src)? {
            Some((head, framing)) => {
                let max_line_length = self.header_decoder.limits().max_header_length;
                self.payload_decoder = Some(PayloadDecoder::from_framing(&framing, max_line_length));
                Some(Message::Header((head, framing)))
            }
            None => None,
        };

        Ok(message)
    }
}
