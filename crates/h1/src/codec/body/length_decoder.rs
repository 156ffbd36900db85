//! Decoder implementation for HTTP messages with Content-Length header.
//!
//! This module decodes request bodies whose size is declared by the
//! Content-Length header, as defined in
//! [RFC 9112 Section 6.2](https://www.rfc-editor.org/rfc/rfc9112#section-6.2).

use std::cmp;

use crate::protocol::{ParseError, PayloadItem};
use bytes::BytesMut;
use tracing::trace;

/// A decoder for handling HTTP messages with a known content length.
///
/// The decoder tracks the remaining bytes to be read and never hands out a
/// byte past the declared length; anything after it stays in the buffer for
/// the next request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    /// The number of bytes remaining to be read from the payload
    remaining: u64,
}

impl LengthDecoder {
    /// Creates a new LengthDecoder for a body of `length` bytes.
    pub fn new(length: u64) -> Self {
        Self { remaining: length }
    }

    /// Number of body bytes not yet decoded.
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    /// Decodes at most `limit` bytes of the body from `src`.
    ///
    /// # Returns
    /// * `Ok(Some(PayloadItem::Eof))` when all bytes have been read
    /// * `Ok(Some(PayloadItem::Chunk(bytes)))` with 1 to `limit` bytes
    /// * `Ok(None)` when more data is needed or `limit` is zero
    pub fn decode(&mut self, src: &mut BytesMut, limit: usize) -> Result<Option<PayloadItem>, ParseError> {
        if self.remaining == 0 {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() || limit == 0 {
            return Ok(None);
        }

        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        let len = cmp::min(cmp::min(remaining, src.len()), limit);

        self.remaining = self
            .remaining
            .checked_sub(len as u64)
            .ok_or(ParseError::ExcessBodyBytes { remaining: self.remaining, consumed: len as u64 })?;

        trace!(len, remaining = self.remaining, "read content-length bytes");
        Ok(Some(PayloadItem::Chunk(src.split_to(len).freeze())))
    }
}
