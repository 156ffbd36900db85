//! Incremental CRLF line tokenizer.
//!
//! Input arrives in arbitrary fragments, so the decoder remembers how far it
//! already scanned and only looks at new bytes on the next call. A line is only
//! split off the buffer once its CRLF has arrived; until then the bytes stay in
//! place and `Ok(None)` asks the caller for more input.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{LineKind, ParseError};

/// Splits one CRLF-terminated line off the front of a buffer.
///
/// The returned token excludes the CRLF. Bare LF terminators and CR bytes
/// inside a line are rejected, since peers disagreeing on line ends is a
/// classic source of request smuggling.
#[derive(Debug, Clone)]
pub struct LineDecoder {
    kind: LineKind,
    max_length: usize,
    /// Bytes at the front of the buffer already known to contain no LF
    next_index: usize,
}

impl LineDecoder {
    pub fn new(kind: LineKind, max_length: usize) -> Self {
        Self { kind, max_length, next_index: 0 }
    }

    pub fn kind(&self) -> LineKind {
        self.kind
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Switches the decoder to a different kind of line.
    ///
    /// Only valid between lines: the scan position must be at the start.
    pub fn reset(&mut self, kind: LineKind, max_length: usize) {
        self.kind = kind;
        self.max_length = max_length;
        self.next_index = 0;
    }

    fn malformed(&self, reason: &str) -> ParseError {
        match self.kind {
            LineKind::RequestLine => ParseError::invalid_request_line(reason),
            LineKind::HeaderLine => ParseError::invalid_header(reason),
        }
    }
}

impl Decoder for LineDecoder {
    type Item = Bytes;
    type Error = ParseError;

    /// Attempts to split one line off `src`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(line))`: a complete line, CRLF consumed from `src`
    /// - `Ok(None)`: no LF yet and the pending bytes are within the limit
    /// - `Err(ParseError::LineTooLong)`: the line can no longer fit the limit
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // the LF may sit one byte past the limit, right after the CR
        let scan_end = src.len().min(self.max_length.saturating_add(2));
        let start = self.next_index.min(scan_end);
        let lf_offset = src[start..scan_end].iter().position(|b| *b == b'\n');

        match lf_offset {
            Some(offset) => {
                let lf_index = start + offset;
                self.next_index = 0;

                ensure!(lf_index > 0 && src[lf_index - 1] == b'\r', self.malformed("bare LF line terminator"));

                let line_len = lf_index - 1;
                ensure!(line_len <= self.max_length, ParseError::line_too_long(self.kind, self.max_length));

                let mut line = src.split_to(lf_index + 1);
                line.truncate(line_len);
                ensure!(!line.contains(&b'\r'), self.malformed("bare CR inside line"));

                trace!(kind = %self.kind, len = line_len, "decoded line");
                Ok(Some(line.freeze()))
            }
            None => {
                self.next_index = scan_end;

                // a trailing CR may still be the start of the terminator
                let pending = if src.last() == Some(&b'\r') { src.len() - 1 } else { src.len() };
                ensure!(pending <= self.max_length, ParseError::line_too_long(self.kind, self.max_length));

                Ok(None)
            }
        }
    }
}
