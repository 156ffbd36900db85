//! Decoder implementation for HTTP chunked transfer encoding.
//!
//! This module decodes request bodies framed as specified in
//! [RFC 9112 Section 7.1](https://www.rfc-editor.org/rfc/rfc9112#section-7.1):
//!
//! ```text
//! chunked-body   = *chunk last-chunk trailer-section CRLF
//! chunk          = chunk-size [ chunk-ext ] CRLF chunk-data CRLF
//! last-chunk     = 1*("0") [ chunk-ext ] CRLF
//! ```
//!
//! Chunk extensions and trailer fields are consumed and discarded. The size
//! line, its extensions and every trailer line are bounded by the same limit as
//! a header line, so a peer can't make the decoder scan unbounded framing bytes.

use crate::protocol::{ParseError, PayloadItem};
use bytes::{Buf, BytesMut};
use std::cmp;
use tracing::trace;
use ChunkedState::*;

/// A decoder for handling HTTP chunked transfer encoding.
///
/// The decoder processes incoming bytes according to the chunked format:
/// - Each chunk starts with its size in hexadecimal
/// - Followed by optional extensions and CRLF
/// - Then the chunk data and CRLF
/// - A zero-sized chunk, optional trailers and an empty line end the body
///
/// Data is handed out as soon as it is buffered, so one chunk on the wire may
/// be returned in several pieces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    remaining_size: u64,
    line_length: usize,
    max_line_length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Read the chunk size in hex
    Size,
    /// Handle whitespace after size
    SizeLws,
    /// Skip chunk extensions
    Extension,
    /// Read LF after chunk size
    SizeLf,
    /// Read chunk data
    Body,
    /// Read CR after chunk data
    BodyCr,
    /// Read LF after chunk data
    BodyLf,
    /// Read a trailer field line
    Trailer,
    /// Read LF after trailer
    TrailerLf,
    /// Read final CR, or the first byte of a trailer line
    EndCr,
    /// Read final LF
    EndLf,
    /// Final state after reading last chunk
    End,
}

impl ChunkedDecoder {
    /// Creates a new ChunkedDecoder whose framing lines may be at most
    /// `max_line_length` bytes long, CRLF excluded.
    pub fn new(max_line_length: usize) -> Self {
        Self { state: Size, remaining_size: 0, line_length: 0, max_line_length }
    }

    /// Returns true once the terminating empty line has been consumed.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state == End
    }

    /// Decodes at most `limit` data bytes from `src`.
    ///
    /// Framing bytes are consumed even when `limit` is zero, so a caller that
    /// has already collected enough data can still learn whether the body is
    /// complete.
    ///
    /// # Returns
    /// - `Ok(Some(PayloadItem::Chunk(bytes)))` with 1 to `limit` bytes of chunk data
    /// - `Ok(Some(PayloadItem::Eof))` once the last chunk and trailers are read
    /// - `Ok(None)` when more input is needed, or `limit` is zero inside chunk data
    /// - `Err(ParseError::MalformedChunk)` if the chunked encoding is invalid
    pub fn decode(&mut self, src: &mut BytesMut, limit: usize) -> Result<Option<PayloadItem>, ParseError> {
        loop {
            if self.state == End {
                trace!("finished reading chunked data");
                return Ok(Some(PayloadItem::Eof));
            }

            if src.is_empty() {
                return Ok(None);
            }

            if self.state == Body {
                if limit == 0 {
                    return Ok(None);
                }
                return Ok(Some(self.read_body(src, limit)));
            }

            let byte = src.get_u8();
            self.state = self.step(byte)?;
        }
    }

    fn step(&mut self, byte: u8) -> Result<ChunkedState, ParseError> {
        if matches!(self.state, Size | SizeLws | Extension | Trailer) {
            self.line_length += 1;
            if self.line_length > self.max_line_length {
                return Err(ParseError::malformed_chunk(format!("line exceeds the limit of {} bytes", self.max_line_length)));
            }
        }

        match self.state {
            Size => self.read_size(byte),
            SizeLws => read_size_lws(byte),
            Extension => read_extension(byte),
            SizeLf => self.read_size_lf(byte),
            BodyCr => expect(byte, b'\r', BodyLf, "missing CR after chunk data"),
            BodyLf => expect(byte, b'\n', Size, "missing LF after chunk data"),
            Trailer => read_trailer(byte),
            TrailerLf => self.read_trailer_lf(byte),
            EndCr => self.read_end_cr(byte),
            EndLf => expect(byte, b'\n', End, "missing LF after last chunk"),
            Body | End => Ok(self.state),
        }
    }

    /// Reads one byte of the hexadecimal chunk size.
    ///
    /// At least one hex digit is required before whitespace, an extension or
    /// CR ends the size.
    fn read_size(&mut self, byte: u8) -> Result<ChunkedState, ParseError> {
        macro_rules! or_overflow {
            ($e:expr) => {
                match $e {
                    Some(val) => val,
                    None => return Err(ParseError::malformed_chunk("chunk size overflows")),
                }
            };
        }

        let digit = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte + 10 - b'a',
            b'A'..=b'F' => byte + 10 - b'A',
            _ if self.line_length == 1 => return Err(ParseError::malformed_chunk("missing chunk size")),
            b'\t' | b' ' => return Ok(SizeLws),
            b';' => return Ok(Extension),
            b'\r' => return Ok(SizeLf),
            _ => return Err(ParseError::malformed_chunk("invalid chunk size")),
        };

        self.remaining_size = or_overflow!(self.remaining_size.checked_mul(16));
        self.remaining_size = or_overflow!(self.remaining_size.checked_add(u64::from(digit)));
        Ok(Size)
    }

    fn read_size_lf(&mut self, byte: u8) -> Result<ChunkedState, ParseError> {
        if byte != b'\n' {
            return Err(ParseError::malformed_chunk("missing LF after chunk size"));
        }

        self.line_length = 0;
        if self.remaining_size == 0 {
            trace!("read last chunk");
            Ok(EndCr)
        } else {
            trace!(size = self.remaining_size, "read chunk size");
            Ok(Body)
        }
    }

    fn read_body(&mut self, src: &mut BytesMut, limit: usize) -> PayloadItem {
        // cap remaining bytes at the max capacity of usize
        let remaining = usize::try_from(self.remaining_size).unwrap_or(usize::MAX);
        let read_size = cmp::min(cmp::min(remaining, src.len()), limit);

        self.remaining_size -= read_size as u64;
        if self.remaining_size == 0 {
            self.state = BodyCr;
        }

        trace!(len = read_size, "read chunked bytes");
        PayloadItem::Chunk(src.split_to(read_size).freeze())
    }

    fn read_trailer_lf(&mut self, byte: u8) -> Result<ChunkedState, ParseError> {
        self.line_length = 0;
        expect(byte, b'\n', EndCr, "missing LF after trailer field")
    }

    fn read_end_cr(&mut self, byte: u8) -> Result<ChunkedState, ParseError> {
        match byte {
            b'\r' => Ok(EndLf),
            b'\n' => Err(ParseError::malformed_chunk("bare LF in trailer section")),
            _ => {
                // first byte of a trailer field line
                self.line_length = 1;
                Ok(Trailer)
            }
        }
    }
}

/// LWS can follow the chunk size, but no more digits can come
fn read_size_lws(byte: u8) -> Result<ChunkedState, ParseError> {
    match byte {
        b'\t' | b' ' => Ok(SizeLws),
        b';' => Ok(Extension),
        b'\r' => Ok(SizeLf),
        _ => Err(ParseError::malformed_chunk("invalid chunk size linear white space")),
    }
}

/// Extensions are ignored; they end at the next CR. A plain LF inside an
/// extension is rejected.
fn read_extension(byte: u8) -> Result<ChunkedState, ParseError> {
    match byte {
        b'\r' => Ok(SizeLf),
        b'\n' => Err(ParseError::malformed_chunk("chunk extension contains newline")),
        _ => Ok(Extension),
    }
}

fn read_trailer(byte: u8) -> Result<ChunkedState, ParseError> {
    match byte {
        b'\r' => Ok(TrailerLf),
        b'\n' => Err(ParseError::malformed_chunk("bare LF in trailer field")),
        _ => Ok(Trailer),
    }
}

#[inline]
fn expect(byte: u8, expected: u8, next: ChunkedState, reason: &'static str) -> Result<ChunkedState, ParseError> {
    if byte == expected { Ok(next) } else { Err(ParseError::malformed_chunk(reason)) }
}
