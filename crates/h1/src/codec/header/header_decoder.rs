//! HTTP request head decoder.
//!
//! Reads the request line and then header lines until the empty line that
//! ends the head, one CRLF-terminated line at a time through [`LineDecoder`].
//! Progress survives between calls, so the decoder can be fed a buffer that
//! grows in arbitrary fragments.
//!
//! # Limits
//!
//! - request line: `max_request_line_length` bytes, else `414`
//! - each header line: `max_header_length` bytes, else `431`
//! - header count: `max_header_count` fields, else `431`
//!
//! # Framing
//!
//! Once the head is complete the body framing is derived from
//! `content-length` and `transfer-encoding` (RFC 9112 section 6.3). Any
//! ambiguity is rejected rather than guessed at.

use bytes::{Bytes, BytesMut};
use http::HeaderValue;
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::header::field_line::parse_field_line;
use crate::codec::header::line_decoder::LineDecoder;
use crate::codec::header::request_line::{RequestLine, parse_request_line};
use crate::config::HeaderLimits;
use crate::ensure;
use crate::protocol::{Framing, HeaderList, LineKind, ParseError, RequestHead};

/// Decoder for HTTP request heads implementing the [`Decoder`] trait.
///
/// Produces the parsed [`RequestHead`] together with the [`Framing`] of the
/// body that follows it.
#[derive(Debug)]
pub struct HeaderDecoder {
    limits: HeaderLimits,
    line_decoder: LineDecoder,
    state: State,
}

#[derive(Debug)]
enum State {
    RequestLine,
    Fields { request_line: RequestLine, headers: HeaderList },
}

impl HeaderDecoder {
    pub fn new(limits: HeaderLimits) -> Self {
        Self {
            limits,
            line_decoder: LineDecoder::new(LineKind::RequestLine, limits.max_request_line_length),
            state: State::RequestLine,
        }
    }

    pub fn limits(&self) -> &HeaderLimits {
        &self.limits
    }

    /// Returns true if part of a request head has already been consumed.
    pub fn is_partial(&self) -> bool {
        matches!(self.state, State::Fields { .. })
    }
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self::new(HeaderLimits::default())
    }
}

impl Decoder for HeaderDecoder {
    type Item = (RequestHead, Framing);
    type Error = ParseError;

    /// Attempts to decode a request head from the provided buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((head, framing)))` once the empty line ending the head arrived
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if parsing failed or a limit was exceeded
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(line) = self.line_decoder.decode(src)? else {
                return Ok(None);
            };

            match std::mem::replace(&mut self.state, State::RequestLine) {
                State::RequestLine => {
                    // RFC 9112 section 2.2: ignore empty lines before the request line
                    if line.is_empty() {
                        trace!("skip empty line before request line");
                        continue;
                    }

                    let request_line = parse_request_line(line)?;
                    trace!(method = %request_line.method, target = %request_line.target, "parsed request line");

                    self.line_decoder.reset(LineKind::HeaderLine, self.limits.max_header_length);
                    self.state = State::Fields { request_line, headers: HeaderList::new() };
                }

                State::Fields { request_line, mut headers } if !line.is_empty() => {
                    ensure!(headers.len() < self.limits.max_header_count, ParseError::too_many_headers(self.limits.max_header_count));
                    let (name, value) = parse_field_line(line)?;
                    headers.push(name, value);
                    self.state = State::Fields { request_line, headers };
                }

                State::Fields { request_line, headers } => {
                    self.line_decoder.reset(LineKind::RequestLine, self.limits.max_request_line_length);

                    trace!(header_count = headers.len(), "parsed request head");
                    let framing = parse_framing(&headers)?;
                    let RequestLine { method, target, form, version } = request_line;
                    let head = RequestHead::new(method, target, form, version, headers);

                    return Ok(Some((head, framing)));
                }
            }
        }
    }
}

/// Determines the body framing from the parsed header fields.
///
/// Follows RFC 9112 section 6.3:
/// - `transfer-encoding` together with `content-length` is a smuggling vector
///   and is rejected
/// - `transfer-encoding` must be exactly `chunked`; other codings are kept as
///   [`Framing::Unsupported`] and fail once the body is read
/// - repeated `content-length` values must all agree
/// - no framing header means no body
pub(crate) fn parse_framing(headers: &HeaderList) -> Result<Framing, ParseError> {
    let te_values: Vec<&HeaderValue> = headers.get_all(TRANSFER_ENCODING).collect();
    let has_content_length = headers.contains_key(CONTENT_LENGTH);

    match (te_values.is_empty(), has_content_length) {
        (true, false) => Ok(Framing::Empty),

        (false, true) => Err(ParseError::ConflictingFraming),

        (false, false) => {
            if let [value] = te_values[..] {
                if is_chunked(value) {
                    return Ok(Framing::Chunked);
                }
            }
            let codings: Vec<&[u8]> = te_values.iter().map(|value| value.as_bytes()).collect();
            Ok(Framing::Unsupported(Bytes::from(codings.join(&b", "[..]))))
        }

        (true, true) => parse_content_length(headers).map(Framing::Length),
    }
}

fn parse_content_length(headers: &HeaderList) -> Result<u64, ParseError> {
    let mut length: Option<u64> = None;

    for value in headers.get_all(CONTENT_LENGTH) {
        for part in value.as_bytes().split(|b| *b == b',') {
            let part = part.trim_ascii();
            ensure!(
                !part.is_empty() && part.iter().all(u8::is_ascii_digit),
                ParseError::invalid_content_length(format!("value {} is not a non-negative integer", String::from_utf8_lossy(part)))
            );

            let parsed = std::str::from_utf8(part)
                .ok()
                .and_then(|digits| digits.parse::<u64>().ok())
                .ok_or_else(|| ParseError::invalid_content_length("value overflows u64"))?;

            match length {
                Some(previous) if previous != parsed => {
                    return Err(ParseError::invalid_content_length(format!("conflicting values {previous} and {parsed}")));
                }
                _ => length = Some(parsed),
            }
        }
    }

    length.ok_or_else(|| ParseError::invalid_content_length("missing value"))
}

/// Checks if the Transfer-Encoding header is exactly the chunked coding.
fn is_chunked(value: &HeaderValue) -> bool {
    value.as_bytes().trim_ascii().eq_ignore_ascii_case(b"chunked")
}
