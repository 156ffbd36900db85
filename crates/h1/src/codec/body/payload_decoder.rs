//! Decoder implementation for HTTP request bodies.
//!
//! This module provides a unified decoder for the framings a request body can have:
//! - Content-Length based payloads
//! - Chunked transfer encoding
//! - Messages with no body
//! - A transfer coding that can't be decoded, which fails on the first read
//!
//! The framing is chosen from the request headers, see [`Framing`].

use crate::codec::body::chunked_decoder::ChunkedDecoder;
use crate::codec::body::length_decoder::LengthDecoder;
use crate::protocol::{Framing, ParseError, PayloadItem};
use bytes::{Bytes, BytesMut};

/// A unified decoder for handling HTTP request payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    /// The specific decoding strategy to use
    kind: Kind,
}

/// Enum representing different payload decoding strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// Decode payload with a fixed content length
    Length(LengthDecoder),
    /// Decode payload using chunked transfer encoding
    Chunked(ChunkedDecoder),
    /// Handle messages with no body
    NoBody,
    /// Transfer coding that is not supported
    Unsupported(Bytes),
}

impl PayloadDecoder {
    /// Creates a PayloadDecoder for messages with no body.
    pub fn empty() -> Self {
        Self { kind: Kind::NoBody }
    }

    /// Creates a PayloadDecoder for chunked transfer encoding.
    ///
    /// `max_line_length` bounds chunk-size and trailer lines.
    pub fn chunked(max_line_length: usize) -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new(max_line_length)) }
    }

    /// Creates a PayloadDecoder for a fixed-length payload.
    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size)) }
    }

    /// Creates a PayloadDecoder for `framing`.
    pub fn from_framing(framing: &Framing, max_line_length: usize) -> Self {
        match framing {
            Framing::Length(size) => Self::fix_length(*size),
            Framing::Chunked => Self::chunked(max_line_length),
            Framing::Empty => Self::empty(),
            Framing::Unsupported(coding) => Self { kind: Kind::Unsupported(coding.clone()) },
        }
    }

    /// Returns whether this decoder handles chunked transfer encoding.
    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }

    /// Returns whether this decoder handles messages with no body.
    pub fn is_empty(&self) -> bool {
        matches!(self.kind, Kind::NoBody)
    }

    /// Returns whether the whole body has been decoded.
    pub fn is_finished(&self) -> bool {
        match &self.kind {
            Kind::Length(decoder) => decoder.is_finished(),
            Kind::Chunked(decoder) => decoder.is_finished(),
            Kind::NoBody => true,
            Kind::Unsupported(_) => false,
        }
    }

    /// Decodes at most `limit` body bytes from `src`, delegating to the
    /// decoder for the framing.
    ///
    /// No-body messages return EOF immediately.
    pub fn decode(&mut self, src: &mut BytesMut, limit: usize) -> Result<Option<PayloadItem>, ParseError> {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.decode(src, limit),
            Kind::Chunked(chunked_decoder) => chunked_decoder.decode(src, limit),
            Kind::NoBody => Ok(Some(PayloadItem::Eof)),
            Kind::Unsupported(coding) => Err(ParseError::unsupported_transfer_encoding(coding)),
        }
    }
}
