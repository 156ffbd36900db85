use std::fmt;
use std::io;

use http::StatusCode;
use thiserror::Error;

use crate::protocol::{ReadPhase, WritePhase};

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

impl HttpError {
    /// The status to report to the peer for this error.
    ///
    /// Response-side failures happen after the head may already be on the wire,
    /// so they map to `500` and are only useful for logging.
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::RequestError { source } => source.status(),
            HttpError::ResponseError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Which kind of line the tokenizer was reading when a limit was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    RequestLine,
    HeaderLine,
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineKind::RequestLine => f.write_str("request line"),
            LineKind::HeaderLine => f.write_str("header line"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{kind} exceeds the limit of {max_len} bytes")]
    LineTooLong { kind: LineKind, max_len: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("invalid request line: {reason}")]
    InvalidRequestLine { reason: String },

    #[error("invalid http method")]
    InvalidMethod,

    #[error("invalid request target: {reason}")]
    InvalidTarget { reason: String },

    #[error("unsupported request target: {reason}")]
    UnsupportedTarget { reason: String },

    #[error("invalid http version: {version}")]
    InvalidVersion { version: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("content-length and transfer-encoding both present in headers")]
    ConflictingFraming,

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("unsupported transfer-encoding: {coding}")]
    UnsupportedTransferEncoding { coding: String },

    #[error("body read {consumed} bytes but only {remaining} remained")]
    ExcessBodyBytes { remaining: u64, consumed: u64 },

    #[error("malformed chunk: {reason}")]
    MalformedChunk { reason: String },

    #[error("connection closed before the request body was complete")]
    IncompleteBody,

    #[error("timed out waiting for request data")]
    Timeout,

    #[error("can't {operation} while the request is {phase:?}")]
    InvalidPhase { operation: &'static str, phase: ReadPhase },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn line_too_long(kind: LineKind, max_len: usize) -> Self {
        Self::LineTooLong { kind, max_len }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_request_line<S: ToString>(str: S) -> Self {
        Self::InvalidRequestLine { reason: str.to_string() }
    }

    pub fn invalid_target<S: ToString>(str: S) -> Self {
        Self::InvalidTarget { reason: str.to_string() }
    }

    pub fn unsupported_target<S: ToString>(str: S) -> Self {
        Self::UnsupportedTarget { reason: str.to_string() }
    }

    pub fn invalid_version(version: &[u8]) -> Self {
        Self::InvalidVersion { version: String::from_utf8_lossy(version).into_owned() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn unsupported_transfer_encoding(coding: &[u8]) -> Self {
        Self::UnsupportedTransferEncoding { coding: String::from_utf8_lossy(coding).into_owned() }
    }

    pub fn malformed_chunk<S: ToString>(str: S) -> Self {
        Self::MalformedChunk { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// The HTTP status a server should answer with before closing.
    pub fn status(&self) -> StatusCode {
        match self {
            ParseError::LineTooLong { kind: LineKind::RequestLine, .. } => StatusCode::URI_TOO_LONG,
            ParseError::LineTooLong { kind: LineKind::HeaderLine, .. } | ParseError::TooManyHeaders { .. } => {
                StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE
            }
            ParseError::UnsupportedTransferEncoding { .. } => StatusCode::NOT_IMPLEMENTED,
            ParseError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ParseError::InvalidPhase { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("can't {operation} while the response is {phase:?}")]
    InvalidPhase { operation: &'static str, phase: WritePhase },

    #[error("status {status} doesn't match the response disposition")]
    InvalidStatus { status: StatusCode },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_phase(operation: &'static str, phase: WritePhase) -> Self {
        Self::InvalidPhase { operation, phase }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_of_line_too_long_depends_on_line_kind() {
        let request_line = ParseError::line_too_long(LineKind::RequestLine, 10);
        let header_line = ParseError::line_too_long(LineKind::HeaderLine, 10);

        assert_eq!(request_line.status(), StatusCode::URI_TOO_LONG);
        assert_eq!(header_line.status(), StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE);
        assert_eq!(header_line.to_string(), "header line exceeds the limit of 10 bytes");
    }

    #[test]
    fn status_of_framing_errors() {
        assert_eq!(ParseError::ConflictingFraming.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ParseError::too_many_headers(50).status(), StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE);
        assert_eq!(ParseError::unsupported_transfer_encoding(b"gzip").status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(ParseError::Timeout.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(ParseError::malformed_chunk("bad size").status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn http_error_status() {
        let err: HttpError = ParseError::invalid_version(b"HTTP/2.0").into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "request error: invalid http version: HTTP/2.0");

        let err: HttpError = SendError::invalid_body("boom").into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
