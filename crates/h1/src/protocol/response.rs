//! HTTP response head handling.
//!
//! The response head is an `http::Response<()>`: status, version and header
//! map, with the body supplied afterwards through the connection.

use http::Response;

/// Type alias for HTTP response headers.
pub type ResponseHead = Response<()>;

/// How the body following a response head is framed on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Body bytes are written as-is; the application delimits them
    /// (usually with `content-length`)
    Raw,
    /// Body bytes are written with chunked transfer encoding
    ChunkEncoded,
    /// The response has no body; the head completes it
    NoBody,
    /// An interim 1xx head; a final response head must follow
    Informational,
}

impl Disposition {
    /// Returns true if the head is followed by body data
    #[inline]
    pub fn has_body(&self) -> bool {
        matches!(self, Disposition::Raw | Disposition::ChunkEncoded)
    }
}
