//! Read and write phases of one request/response exchange.
//!
//! Both phases only move forward within an exchange. The connection checks the
//! current phase before every operation and rejects calls made out of order
//! instead of silently corrupting the framing of the stream.

/// Progress of reading the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadPhase {
    /// Nothing of the current request has been consumed yet
    Unread,
    /// Request line and headers are parsed, the body may still be pending
    HeadersRead,
    /// The body has been fully consumed, the buffer starts at the next request
    BodyRead,
}

/// Progress of writing the current response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePhase {
    /// No final response head has been written
    Unsent,
    /// Head written, body bytes are written as-is
    Writing,
    /// Head written, body bytes are written as chunks
    Chunking,
    /// Response is complete
    Sent,
}

impl ReadPhase {
    /// Moves forward to `next`; a request never goes back to an earlier phase.
    pub(crate) fn advance(&mut self, next: ReadPhase) {
        debug_assert!(next >= *self, "read phase regressed from {self:?} to {next:?}");
        if next > *self {
            *self = next;
        }
    }
}

impl WritePhase {
    /// Returns true if body bytes may still be written.
    #[inline]
    pub fn is_writable(&self) -> bool {
        matches!(self, WritePhase::Writing | WritePhase::Chunking)
    }

    /// Returns true once the final response has been completely written.
    #[inline]
    pub fn is_sent(&self) -> bool {
        matches!(self, WritePhase::Sent)
    }
}
