use bytes::{Buf, Bytes};

/// Represents a HTTP message that can either be a header or payload.
///
/// The response encoder consumes this: first one `Header`, then any number of
/// `Payload` items ending with [`PayloadItem::Eof`].
#[derive(Debug)]
pub enum Message<T, Data: Buf = Bytes> {
    /// Contains the header information of type `T`
    Header(T),
    /// Contains a chunk of payload data or EOF marker
    Payload(PayloadItem<Data>),
}

/// Represents an item in the HTTP message payload stream.
///
/// Body decoders produce either data chunks or signal the end of the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    /// A chunk of payload data
    Chunk(Data),
    /// Marks the end of the payload stream
    Eof,
}

/// How the extent of a request body is delimited in the byte stream.
///
/// Derived from `content-length` and `transfer-encoding` once the header block
/// has been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Framing {
    /// Body with a declared length in bytes
    Length(u64),
    /// Body using chunked transfer encoding
    Chunked,
    /// A transfer coding this implementation can't decode; reading the body fails
    Unsupported(Bytes),
    /// No body
    Empty,
}

/// Result of one body read: more body may follow, or the body is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    More,
    Done,
}

impl Framing {
    /// Returns true if the body uses chunked transfer encoding
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, Framing::Chunked)
    }

    /// Returns true if the request carries no body
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Framing::Empty)
    }
}

impl ReadStatus {
    #[inline]
    pub fn is_done(&self) -> bool {
        matches!(self, ReadStatus::Done)
    }
}

impl<T> Message<T> {
    /// Returns true for a request or response head
    #[inline]
    pub fn is_header(&self) -> bool {
        matches!(self, Message::Header(_))
    }
}

impl<T> From<Bytes> for Message<T> {
    fn from(bytes: Bytes) -> Self {
        Self::Payload(PayloadItem::Chunk(bytes))
    }
}

impl<D: Buf> PayloadItem<D> {
    /// Returns true if this item represents the end of the payload stream
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    /// Returns true if this item contains chunk data
    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }
}

impl PayloadItem {
    /// Returns a reference to the contained bytes if this is a Chunk
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }
}
