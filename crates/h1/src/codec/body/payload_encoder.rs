use crate::codec::body::chunked_encoder::ChunkedEncoder;
use crate::codec::body::raw_encoder::RawEncoder;
use crate::protocol::{Disposition, PayloadItem, SendError};
use bytes::{Buf, BytesMut};

use tokio_util::codec::Encoder;

/// Frames response body items according to the head they follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEncoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// body written as-is
    Raw(RawEncoder),

    /// transfer-encoding chunked payload
    Chunked(ChunkedEncoder),

    /// have no body with the response
    NoBody,
}

impl PayloadEncoder {
    /// Encoder for a response without body; body items are dropped
    pub fn empty() -> Self {
        Self { kind: Kind::NoBody }
    }

    /// create a chunked `PayloadEncoder`
    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedEncoder::new()) }
    }

    /// create a raw `PayloadEncoder`
    pub fn raw() -> Self {
        Self { kind: Kind::Raw(RawEncoder::new()) }
    }

    /// The body encoder that follows a head sent with `disposition`.
    ///
    /// Interim heads are followed by another head, so they get no body encoder.
    pub fn from_disposition(disposition: Disposition) -> Option<Self> {
        match disposition {
            Disposition::Raw => Some(Self::raw()),
            Disposition::ChunkEncoded => Some(Self::chunked()),
            Disposition::NoBody => Some(Self::empty()),
            Disposition::Informational => None,
        }
    }

    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }

    pub fn is_finish(&self) -> bool {
        match &self.kind {
            Kind::Raw(encoder) => encoder.is_finish(),
            Kind::Chunked(encoder) => encoder.is_finish(),
            Kind::NoBody => true,
        }
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for PayloadEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match &mut self.kind {
            Kind::Raw(encoder) => encoder.encode(item, dst),
            Kind::Chunked(encoder) => encoder.encode(item, dst),
            Kind::NoBody => Ok(()),
        }
    }
}
