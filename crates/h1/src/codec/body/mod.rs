//! HTTP body handling: request body decoding and response body encoding.
//!
//! # Components
//!
//! ## Decoders
//! - [`ChunkedDecoder`]: chunked transfer encoded request bodies
//! - [`LengthDecoder`]: `content-length` delimited request bodies
//! - [`PayloadDecoder`]: picks one of the above from the request framing
//!
//! Decoders take a `limit` on the data bytes they return per call, so the
//! connection can serve reads of a caller-chosen size straight from its buffer.
//!
//! ## Encoders
//! - [`ChunkedEncoder`]: chunked transfer encoding
//! - [`RawEncoder`]: body bytes as-is
//! - [`PayloadEncoder`]: picks one of the above from the response disposition

mod chunked_decoder;
mod chunked_encoder;
mod length_decoder;
mod payload_decoder;
mod payload_encoder;
mod raw_encoder;

pub use chunked_decoder::ChunkedDecoder;
pub use chunked_encoder::ChunkedEncoder;
pub use length_decoder::LengthDecoder;
pub use payload_decoder::PayloadDecoder;
pub use payload_encoder::PayloadEncoder;
pub use raw_encoder::RawEncoder;
