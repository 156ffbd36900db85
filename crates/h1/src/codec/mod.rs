//! HTTP/1.x codec module for decoding requests and encoding responses
//!
//! Everything here works on a `BytesMut` and never touches a socket; the
//! [`connection`](crate::connection) module moves bytes between the codecs and
//! the transport.
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestDecoder`]: Decodes incoming HTTP requests
//!   - Head parsing via the [`header`] module
//!   - Body decoding via the [`body`] module
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: Encodes outgoing HTTP responses
//!   - Head encoding via the [`header`] module
//!   - Body encoding via the [`body`] module
//!
//! # Example
//!
//! ```
//! use bytes::{Bytes, BytesMut};
//! use http::{Response, StatusCode};
//! use micro_h1::codec::ResponseEncoder;
//! use micro_h1::protocol::{Disposition, Message, PayloadItem, ResponseHead};
//! use tokio_util::codec::Encoder;
//!
//! let mut encoder = ResponseEncoder::new();
//! let mut buffer = BytesMut::new();
//!
//! type Item = Message<(ResponseHead, Disposition), Bytes>;
//!
//! let head = Response::builder().status(StatusCode::OK).body(()).unwrap();
//! encoder.encode(Item::Header((head, Disposition::ChunkEncoded)), &mut buffer).unwrap();
//! encoder.encode(Item::Payload(PayloadItem::Chunk(Bytes::from_static(b"hi"))), &mut buffer).unwrap();
//! encoder.encode(Item::Payload(PayloadItem::Eof), &mut buffer).unwrap();
//!
//! assert!(buffer.ends_with(b"2\r\nhi\r\n0\r\n\r\n"));
//! ```

pub mod body;
pub mod header;
mod request_decoder;
mod response_encoder;

pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
