//! HTTP head processing: decoding request heads and encoding response heads.
//!
//! # Components
//!
//! - [`LineDecoder`]: incremental CRLF tokenizer with a length limit
//! - request-line and field-line grammar (`request_line`, `field_line`)
//! - [`HeaderDecoder`]: request line plus header block, then body framing
//! - [`HeaderEncoder`]: response status line and header fields

mod field_line;
mod header_decoder;
mod header_encoder;
mod line_decoder;
mod request_line;

pub use field_line::parse_field_line;
pub use header_decoder::HeaderDecoder;
pub use header_encoder::HeaderEncoder;
pub use line_decoder::LineDecoder;
pub use request_line::{RequestLine, parse_request_line};
