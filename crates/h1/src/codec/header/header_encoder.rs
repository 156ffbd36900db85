//! HTTP response head encoder.
//!
//! Serializes the status line and header fields of a [`ResponseHead`]:
//!
//! ```text
//! HTTP-version SP status-code SP reason-phrase CRLF
//! *( field-name ": " field-value CRLF )
//! CRLF
//! ```
//!
//! For [`Disposition::ChunkEncoded`] the encoder owns the framing headers: it
//! sets `transfer-encoding: chunked` and drops any `content-length`, so a
//! response never carries both.

use crate::protocol::{Disposition, ResponseHead, SendError};

use bytes::{BufMut, BytesMut};

use http::{HeaderValue, Version, header};
use std::io;
use std::io::{ErrorKind, Write};
use tokio_util::codec::Encoder;
use tracing::error;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

const CHUNKED: HeaderValue = HeaderValue::from_static("chunked");

/// Encoder for HTTP response heads implementing the [`Encoder`] trait.
#[derive(Debug)]
pub struct HeaderEncoder;

impl Encoder<(ResponseHead, Disposition)> for HeaderEncoder {
    type Error = SendError;

    /// Encodes the status line and headers into `dst`.
    ///
    /// # Errors
    ///
    /// Returns an error if the head's version is neither HTTP/1.0 nor HTTP/1.1.
    fn encode(&mut self, item: (ResponseHead, Disposition), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (mut head, disposition) = item;

        let version = match head.version() {
            Version::HTTP_10 => "HTTP/1.0",
            Version::HTTP_11 => "HTTP/1.1",
            v => {
                error!(http_version = ?v, "unsupported http version");
                return Err(io::Error::from(ErrorKind::Unsupported).into());
            }
        };

        dst.reserve(INIT_HEADER_SIZE);
        write!(
            FastWrite(dst),
            "{} {} {}\r\n",
            version,
            head.status().as_str(),
            head.status().canonical_reason().unwrap_or_default()
        )?;

        if disposition == Disposition::ChunkEncoded {
            let headers = head.headers_mut();
            headers.remove(header::CONTENT_LENGTH);
            headers.insert(header::TRANSFER_ENCODING, CHUNKED);
        }

        for (header_name, header_value) in head.headers() {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// Fast writer implementation for writing to BytesMut.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
