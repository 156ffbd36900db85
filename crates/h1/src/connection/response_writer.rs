//! Response side of [`HttpConnection`].
//!
//! A response is a head followed by a body whose framing the head's
//! [`Disposition`] selects. Interim `1xx` heads may precede the final head.
//! Bytes are buffered and handed to the transport when a head completes the
//! response, with each body write, and before a file is sent.
//!
//! Transport failures never surface here: they are logged, the connection is
//! marked broken and the write phase still advances, so the caller's control
//! flow stays the same and [`HttpConnection::finish`] closes the transport.

use std::fmt::Display;
use std::path::Path;

use bytes::{Buf, Bytes};
use http::header::{CONNECTION, CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderMap, HeaderValue, Response, StatusCode, Version};
use http_body::Body;
use http_body_util::BodyExt;
use tokio_util::codec::Encoder;
use tracing::{debug, trace, warn};

use crate::connection::HttpConnection;
use crate::ensure;
use crate::protocol::{Disposition, HttpError, Message, PayloadItem, ResponseHead, SendError, WritePhase};
use crate::transport::Transport;

impl<T: Transport> HttpConnection<T> {
    /// Writes a response head.
    ///
    /// - [`Disposition::Raw`]: body bytes follow as-is, phase becomes `Writing`
    /// - [`Disposition::ChunkEncoded`]: `transfer-encoding: chunked` is set and
    ///   body bytes follow as chunks, phase becomes `Chunking`
    /// - [`Disposition::NoBody`]: the response is complete, phase becomes `Sent`;
    ///   `content-length: 0` is added unless the status is `204` or `304` or
    ///   `headers` already delimit the body
    /// - [`Disposition::Informational`]: an interim `1xx` head, phase stays `Unsent`
    ///
    /// HTTP/1.0 peers can't decode chunked coding, so for them `ChunkEncoded`
    /// is sent as `Raw` with `connection: close`, and the body ends when the
    /// transport closes.
    ///
    /// A `connection` header is added when the persistence of the connection
    /// differs from the default of the HTTP version, unless `headers` already
    /// has one; a `close` token in it disables keep-alive.
    ///
    /// # Errors
    ///
    /// Fails if a final head was already sent, or if `status` is `1xx` and
    /// `disposition` isn't `Informational` or the other way round.
    pub async fn send_headers(&mut self, status: StatusCode, headers: HeaderMap, disposition: Disposition) -> Result<(), HttpError> {
        ensure!(self.write_phase == WritePhase::Unsent, SendError::invalid_phase("send headers", self.write_phase).into());
        ensure!(
            status.is_informational() == (disposition == Disposition::Informational),
            SendError::InvalidStatus { status }.into()
        );

        let mut head = ResponseHead::new(());
        *head.status_mut() = status;
        *head.version_mut() = self.version;
        *head.headers_mut() = headers;

        let disposition = if disposition == Disposition::ChunkEncoded && self.version == Version::HTTP_10 {
            // no chunked coding for HTTP/1.0 peers: the body ends when the connection closes
            debug!("send chunked response raw to HTTP/1.0 peer");
            head.headers_mut().remove(CONTENT_LENGTH);
            head.headers_mut().insert(CONNECTION, HeaderValue::from_static("close"));
            Disposition::Raw
        } else {
            disposition
        };

        if disposition == Disposition::NoBody
            && status != StatusCode::NO_CONTENT
            && status != StatusCode::NOT_MODIFIED
            && !head.headers().contains_key(CONTENT_LENGTH)
            && !head.headers().contains_key(TRANSFER_ENCODING)
        {
            head.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        }

        if disposition != Disposition::Informational {
            self.negotiate_connection(head.headers_mut());
        }

        self.encoder.encode(Message::<_, Bytes>::Header((head, disposition)), &mut self.write_buf)?;
        trace!(status = status.as_u16(), ?disposition, "encoded response head");

        self.write_phase = match disposition {
            Disposition::Raw => WritePhase::Writing,
            Disposition::ChunkEncoded => WritePhase::Chunking,
            Disposition::NoBody => WritePhase::Sent,
            Disposition::Informational => WritePhase::Unsent,
        };

        // a head followed by body bytes is sent together with them
        if !disposition.has_body() {
            self.flush().await;
        }
        Ok(())
    }

    /// Sends an interim `100 Continue` head, for requests that
    /// [expect it](crate::protocol::RequestHead::expects_continue).
    ///
    /// # Errors
    ///
    /// Fails if a final head was already sent.
    pub async fn send_continue(&mut self) -> Result<(), HttpError> {
        self.send_headers(StatusCode::CONTINUE, HeaderMap::new(), Disposition::Informational).await
    }

    /// Writes body bytes of the response.
    ///
    /// With a chunked head `data` becomes one chunk (nothing for empty data),
    /// and `is_final` writes the last chunk. `is_final` completes the
    /// response and moves the phase to `Sent`.
    ///
    /// # Errors
    ///
    /// Fails unless a head with a body was sent and the response isn't complete.
    pub async fn send_data<D: Buf>(&mut self, data: D, is_final: bool) -> Result<(), HttpError> {
        ensure!(self.write_phase.is_writable(), SendError::invalid_phase("send data", self.write_phase).into());

        self.encoder.encode(Message::<(ResponseHead, Disposition), D>::Payload(PayloadItem::Chunk(data)), &mut self.write_buf)?;
        if is_final {
            self.encoder.encode(Message::<(ResponseHead, Disposition), D>::Payload(PayloadItem::Eof), &mut self.write_buf)?;
            self.write_phase = WritePhase::Sent;
        }

        self.flush().await;
        Ok(())
    }

    /// Writes `length` bytes of the file at `path`, from `offset`, as body
    /// bytes of a raw response.
    ///
    /// The phase doesn't change; finish the response with
    /// [`send_data`](Self::send_data) and `is_final`.
    ///
    /// # Errors
    ///
    /// Fails unless a head with [`Disposition::Raw`] was sent and the
    /// response isn't complete.
    pub async fn send_file(&mut self, path: impl AsRef<Path>, offset: u64, length: u64) -> Result<(), HttpError> {
        ensure!(self.write_phase == WritePhase::Writing, SendError::invalid_phase("send file", self.write_phase).into());

        self.flush().await;
        if self.broken {
            return Ok(());
        }

        let path = path.as_ref();
        if let Err(e) = self.transport.send_file(path, offset, length).await {
            warn!(cause = %e, path = %path.display(), "failed to send file, connection will be closed");
            self.broken = true;
        }
        Ok(())
    }

    /// Sends a complete `http::Response`, streaming its body.
    ///
    /// The body's size hint selects the framing: an exact size of zero sends
    /// the head only, another exact size sets `content-length` and writes the
    /// body raw, an unknown size uses chunked encoding (or a raw body ended
    /// by closing the connection for HTTP/1.0). Trailer frames are dropped.
    ///
    /// # Errors
    ///
    /// Fails if a final head was already sent, or if the body yields an error;
    /// the connection is then not reused.
    pub async fn send_response<B>(&mut self, response: Response<B>) -> Result<(), HttpError>
    where
        B: Body + Unpin,
        B::Error: Display,
    {
        let (parts, mut body) = response.into_parts();
        let mut headers = parts.headers;

        let disposition = match body.size_hint().exact() {
            Some(0) => Disposition::NoBody,
            Some(_) => Disposition::Raw,
            None => Disposition::ChunkEncoded,
        };

        if let Some(length) = body.size_hint().exact()
            && parts.status != StatusCode::NO_CONTENT
            && parts.status != StatusCode::NOT_MODIFIED
        {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        }

        self.send_headers(parts.status, headers, disposition).await?;
        if !disposition.has_body() {
            return Ok(());
        }

        loop {
            match body.frame().await {
                Some(Ok(frame)) => {
                    if let Ok(data) = frame.into_data() {
                        self.send_data(data, false).await?;
                    }
                }
                Some(Err(e)) => {
                    self.broken = true;
                    return Err(SendError::invalid_body(format!("resolve response body error: {e}")).into());
                }
                None => return self.send_data(Bytes::new(), true).await,
            }
        }
    }

    fn negotiate_connection(&mut self, headers: &mut HeaderMap) {
        if let Some(value) = headers.get(CONNECTION) {
            let close = value.as_bytes().split(|b| *b == b',').any(|token| token.trim_ascii().eq_ignore_ascii_case(b"close"));
            if close {
                self.keepalive = false;
            }
            return;
        }

        match (self.version, self.keepalive) {
            (Version::HTTP_11, false) => {
                headers.insert(CONNECTION, HeaderValue::from_static("close"));
            }
            (Version::HTTP_10, true) => {
                headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
            }
            _ => {}
        }
    }
}
