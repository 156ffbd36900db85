use bytes::{Bytes, BytesMut};
use http::header::{CONNECTION, CONTENT_LENGTH};
use http::{HeaderValue, Response, StatusCode, Version};
use std::io::ErrorKind;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, error, info, trace, warn};

use crate::codec::header::HeaderEncoder;
use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::config::ConnectionConfig;
use crate::ensure;
use crate::protocol::{
    Disposition, Framing, HttpError, Message, ParseError, PayloadItem, ReadPhase, ReadStatus, RequestHead, WritePhase,
};
use crate::transport::{Received, Transport};

/// One HTTP/1.x connection: a request/response exchange at a time over a
/// [`Transport`].
///
/// `HttpConnection` owns the bytes received but not yet consumed, so
/// pipelined requests stay in order, and it tracks where the current exchange
/// stands:
///
/// - read side: [`ReadPhase`], the body framing and the negotiated keep-alive
/// - write side: [`WritePhase`] and the framing of the response body
///
/// Each exchange goes through
/// [`read_headers`](Self::read_headers), any number of
/// [`read_data`](Self::read_data) calls, the response
/// (`send_headers`, `send_data`, `send_file` or `send_response`) and finally
/// [`finish`](Self::finish), which drains an unread body and decides whether
/// the transport is reused.
#[derive(Debug)]
pub struct HttpConnection<T> {
    pub(super) transport: T,
    pub(super) config: ConnectionConfig,
    pub(super) buffer: BytesMut,
    pub(super) write_buf: BytesMut,
    pub(super) decoder: RequestDecoder,
    pub(super) encoder: ResponseEncoder,
    pub(super) read_phase: ReadPhase,
    pub(super) write_phase: WritePhase,
    pub(super) framing: Framing,
    pub(super) version: Version,
    pub(super) keepalive: bool,
    /// set once a write to the transport failed
    pub(super) broken: bool,
}

/// Outcome of one body read; `progressed` is false when a timeout hit before
/// any byte was received or consumed.
#[derive(Debug)]
struct DataRead {
    bytes: Bytes,
    status: ReadStatus,
    progressed: bool,
}

impl<T: Transport> HttpConnection<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ConnectionConfig::default())
    }

    pub fn with_config(transport: T, config: ConnectionConfig) -> Self {
        Self {
            transport,
            config,
            buffer: BytesMut::new(),
            write_buf: BytesMut::new(),
            decoder: RequestDecoder::new(config.limits),
            encoder: ResponseEncoder::new(),
            read_phase: ReadPhase::Unread,
            write_phase: WritePhase::Unsent,
            framing: Framing::Empty,
            version: Version::HTTP_10,
            keepalive: false,
            broken: false,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn read_phase(&self) -> ReadPhase {
        self.read_phase
    }

    pub fn write_phase(&self) -> WritePhase {
        self.write_phase
    }

    /// Body framing of the current request.
    pub fn framing(&self) -> &Framing {
        &self.framing
    }

    /// HTTP version of the current request; HTTP/1.0 before the first one.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Whether the transport may carry another request after this exchange.
    pub fn is_keep_alive(&self) -> bool {
        self.keepalive && !self.broken
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Reads the next request head.
    ///
    /// Returns `Ok(None)` if the peer closed the connection before sending any
    /// byte of a new request. A request without a body is fully read once
    /// this returns.
    ///
    /// # Errors
    ///
    /// Fails with a [`ParseError`] if the head is malformed, exceeds a limit,
    /// declares an ambiguous body framing, or doesn't arrive in time.
    /// [`ParseError::status`] gives the status for [`send_error`](Self::send_error).
    pub async fn read_headers(&mut self) -> Result<Option<RequestHead>, HttpError> {
        ensure!(
            self.read_phase == ReadPhase::Unread,
            ParseError::InvalidPhase { operation: "read headers", phase: self.read_phase }.into()
        );

        let result = self.do_read_headers().await;
        if result.is_err() {
            self.keepalive = false;
        }
        result
    }

    async fn do_read_headers(&mut self) -> Result<Option<RequestHead>, HttpError> {
        loop {
            match self.decoder.decode(&mut self.buffer)? {
                Some(Message::Header((head, framing))) => {
                    self.version = head.version();
                    self.keepalive = head.is_keep_alive();
                    self.read_phase.advance(ReadPhase::HeadersRead);
                    if framing.is_empty() {
                        self.decoder.reset_payload();
                        self.read_phase.advance(ReadPhase::BodyRead);
                    }

                    debug!(method = %head.method(), target = %head.target(), version = ?self.version, framing = ?framing, "read request head");
                    self.framing = framing;
                    return Ok(Some(head));
                }
                Some(Message::Payload(_)) => {
                    error!("expect request head but receive payload item");
                    return Err(ParseError::InvalidPhase { operation: "read headers", phase: self.read_phase }.into());
                }
                None => {}
            }

            match self.recv().await? {
                Received::Bytes(len) => trace!(len, "read request head bytes"),
                Received::TimedOut => return Err(ParseError::Timeout.into()),
                Received::Closed if self.buffer.is_empty() && !self.decoder.is_partial() => {
                    info!("peer closed connection before next request");
                    return Ok(None);
                }
                Received::Closed => return Err(ParseError::io(ErrorKind::UnexpectedEof).into()),
            }
        }
    }

    /// Reads up to `max` bytes of the request body.
    ///
    /// Buffered bytes are used first; the transport is read in
    /// `read_length` units until `max` bytes are collected or the body ends.
    /// [`ReadStatus::Done`] means the body is complete; a read timeout
    /// returns what was collected so far with [`ReadStatus::More`].
    ///
    /// # Errors
    ///
    /// Fails on a malformed chunked body, an unsupported transfer coding, or
    /// a peer closing before the body is complete.
    pub async fn read_data(&mut self, max: usize) -> Result<(Bytes, ReadStatus), HttpError> {
        let read = self.read_body(max).await?;
        Ok((read.bytes, read.status))
    }

    async fn read_body(&mut self, max: usize) -> Result<DataRead, HttpError> {
        match self.read_phase {
            ReadPhase::Unread => {
                return Err(ParseError::InvalidPhase { operation: "read data", phase: self.read_phase }.into());
            }
            ReadPhase::BodyRead => return Ok(DataRead { bytes: Bytes::new(), status: ReadStatus::Done, progressed: false }),
            ReadPhase::HeadersRead => {}
        }

        let result = self.do_read_body(max).await;
        if result.is_err() {
            self.keepalive = false;
        }
        result
    }

    async fn do_read_body(&mut self, max: usize) -> Result<DataRead, HttpError> {
        let mut collected = BytesMut::new();
        let buffered = self.buffer.len();
        let mut received = 0;

        loop {
            match self.decoder.decode_payload(&mut self.buffer, max - collected.len())? {
                Some(PayloadItem::Chunk(bytes)) => {
                    collected.extend_from_slice(&bytes);
                    continue;
                }
                Some(PayloadItem::Eof) => {
                    trace!(len = collected.len(), "read last body bytes");
                    self.read_phase.advance(ReadPhase::BodyRead);
                    return Ok(DataRead { bytes: collected.freeze(), status: ReadStatus::Done, progressed: true });
                }
                None => {}
            }

            if collected.len() == max {
                return Ok(DataRead { bytes: collected.freeze(), status: ReadStatus::More, progressed: true });
            }

            match self.recv().await? {
                Received::Bytes(len) => {
                    trace!(len, "read request body bytes");
                    received += len;
                }
                Received::TimedOut => {
                    debug!(len = collected.len(), "timed out reading request body");
                    // framing bytes consumed from the buffer count as progress too
                    let progressed = !collected.is_empty() || received > 0 || self.buffer.len() != buffered;
                    return Ok(DataRead { bytes: collected.freeze(), status: ReadStatus::More, progressed });
                }
                Received::Closed => return Err(ParseError::IncompleteBody.into()),
            }
        }
    }

    /// Reads and discards whatever is left of the request body, so the
    /// buffer starts at the next request.
    ///
    /// # Errors
    ///
    /// Fails like [`read_data`](Self::read_data), or with
    /// [`ParseError::Timeout`] if a read times out without receiving or
    /// consuming any byte.
    pub async fn ensure_completed(&mut self) -> Result<(), HttpError> {
        while self.read_phase == ReadPhase::HeadersRead {
            let read = self.read_body(self.config.length.max(1)).await?;
            if read.status.is_done() {
                break;
            }

            if !read.progressed {
                self.keepalive = false;
                return Err(ParseError::Timeout.into());
            }
            trace!(len = read.bytes.len(), "discard unread request body");
        }
        Ok(())
    }

    /// Completes the current exchange.
    ///
    /// Drains the request body, then either resets the per-request state and
    /// returns `true` when the connection can carry another request, or closes
    /// the transport and returns `false`. The connection is reusable only if
    /// keep-alive was negotiated, the response was fully sent and no write
    /// failed.
    ///
    /// # Errors
    ///
    /// Fails if draining the body fails; the transport is closed first.
    pub async fn finish(&mut self) -> Result<bool, HttpError> {
        self.flush().await;
        let drained = self.ensure_completed().await;

        if drained.is_ok() && self.is_keep_alive() && self.write_phase.is_sent() {
            self.reset();
            debug!(buffered = self.buffer.len(), "keep connection alive for next request");
            return Ok(true);
        }

        self.close().await;
        drained.map(|()| false)
    }

    /// Writes a header-only error response and closes the transport.
    ///
    /// Meant for failures before a response has begun, usually a
    /// [`ParseError`] from [`read_headers`](Self::read_headers) with
    /// [`ParseError::status`]. If a response head is already on the wire
    /// nothing more is written.
    pub async fn send_error(&mut self, status: StatusCode) {
        self.keepalive = false;

        if self.write_phase == WritePhase::Unsent && !self.broken {
            let mut head = Response::new(());
            *head.status_mut() = status;
            *head.version_mut() = self.version;
            head.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
            head.headers_mut().insert(CONNECTION, HeaderValue::from_static("close"));

            self.write_buf.clear();
            match HeaderEncoder.encode((head, Disposition::NoBody), &mut self.write_buf) {
                Ok(()) => self.flush().await,
                Err(e) => error!(cause = %e, "can't encode error response"),
            }
            info!(status = status.as_u16(), "sent error response");
        } else {
            warn!(phase = ?self.write_phase, "response already started, close without error response");
        }

        self.write_phase = WritePhase::Sent;
        self.close().await;
    }

    pub(super) async fn recv(&mut self) -> Result<Received, ParseError> {
        let received = self
            .transport
            .recv(&mut self.buffer, self.config.read_length.max(1), self.config.read_timeout)
            .await
            .map_err(ParseError::io)?;

        match received {
            Received::Bytes(0) => {
                warn!("transport read returned no bytes, treat peer as closed");
                Ok(Received::Closed)
            }
            received => Ok(received),
        }
    }

    /// Writes out buffered response bytes. Failures are logged and mark the
    /// connection broken instead of failing the caller.
    pub(super) async fn flush(&mut self) {
        if self.write_buf.is_empty() {
            return;
        }

        if self.broken {
            self.write_buf.clear();
            return;
        }

        if let Err(e) = self.transport.send(&self.write_buf).await {
            warn!(cause = %e, "failed to write response, connection will be closed");
            self.broken = true;
        }
        self.write_buf.clear();
    }

    async fn close(&mut self) {
        self.keepalive = false;
        if let Err(e) = self.transport.close().await {
            debug!(cause = %e, "failed to close transport");
        }
    }

    fn reset(&mut self) {
        self.read_phase = ReadPhase::Unread;
        self.write_phase = WritePhase::Unsent;
        self.framing = Framing::Empty;
        self.decoder.reset_payload();
        self.encoder.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use http::{HeaderMap, Method};
    use indoc::indoc;

    fn crlf(s: &str) -> String {
        s.replace('\n', "\r\n")
    }

    fn connection(transport: MockTransport) -> HttpConnection<MockTransport> {
        HttpConnection::new(transport)
    }

    async fn read_body(conn: &mut HttpConnection<MockTransport>, max: usize) -> Vec<u8> {
        let mut body = Vec::new();
        loop {
            let (bytes, status) = conn.read_data(max).await.unwrap();
            assert!(bytes.len() <= max);
            body.extend_from_slice(&bytes);
            if status.is_done() {
                return body;
            }
        }
    }

    #[tokio::test]
    async fn scenario_get_with_body() {
        let transport = MockTransport::new().data("GET /x HTTP/1.1\r\nHost: a\r\nContent-Length: 3\r\n\r\nabc");
        let mut conn = connection(transport);

        let head = conn.read_headers().await.unwrap().unwrap();
        assert_eq!(head.method(), Method::GET);
        assert_eq!(head.target(), "/x");
        assert_eq!(head.version(), Version::HTTP_11);

        let headers: Vec<(&str, &[u8])> = head.headers().iter().map(|(n, v)| (n.as_str(), v.as_bytes())).collect();
        assert_eq!(headers, vec![("host", &b"a"[..]), ("content-length", &b"3"[..])]);

        assert_eq!(conn.read_phase(), ReadPhase::HeadersRead);
        let (bytes, status) = conn.read_data(10).await.unwrap();
        assert_eq!(&bytes[..], b"abc");
        assert_eq!(status, ReadStatus::Done);
        assert_eq!(conn.read_phase(), ReadPhase::BodyRead);
    }

    #[tokio::test]
    async fn head_arrives_in_fragments() {
        let transport = MockTransport::new().data("POST /up").data("load HTTP/1.1\r\nContent-Le").data("ngth: 4\r\n\r").data("\nab").data("cd");
        let mut conn = connection(transport);

        let head = conn.read_headers().await.unwrap().unwrap();
        assert_eq!(head.target(), "/upload");
        assert_eq!(conn.framing(), &Framing::Length(4));
        assert_eq!(read_body(&mut conn, 100).await, b"abcd");
    }

    #[tokio::test]
    async fn no_body_is_read_with_head() {
        let mut conn = connection(MockTransport::new().data("GET / HTTP/1.1\r\n\r\n"));

        conn.read_headers().await.unwrap().unwrap();
        assert_eq!(conn.read_phase(), ReadPhase::BodyRead);

        let (bytes, status) = conn.read_data(10).await.unwrap();
        assert!(bytes.is_empty());
        assert!(status.is_done());
    }

    #[tokio::test]
    async fn clean_close_before_request() {
        let mut conn = connection(MockTransport::new());
        assert!(conn.read_headers().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn close_in_the_middle_of_head() {
        let mut conn = connection(MockTransport::new().data("GET / HTTP/1.1\r\nHost"));
        assert!(conn.read_headers().await.is_err());
        assert!(!conn.is_keep_alive());
    }

    #[tokio::test]
    async fn head_timeout() {
        let mut conn = connection(MockTransport::new().data("GET / HT").timeout());

        let err = conn.read_headers().await.unwrap_err();
        assert!(matches!(err, HttpError::RequestError { source: ParseError::Timeout }));
        assert_eq!(err.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn phases_are_checked() {
        let mut conn = connection(MockTransport::new().data("GET / HTTP/1.1\r\n\r\n"));

        assert!(matches!(
            conn.read_data(10).await,
            Err(HttpError::RequestError { source: ParseError::InvalidPhase { phase: ReadPhase::Unread, .. } })
        ));

        conn.read_headers().await.unwrap().unwrap();
        assert!(matches!(
            conn.read_headers().await,
            Err(HttpError::RequestError { source: ParseError::InvalidPhase { phase: ReadPhase::BodyRead, .. } })
        ));
    }

    #[tokio::test]
    async fn length_conservation() {
        let transport = MockTransport::new().data("PUT /f HTTP/1.1\r\nContent-Length: 10\r\n\r\n012").data("3456").data("789GET");
        let mut conn = connection(transport);
        conn.read_headers().await.unwrap().unwrap();

        let mut total = 0;
        loop {
            let (bytes, status) = conn.read_data(3).await.unwrap();
            total += bytes.len();
            if status.is_done() {
                break;
            }
        }
        assert_eq!(total, 10);
        assert_eq!(&conn.buffer[..], b"GET");
    }

    #[tokio::test]
    async fn early_close_is_an_error() {
        let transport = MockTransport::new().data("PUT /f HTTP/1.1\r\nContent-Length: 10\r\n\r\n01234");
        let mut conn = connection(transport);
        conn.read_headers().await.unwrap().unwrap();

        let err = conn.read_data(100).await.unwrap_err();
        assert!(matches!(err, HttpError::RequestError { source: ParseError::IncompleteBody }));
        assert!(!conn.is_keep_alive());
    }

    #[tokio::test]
    async fn body_timeout_returns_partial_data() {
        let transport = MockTransport::new().data("PUT /f HTTP/1.1\r\nContent-Length: 6\r\n\r\nabc").timeout().data("def");
        let mut conn = connection(transport);
        conn.read_headers().await.unwrap().unwrap();

        let (bytes, status) = conn.read_data(100).await.unwrap();
        assert_eq!(&bytes[..], b"abc");
        assert_eq!(status, ReadStatus::More);

        let (bytes, status) = conn.read_data(100).await.unwrap();
        assert_eq!(&bytes[..], b"def");
        assert_eq!(status, ReadStatus::Done);
    }

    /// Bodies written by the chunked response writer read back unchanged.
    #[tokio::test]
    async fn chunk_round_trip() {
        let read_length = 16;
        let bodies: Vec<Vec<u8>> = vec![vec![], vec![b'x'], vec![b'y'; read_length], (0..100u8).collect()];

        for body in bodies {
            let mut writer = connection(MockTransport::new().data("GET / HTTP/1.1\r\n\r\n"));
            writer.read_headers().await.unwrap().unwrap();
            writer.send_headers(StatusCode::OK, HeaderMap::new(), Disposition::ChunkEncoded).await.unwrap();
            for piece in body.chunks(7) {
                writer.send_data(piece, false).await.unwrap();
            }
            writer.send_data(Bytes::new(), true).await.unwrap();

            let written = writer.into_transport().written;
            let head_end = written.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
            assert!(written[..head_end].ends_with(b"transfer-encoding: chunked\r\n\r\n"));

            let mut request = b"POST /c HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n".to_vec();
            request.extend_from_slice(&written[head_end..]);

            let config = ConnectionConfig::default().with_read_length(read_length);
            let mut reader = HttpConnection::with_config(MockTransport::new().data(&request), config);
            reader.read_headers().await.unwrap().unwrap();
            assert!(reader.framing().is_chunked());

            assert_eq!(read_body(&mut reader, read_length).await, body);
            assert!(reader.buffer.is_empty());
        }
    }

    #[tokio::test]
    async fn conflicting_framing_fails_before_body() {
        let request = crlf(indoc! {"
            POST / HTTP/1.1
            Content-Length: 5
            Transfer-Encoding: chunked

            0

        "});
        let mut conn = connection(MockTransport::new().data(request));

        let err = conn.read_headers().await.unwrap_err();
        assert!(matches!(err, HttpError::RequestError { source: ParseError::ConflictingFraming }));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(conn.read_phase(), ReadPhase::Unread);
    }

    #[tokio::test]
    async fn unsupported_coding_fails_on_read() {
        let request = crlf(indoc! {"
            POST / HTTP/1.1
            Transfer-Encoding: gzip

        "});
        let mut conn = connection(MockTransport::new().data(request));

        conn.read_headers().await.unwrap().unwrap();
        let err = conn.read_data(10).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn keep_alive_matrix() {
        let cases = [
            ("HTTP/1.1", None, true),
            ("HTTP/1.1", Some("close"), false),
            ("HTTP/1.0", None, false),
            ("HTTP/1.0", Some("keep-alive"), true),
            ("HTTP/1.1", Some("Keep-Alive"), true),
            ("HTTP/1.0", Some("Keep-Alive"), true),
        ];

        for (version, connection_header, expected) in cases {
            let mut request = format!("GET / {version}\r\n");
            if let Some(value) = connection_header {
                request.push_str(&format!("Connection: {value}\r\n"));
            }
            request.push_str("\r\n");

            let mut conn = connection(MockTransport::new().data(request));
            conn.read_headers().await.unwrap().unwrap();
            assert_eq!(conn.is_keep_alive(), expected, "{version} {connection_header:?}");
        }
    }

    #[tokio::test]
    async fn request_line_limit() {
        let config = ConnectionConfig::default().with_max_request_line_length(20);
        let line = format!("GET /{} HTTP/1.1", "a".repeat(20));
        let mut conn = HttpConnection::with_config(MockTransport::new().data(&line[..21]), config);

        let err = conn.read_headers().await.unwrap_err();
        assert!(matches!(err, HttpError::RequestError { source: ParseError::LineTooLong { .. } }));
        assert_eq!(err.status(), StatusCode::URI_TOO_LONG);
    }

    #[tokio::test]
    async fn header_count_limit() {
        let mut request = String::from("GET / HTTP/1.1\r\n");
        for i in 0..51 {
            request.push_str(&format!("X-Header-{i}: {i}\r\n"));
        }
        request.push_str("\r\n");

        let mut conn = connection(MockTransport::new().data(request));
        let err = conn.read_headers().await.unwrap_err();
        assert!(matches!(err, HttpError::RequestError { source: ParseError::TooManyHeaders { max_num: 50 } }));
        assert_eq!(err.status(), StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE);
    }

    /// Every framing, drained after 0, 1 or 2 partial reads, leaves the
    /// buffer at the next request.
    #[tokio::test]
    async fn draining_aligns_next_request() {
        let requests = [
            "POST /a HTTP/1.1\r\nContent-Length: 12\r\n\r\nhello world!",
            "POST /a HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n7\r\n world!\r\n0\r\nX-T: 1\r\n\r\n",
            "GET /a HTTP/1.1\r\n\r\n",
        ];

        for request in requests {
            for partial_reads in 0..3 {
                let config = ConnectionConfig::default().with_read_length(5).with_length(4);
                let transport = MockTransport::new().data(format!("{request}GET /next HTTP/1.1\r\n\r\n"));
                let mut conn = HttpConnection::with_config(transport, config);

                let head = conn.read_headers().await.unwrap().unwrap();
                assert_eq!(head.target(), "/a");
                for _ in 0..partial_reads {
                    conn.read_data(3).await.unwrap();
                }

                conn.send_headers(StatusCode::NO_CONTENT, HeaderMap::new(), Disposition::NoBody).await.unwrap();
                assert!(conn.finish().await.unwrap(), "{request:?} after {partial_reads} reads");

                let next = conn.read_headers().await.unwrap().unwrap();
                assert_eq!(next.target(), "/next");
            }
        }
    }

    #[tokio::test]
    async fn draining_without_progress_times_out() {
        let transport = MockTransport::new().data("POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nab").timeout().timeout();
        let mut conn = connection(transport);
        conn.read_headers().await.unwrap().unwrap();

        let err = conn.ensure_completed().await.unwrap_err();
        assert!(matches!(err, HttpError::RequestError { source: ParseError::Timeout }));
        assert!(!conn.is_keep_alive());
    }

    #[tokio::test]
    async fn draining_counts_consumed_framing_as_progress() {
        let transport = MockTransport::new()
            .data("POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n")
            .data("0\r\n")
            .timeout()
            .data("\r\nGET /next HTTP/1.1\r\n\r\n");
        let mut conn = connection(transport);
        conn.read_headers().await.unwrap().unwrap();

        let (bytes, status) = conn.read_data(5).await.unwrap();
        assert_eq!(&bytes[..], b"hello");
        assert_eq!(status, ReadStatus::More);

        conn.send_headers(StatusCode::NO_CONTENT, HeaderMap::new(), Disposition::NoBody).await.unwrap();
        assert!(conn.finish().await.unwrap());

        let next = conn.read_headers().await.unwrap().unwrap();
        assert_eq!(next.target(), "/next");
    }

    #[tokio::test]
    async fn zero_lengths_in_config_still_read() {
        let from_json: ConnectionConfig = serde_json::from_str(r#"{"read_length": 0, "length": 0}"#).unwrap();
        let assigned = ConnectionConfig { read_length: 0, length: 0, ..ConnectionConfig::default() };

        for config in [from_json, assigned] {
            let transport = MockTransport::new().data("POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcGET /next HTTP/1.1\r\n\r\n");
            let mut conn = HttpConnection::with_config(transport, config);

            let head = conn.read_headers().await.unwrap().unwrap();
            assert_eq!(head.target(), "/");

            conn.send_headers(StatusCode::NO_CONTENT, HeaderMap::new(), Disposition::NoBody).await.unwrap();
            assert!(conn.finish().await.unwrap(), "{config:?}");

            let next = conn.read_headers().await.unwrap().unwrap();
            assert_eq!(next.target(), "/next");
        }
    }

    #[tokio::test]
    async fn empty_read_counts_as_close() {
        let mut conn = connection(MockTransport::new().data("").data("GET / HTTP/1.1\r\n\r\n"));
        assert!(conn.read_headers().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn finish_closes_non_persistent_connection() {
        let mut conn = connection(MockTransport::new().data("GET / HTTP/1.0\r\n\r\n"));
        conn.read_headers().await.unwrap().unwrap();
        conn.send_headers(StatusCode::OK, HeaderMap::new(), Disposition::NoBody).await.unwrap();

        assert!(!conn.finish().await.unwrap());
        assert!(conn.transport().closed);
    }

    #[tokio::test]
    async fn finish_closes_when_response_incomplete() {
        let mut conn = connection(MockTransport::new().data("GET / HTTP/1.1\r\n\r\n"));
        conn.read_headers().await.unwrap().unwrap();
        conn.send_headers(StatusCode::OK, HeaderMap::new(), Disposition::ChunkEncoded).await.unwrap();
        conn.send_data(Bytes::from_static(b"part"), false).await.unwrap();

        assert!(!conn.finish().await.unwrap());
        assert!(conn.transport().closed);
    }

    #[tokio::test]
    async fn send_error_writes_minimal_response() {
        let mut conn = connection(MockTransport::new().data("GET / HTTP/1.1\r\nBad Header: x\r\n\r\n"));

        let err = conn.read_headers().await.unwrap_err();
        conn.send_error(err.status()).await;

        let transport = conn.into_transport();
        assert_eq!(
            transport.written_str(),
            "HTTP/1.0 400 Bad Request\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
        );
        assert!(transport.closed);
    }

    #[tokio::test]
    async fn send_error_after_response_started() {
        let mut conn = connection(MockTransport::new().data("GET / HTTP/1.1\r\n\r\n"));
        conn.read_headers().await.unwrap().unwrap();
        conn.send_headers(StatusCode::OK, HeaderMap::new(), Disposition::Raw).await.unwrap();
        conn.send_data(Bytes::from_static(b"par"), false).await.unwrap();

        conn.send_error(StatusCode::INTERNAL_SERVER_ERROR).await;
        let transport = conn.into_transport();
        assert_eq!(transport.written_str(), "HTTP/1.1 200 OK\r\n\r\npar");
        assert!(transport.closed);
    }

    #[tokio::test]
    async fn pipelined_keep_alive_exchanges() {
        let request = crlf(indoc! {"
            GET /1 HTTP/1.1
            Host: a

            GET /2 HTTP/1.1
            Host: a
            Connection: close

        "});
        let mut conn = connection(MockTransport::new().data(request));

        let head = conn.read_headers().await.unwrap().unwrap();
        assert_eq!(head.target(), "/1");
        conn.send_headers(StatusCode::OK, HeaderMap::new(), Disposition::NoBody).await.unwrap();
        assert!(conn.finish().await.unwrap());

        let head = conn.read_headers().await.unwrap().unwrap();
        assert_eq!(head.target(), "/2");
        conn.send_headers(StatusCode::OK, HeaderMap::new(), Disposition::NoBody).await.unwrap();
        assert!(!conn.finish().await.unwrap());

        assert_eq!(
            conn.transport().written_str(),
            "HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\nHTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
        );
    }
}
