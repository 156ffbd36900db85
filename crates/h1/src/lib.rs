//! HTTP/1.x wire framing for servers
//!
//! This crate turns the bytes of one accepted connection into a sequence of
//! requests (request line, headers, body) and turns responses back into
//! correctly framed bytes. It covers chunked transfer coding, persistent
//! connections and pipelining, and it rejects ambiguous body framing that
//! could be used for request smuggling. Routing, handlers and the accept
//! loop are left to the caller.
//!
//! # Features
//!
//! - Incremental parsing of request heads arriving in arbitrary fragments
//! - Limits on request-line length, header-line length and header count
//! - `content-length` and chunked request bodies, read in caller-sized pieces
//! - Raw, chunked, header-only and interim (`100 Continue`) responses
//! - Keep-alive negotiation and draining of unread bodies
//! - Errors classified by the HTTP status to answer with
//!
//! # Example
//!
//! ```no_run
//! use http::{HeaderMap, StatusCode};
//! use micro_h1::connection::HttpConnection;
//! use micro_h1::protocol::{Disposition, HttpError};
//! use micro_h1::transport::IoTransport;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn, Level};
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Initialize logging
//!     let subscriber = FmtSubscriber::builder()
//!         .with_max_level(Level::INFO)
//!         .finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     info!(port = 8080, "start listening");
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         tokio::spawn(async move {
//!             let mut connection = HttpConnection::new(IoTransport::new(tcp_stream));
//!             if let Err(e) = hello_world(&mut connection).await {
//!                 error!(cause = %e, "service has error, connection shutdown");
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(connection: &mut HttpConnection<IoTransport<tokio::net::TcpStream>>) -> Result<(), HttpError> {
//!     loop {
//!         let head = match connection.read_headers().await {
//!             Ok(Some(head)) => head,
//!             Ok(None) => return Ok(()),
//!             Err(e) => {
//!                 connection.send_error(e.status()).await;
//!                 return Err(e);
//!             }
//!         };
//!         info!(path = head.target().path(), "receive request");
//!
//!         let body = b"Hello World!\r\n";
//!         let mut headers = HeaderMap::new();
//!         headers.insert(http::header::CONTENT_LENGTH, body.len().into());
//!         connection.send_headers(StatusCode::OK, headers, Disposition::Raw).await?;
//!         connection.send_data(&body[..], true).await?;
//!
//!         if !connection.finish().await? {
//!             return Ok(());
//!         }
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`connection`]: the per-connection state machine, [`connection::HttpConnection`]
//! - [`codec`]: request decoding and response encoding over a byte buffer
//! - [`protocol`]: request and response heads, phases, framing and errors
//! - [`transport`]: the byte transport trait and its tokio implementation
//! - [`config`]: limits, read sizes and timeouts
//!
//! # Error Handling
//!
//! - [`protocol::HttpError`]: Top-level error type
//! - [`protocol::ParseError`]: Request parsing errors, each mapped to a status
//!   by [`ParseError::status`](protocol::ParseError::status)
//! - [`protocol::SendError`]: Response sending errors
//!
//! # Limitations
//!
//! - HTTP/1.0 and HTTP/1.1 only (HTTP/2 or HTTP/3 is not supported)
//! - `chunked` is the only transfer coding; other codings are answered with `501`
//! - Authority-form request targets (`CONNECT`) are rejected

pub mod codec;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod transport;

mod utils;
pub(crate) use utils::ensure;
