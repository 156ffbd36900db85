//! HTTP connection handling module
//!
//! This module sequences request/response exchanges over one transport.
//!
//! # Components
//!
//! - [`HttpConnection`]: connection state machine that:
//!   - Reads request heads and bodies from a residual buffer plus the transport
//!   - Writes responses raw, chunked, header-only or as interim `1xx` heads
//!   - Drains unread request bodies so pipelined requests stay aligned
//!   - Decides whether the transport is kept alive
//!
//! # Example
//!
//! ```no_run
//! use http::{HeaderMap, StatusCode};
//! use micro_h1::connection::HttpConnection;
//! use micro_h1::protocol::Disposition;
//! use micro_h1::transport::IoTransport;
//! use tokio::net::TcpStream;
//!
//! async fn serve(stream: TcpStream) {
//!     let mut connection = HttpConnection::new(IoTransport::new(stream));
//!     loop {
//!         let _head = match connection.read_headers().await {
//!             Ok(Some(head)) => head,
//!             Ok(None) => return,
//!             Err(e) => return connection.send_error(e.status()).await,
//!         };
//!
//!         if connection.send_headers(StatusCode::NO_CONTENT, HeaderMap::new(), Disposition::NoBody).await.is_err() {
//!             return;
//!         }
//!         if !matches!(connection.finish().await, Ok(true)) {
//!             return;
//!         }
//!     }
//! }
//! ```

mod http_connection;
mod response_writer;

pub use http_connection::HttpConnection;
