//! The byte transport underneath a connection.
//!
//! A [`Transport`] is whatever carries the bytes of one accepted connection:
//! a TCP stream, a TLS stream, an in-memory pipe. The connection only needs
//! four operations from it:
//!
//! - `recv`: append up to `max_len` bytes to a buffer, waiting at most `timeout`
//! - `send`: write all bytes and flush them
//! - `send_file`: write a byte range of a file
//! - `close`: shut the connection down
//!
//! [`IoTransport`] implements it for any tokio `AsyncRead + AsyncWrite` stream.

mod io_transport;
#[cfg(test)]
pub(crate) mod mock;

pub use io_transport::IoTransport;

use std::io;
use std::path::Path;
use std::time::Duration;

use bytes::BytesMut;

/// Outcome of one [`Transport::recv`] call that didn't fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    /// This many bytes were appended to the buffer, at least one
    Bytes(usize),
    /// The peer closed its sending side, no more bytes will arrive
    Closed,
    /// Nothing arrived before the timeout elapsed
    TimedOut,
}

/// Byte transport for one connection.
///
/// `Transport` is the `Send` variant used by the connection; `LocalTransport`
/// is its counterpart for single-threaded runtimes.
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Reads at most `max_len` bytes into `dst`, waiting at most `timeout`.
    /// The connection always asks for at least one byte.
    async fn recv(&mut self, dst: &mut BytesMut, max_len: usize, timeout: Duration) -> io::Result<Received>;

    /// Writes all of `bytes` and flushes them.
    async fn send(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Writes `length` bytes of the file at `path`, starting at `offset`.
    async fn send_file(&mut self, path: &Path, offset: u64, length: u64) -> io::Result<()>;

    /// Shuts the transport down.
    async fn close(&mut self) -> io::Result<()>;
}
