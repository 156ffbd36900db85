//! Scripted in-memory transport for connection tests.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::{Bytes, BytesMut};

use crate::transport::{Received, Transport};

#[derive(Debug)]
enum Event {
    Data(Bytes),
    Timeout,
}

/// Plays back a fixed sequence of reads, then reports the peer as closed.
///
/// Everything the connection writes is captured in `written`.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    events: VecDeque<Event>,
    pub(crate) written: Vec<u8>,
    pub(crate) files: Vec<(PathBuf, u64, u64)>,
    pub(crate) closed: bool,
    fail_send: bool,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queues `bytes` to be returned by the next read(s).
    pub(crate) fn data(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.events.push_back(Event::Data(Bytes::copy_from_slice(bytes.as_ref())));
        self
    }

    /// Queues one read that times out.
    pub(crate) fn timeout(mut self) -> Self {
        self.events.push_back(Event::Timeout);
        self
    }

    /// Makes every write fail.
    pub(crate) fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    pub(crate) fn written_str(&self) -> &str {
        std::str::from_utf8(&self.written).unwrap()
    }
}

impl Transport for MockTransport {
    async fn recv(&mut self, dst: &mut BytesMut, max_len: usize, _timeout: Duration) -> io::Result<Received> {
        if self.closed {
            return Ok(Received::Closed);
        }
        if max_len == 0 {
            return Err(io::ErrorKind::InvalidInput.into());
        }

        match self.events.pop_front() {
            None => Ok(Received::Closed),
            Some(Event::Timeout) => Ok(Received::TimedOut),
            Some(Event::Data(mut bytes)) => {
                if bytes.len() > max_len {
                    let rest = bytes.split_off(max_len);
                    self.events.push_front(Event::Data(rest));
                }
                dst.extend_from_slice(&bytes);
                Ok(Received::Bytes(bytes.len()))
            }
        }
    }

    async fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.fail_send {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    async fn send_file(&mut self, path: &Path, offset: u64, length: u64) -> io::Result<()> {
        if self.fail_send {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        self.files.push((path.to_path_buf(), offset, length));
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}
