use std::cmp;
use std::io;
use std::io::{ErrorKind, SeekFrom};
use std::path::Path;
use std::time::Duration;

use bytes::BytesMut;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::transport::{Received, Transport};

/// Initial spare capacity reserved in the read buffer before each read
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// [`Transport`] over a tokio stream such as `TcpStream` or a TLS stream.
#[derive(Debug)]
pub struct IoTransport<S> {
    io: S,
}

impl<S> IoTransport<S> {
    pub fn new(io: S) -> Self {
        Self { io }
    }

    pub fn get_ref(&self) -> &S {
        &self.io
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.io
    }

    pub fn into_inner(self) -> S {
        self.io
    }
}

impl<S> Transport for IoTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self, dst: &mut BytesMut, max_len: usize, timeout: Duration) -> io::Result<Received> {
        if max_len == 0 {
            return Err(io::Error::new(ErrorKind::InvalidInput, "recv needs room for at least one byte"));
        }

        dst.reserve(cmp::min(max_len, READ_BUFFER_SIZE));
        let mut limited = (&mut self.io).take(max_len as u64);

        match tokio::time::timeout(timeout, limited.read_buf(dst)).await {
            Ok(Ok(0)) => Ok(Received::Closed),
            Ok(Ok(n)) => {
                trace!(len = n, "received bytes");
                Ok(Received::Bytes(n))
            }
            Ok(Err(e)) => Err(e),
            Err(_elapsed) => Ok(Received::TimedOut),
        }
    }

    async fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.io.write_all(bytes).await?;
        self.io.flush().await
    }

    async fn send_file(&mut self, path: &Path, offset: u64, length: u64) -> io::Result<()> {
        let mut file = File::open(path).await?;
        file.seek(SeekFrom::Start(offset)).await?;

        let copied = tokio::io::copy(&mut file.take(length), &mut self.io).await?;
        if copied < length {
            return Err(io::Error::new(ErrorKind::UnexpectedEof, format!("file ended after {copied} of {length} bytes")));
        }

        trace!(len = copied, path = %path.display(), "sent file range");
        self.io.flush().await
    }

    async fn close(&mut self) -> io::Result<()> {
        self.io.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn recv_respects_max_len() {
        let (mut client, server) = duplex(64);
        let mut transport = IoTransport::new(server);
        client.write_all(b"hello world").await.unwrap();

        let mut buffer = BytesMut::new();
        assert_eq!(transport.recv(&mut buffer, 5, TIMEOUT).await.unwrap(), Received::Bytes(5));
        assert_eq!(&buffer[..], b"hello");

        assert_eq!(transport.recv(&mut buffer, 100, TIMEOUT).await.unwrap(), Received::Bytes(6));
        assert_eq!(&buffer[..], b"hello world");
    }

    #[tokio::test]
    async fn recv_rejects_zero_max_len() {
        let (mut client, server) = duplex(64);
        let mut transport = IoTransport::new(server);
        client.write_all(b"hello").await.unwrap();

        let mut buffer = BytesMut::new();
        let err = transport.recv(&mut buffer, 0, TIMEOUT).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn recv_times_out() {
        let (_client, server) = duplex(64);
        let mut transport = IoTransport::new(server);

        let mut buffer = BytesMut::new();
        let received = transport.recv(&mut buffer, 10, Duration::from_millis(10)).await.unwrap();
        assert_eq!(received, Received::TimedOut);
        assert!(buffer.is_empty());
    }

    #[tokio::test]
    async fn recv_sees_close() {
        let (client, server) = duplex(64);
        let mut transport = IoTransport::new(server);
        drop(client);

        let mut buffer = BytesMut::new();
        assert_eq!(transport.recv(&mut buffer, 10, TIMEOUT).await.unwrap(), Received::Closed);
    }

    #[tokio::test]
    async fn send_and_close() {
        let (mut client, server) = duplex(64);
        let mut transport = IoTransport::new(server);

        transport.send(b"HTTP/1.1 200 OK\r\n\r\n").await.unwrap();
        transport.close().await.unwrap();

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, b"HTTP/1.1 200 OK\r\n\r\n");
    }

    #[tokio::test]
    async fn send_file_range() {
        let path = std::env::temp_dir().join(format!("micro-h1-send-file-{}", std::process::id()));
        tokio::fs::write(&path, b"0123456789").await.unwrap();

        let (mut client, server) = duplex(64);
        let mut transport = IoTransport::new(server);

        transport.send_file(&path, 2, 5).await.unwrap();
        assert!(transport.send_file(&path, 8, 5).await.is_err());
        transport.close().await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        assert_eq!(&received[..5], b"23456");
    }
}
