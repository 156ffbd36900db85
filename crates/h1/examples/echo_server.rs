//! Echoes every request body back to the client.
//!
//! ```text
//! cargo run --example echo_server
//! curl -v --data-binary @Cargo.toml http://127.0.0.1:8080/
//! ```

use bytes::BytesMut;
use http::{Response, StatusCode};
use http_body_util::Full;
use micro_h1::connection::HttpConnection;
use micro_h1::protocol::{HttpError, ReadStatus};
use micro_h1::transport::{IoTransport, Transport};
use tokio::net::TcpListener;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!(port = 8080, "start listening");
    let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
        Ok(tcp_listener) => tcp_listener,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };

    loop {
        let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                continue;
            }
        };

        tokio::spawn(async move {
            let mut connection = HttpConnection::new(IoTransport::new(tcp_stream));
            match echo(&mut connection).await {
                Ok(()) => info!(%remote_addr, "connection finished"),
                Err(e) => error!(%remote_addr, cause = %e, "connection shutdown with error"),
            }
        });
    }
}

async fn echo<T: Transport>(connection: &mut HttpConnection<T>) -> Result<(), HttpError> {
    loop {
        let head = match connection.read_headers().await {
            Ok(Some(head)) => head,
            Ok(None) => return Ok(()),
            Err(e) => {
                connection.send_error(e.status()).await;
                return Err(e);
            }
        };
        info!(method = %head.method(), target = %head.target(), "receive request");

        if head.expects_continue() {
            connection.send_continue().await?;
        }

        let mut body = BytesMut::new();
        loop {
            let (bytes, status) = match connection.read_data(connection.config().length).await {
                Ok(read) => read,
                Err(e) => {
                    connection.send_error(e.status()).await;
                    return Err(e);
                }
            };
            if status == ReadStatus::Done {
                body.extend_from_slice(&bytes);
                break;
            }
            if bytes.is_empty() {
                warn!("client stalled while sending the body");
                connection.send_error(StatusCode::REQUEST_TIMEOUT).await;
                return Ok(());
            }
            body.extend_from_slice(&bytes);
        }

        let response = Response::builder()
            .status(StatusCode::OK)
            .header(http::header::CONTENT_TYPE, "application/octet-stream")
            .body(Full::new(body.freeze()))
            .expect("static response parts are valid");
        connection.send_response(response).await?;

        if !connection.finish().await? {
            return Ok(());
        }
    }
}
