//! Shared utilities for end-to-end tests.

use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a mock application on an ephemeral port.
///
/// - `/ok` answers 200
/// - `/broken` answers 500
/// - `/private` answers 200 only with `x-api-key: let-me-in`, else 401
pub async fn start_mock_app() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let mut read = 0;
                while read < buf.len() {
                    match socket.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => read += n,
                    }
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let request = String::from_utf8_lossy(&buf[..read]).to_ascii_lowercase();
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                let status = match path.as_str() {
                    "/ok" => "200 OK",
                    "/broken" => "500 Internal Server Error",
                    "/private" if request.contains("x-api-key: let-me-in") => "200 OK",
                    "/private" => "401 Unauthorized",
                    _ => "404 Not Found",
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                    status
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
