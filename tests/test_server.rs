//! End-to-end tests over real TCP sockets

use std::sync::Arc;
use std::time::Duration;

use courier::config::Config;
use courier::files::LocalFileStore;
use courier::http::encoding::ContentCoding;
use courier::router::handlers::app_router;
use courier::server::{Shutdown, serve};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

async fn spawn_server(
    name: &str,
) -> (std::net::SocketAddr, Shutdown, JoinHandle<anyhow::Result<()>>) {
    let dir = std::env::temp_dir().join(format!("courier-server-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("greeting.txt"), b"hello from disk").unwrap();

    let cfg = Config {
        accept_poll_ms: 50,
        directory: dir.clone(),
        ..Config::default()
    };
    let router = Arc::new(app_router(Arc::new(LocalFileStore::new(dir))));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let handle = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { serve(listener, router, &cfg, shutdown).await }
    });

    (addr, shutdown, handle)
}

async fn exchange(addr: std::net::SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    let mut received = Vec::new();
    timeout(WAIT, stream.read_to_end(&mut received)).await.unwrap().unwrap();
    received
}

#[tokio::test]
async fn test_echo_gzip_over_tcp() {
    let (addr, shutdown, handle) = spawn_server("gzip").await;

    let received = exchange(
        addr,
        b"GET /echo/hi HTTP/1.1\r\nAccept-Encoding: gzip\r\nConnection: close\r\n\r\n",
    )
    .await;

    let end = received.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
    let head = String::from_utf8_lossy(&received[..end]).into_owned();
    let body = &received[end + 4..];

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("Content-Type: text/plain"));
    assert!(head.contains("Content-Encoding: gzip"));
    assert!(head.contains(&format!("Content-Length: {}", body.len())));
    assert_eq!(ContentCoding::Gzip.decode(body).unwrap(), b"hi");

    shutdown.trigger();
    timeout(WAIT, handle).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_concurrent_connections_are_independent() {
    let (addr, shutdown, handle) = spawn_server("concurrent").await;

    // A connection that sends garbage must not affect the others.
    let bad = exchange(addr, b"NOT-HTTP\r\n\r\n");
    let file = exchange(addr, b"GET /files/greeting.txt HTTP/1.0\r\n\r\n");
    let ua = exchange(
        addr,
        b"GET /user-agent HTTP/1.1\r\nUser-Agent: test/1.0\r\nConnection: close\r\n\r\n",
    );
    let (bad, file, ua) = tokio::join!(bad, file, ua);

    assert!(bad.is_empty());
    assert!(String::from_utf8_lossy(&file).ends_with("\r\n\r\nhello from disk"));
    assert!(String::from_utf8_lossy(&ua).ends_with("\r\n\r\ntest/1.0"));

    shutdown.trigger();
    timeout(WAIT, handle).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_keep_alive_over_tcp() {
    let (addr, shutdown, handle) = spawn_server("keepalive").await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET /echo/first HTTP/1.1\r\n\r\n").await.unwrap();

    let expected = b"HTTP/1.1 200 OK\r\n\
        Content-Type: text/plain\r\n\
        Connection: keep-alive\r\n\
        Content-Length: 5\r\n\r\nfirst";
    let mut buf = vec![0u8; expected.len()];
    timeout(WAIT, stream.read_exact(&mut buf)).await.unwrap().unwrap();
    assert_eq!(buf, expected);

    stream
        .write_all(b"GET /echo/second HTTP/1.1\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut rest = Vec::new();
    timeout(WAIT, stream.read_to_end(&mut rest)).await.unwrap().unwrap();
    assert!(String::from_utf8_lossy(&rest).ends_with("\r\n\r\nsecond"));

    shutdown.trigger();
    timeout(WAIT, handle).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_accept_loop() {
    let (_addr, shutdown, handle) = spawn_server("shutdown").await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!handle.is_finished());

    shutdown.trigger();
    timeout(WAIT, handle).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_shutdown_before_serve_returns_immediately() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let shutdown = Shutdown::new();
    shutdown.trigger();

    let router = Arc::new(courier::router::Router::new());
    timeout(WAIT, serve(listener, router, &Config::default(), shutdown))
        .await
        .unwrap()
        .unwrap();
}
