//! End-to-end tests over real TCP.
//!
//! Starts the server on an ephemeral port with a small payload and drives
//! it with the probe client: heartbeat latency, full download verification,
//! and a client that hangs up mid-transfer.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bulkpipe_api::ApiState;
use bulkpipe_core::PayloadSpec;
use bulkpipe_probe::{download_uri, heartbeat_uri, probe, verify_download, LatencyProbe};
use chrono::{TimeZone, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    async fn start(state: ApiState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(bulkpipe_api::serve(listener, state, async move {
            let _ = rx.await;
        }));

        Self {
            addr,
            shutdown: Some(tx),
            handle,
        }
    }

    fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server should stop")
            .unwrap()
            .unwrap();
    }
}

#[tokio::test]
async fn heartbeat_probe_reports_server_time() {
    let at = Utc.with_ymd_and_hms(2024, 12, 24, 18, 0, 0).unwrap();
    let state = ApiState::new().with_clock(Arc::new(move || at));
    let server = TestServer::start(state).await;

    let uri = heartbeat_uri(&server.base_url()).unwrap();
    let sample = probe(&uri, Duration::from_secs(5)).await.unwrap();

    assert_eq!(sample.server_time, Some(at));
    assert!(sample.rtt < Duration::from_secs(5));

    server.stop().await;
}

#[tokio::test]
async fn latency_probe_collects_samples() {
    let server = TestServer::start(ApiState::new()).await;

    let uri = heartbeat_uri(&server.base_url()).unwrap();
    let latency = LatencyProbe::new(uri, Duration::from_millis(10), Duration::from_secs(5))
        .with_max_probes(3);
    let (_tx, rx) = tokio::sync::watch::channel(false);

    let stats = latency.run(rx).await;

    assert_eq!(stats.samples, 3);
    assert_eq!(stats.failures, 0);
    assert!(stats.min().unwrap() <= stats.max().unwrap());

    server.stop().await;
}

#[tokio::test]
async fn download_arrives_with_declared_length() {
    let spec = PayloadSpec::new(8 * 1024 * 1024 + 3, 1024 * 1024);
    let server = TestServer::start(ApiState::with_payload(spec)).await;

    let uri = download_uri(&server.base_url()).unwrap();
    let report = verify_download(&uri, Duration::from_secs(5)).await.unwrap();

    assert_eq!(report.declared, Some(spec.total_size()));
    assert_eq!(report.received, spec.total_size());

    server.stop().await;
}

#[tokio::test]
async fn raw_response_headers_on_the_wire() {
    let server = TestServer::start(ApiState::with_payload(PayloadSpec::new(25, 10))).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"GET /download HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8(raw).unwrap();

    let (head, body) = text.split_once("\r\n\r\n").unwrap();
    let head = head.to_ascii_lowercase();
    assert!(head.starts_with("http/1.1 200"));
    assert!(head.contains("content-type: application/octet-stream"));
    assert!(head.contains("content-length: 25"));
    assert!(!head.contains("transfer-encoding"));
    assert_eq!(body, "A".repeat(25));

    server.stop().await;
}

#[tokio::test]
async fn client_hangup_does_not_take_down_server() {
    // Large enough that the transfer is still running when the client leaves.
    let spec = PayloadSpec::new(512 * 1024 * 1024, 1024 * 1024);
    let server = TestServer::start(ApiState::with_payload(spec)).await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"GET /download HTTP/1.1\r\nhost: localhost\r\n\r\n")
        .await
        .unwrap();
    let mut buf = vec![0u8; 64 * 1024];
    let n = stream.read(&mut buf).await.unwrap();
    assert!(n > 0);
    drop(stream);

    // Heartbeats keep working after the aborted transfer.
    let uri = heartbeat_uri(&server.base_url()).unwrap();
    probe(&uri, Duration::from_secs(5)).await.unwrap();

    server.stop().await;
}
