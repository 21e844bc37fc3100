use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use horizon_connector::records::StreamRecord;
use horizon_connector::{ConnectorConfig, RecordHandler, StreamClient, StreamError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const RESPONSE_HEADERS: &str =
    "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\nconnection: close\r\n\r\n";

fn sse_response(body: &str) -> String {
    format!("{RESPONSE_HEADERS}{body}")
}

fn effect_frame(token: u32) -> String {
    format!(
        "data: {{\"id\":\"{token}\",\"paging_token\":\"{token}\",\"account\":\"GACCT\",\
         \"type\":\"account_created\",\"type_i\":0,\"starting_balance\":\"100.0\"}}\n\n"
    )
}

fn operation_frame(token: u32) -> String {
    format!(
        "data: {{\"id\":\"{token}\",\"paging_token\":\"{token}\",\"source_account\":\"GSRC\",\
         \"type\":\"payment\",\"type_i\":1,\"created_at\":\"2017-03-20T19:50:52Z\",\
         \"from\":\"GSRC\",\"to\":\"GDST\",\"amount\":\"5.0\",\"asset_type\":\"native\"}}\n\n"
    )
}

/// Serves one scripted raw response per accepted connection, closing the
/// socket after each, and reports every received request line.
async fn spawn_script(scripts: Vec<String>) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (request_tx, request_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        for response in scripts {
            let (mut socket, _) = listener.accept().await.unwrap();
            request_tx.send(read_request_line(&mut socket).await).ok();
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
    });

    (addr, request_rx)
}

async fn read_request_line(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    while !buf.ends_with(b"\r\n\r\n") {
        if socket.read(&mut byte).await.unwrap() == 0 {
            break;
        }
        buf.push(byte[0]);
    }
    String::from_utf8_lossy(&buf)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}

fn client_for(addr: SocketAddr) -> StreamClient {
    let mut config = ConnectorConfig::default();
    config.horizon.base_url = format!("http://{addr}");
    StreamClient::new(&config).unwrap()
}

/// Records delivered paging tokens; optionally cancels or fails when a
/// given token arrives.
struct Recorder {
    seen: Arc<Mutex<Vec<String>>>,
    cancel_on: Option<(String, CancellationToken)>,
    fail_on: Option<String>,
}

impl Recorder {
    fn new(seen: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            seen,
            cancel_on: None,
            fail_on: None,
        }
    }
}

#[async_trait]
impl<R: StreamRecord> RecordHandler<R> for Recorder {
    async fn on_record(&mut self, record: R) -> anyhow::Result<()> {
        let token = record.paging_token().to_string();
        self.seen.lock().unwrap().push(token.clone());
        if let Some((target, cancel)) = &self.cancel_on {
            if *target == token {
                cancel.cancel();
            }
        }
        if let Some(target) = &self.fail_on {
            if *target == token {
                anyhow::bail!("handler rejected record {token}");
            }
        }
        Ok(())
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Ok(line) = rx.try_recv() {
        lines.push(line);
    }
    lines
}

async fn within<T>(fut: impl std::future::Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(10), fut)
        .await
        .expect("test timed out")
}

#[tokio::test]
async fn delivers_in_order_and_resumes_after_disconnect() {
    // First connection drops after R3 with a partial fourth frame on the
    // wire; the engine must resume from R3's token and never skip or
    // duplicate a record.
    let first = sse_response(&format!(
        "{}{}{}data: {{\"id\":\"4\",\"paging_",
        effect_frame(1),
        effect_frame(2),
        effect_frame(3)
    ));
    let second = sse_response(&format!("{}{}", effect_frame(4), effect_frame(5)));
    let (addr, mut requests) = spawn_script(vec![first, second]).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let cancel = CancellationToken::new();
    let handler = Recorder {
        cancel_on: Some(("5".to_string(), cancel.clone())),
        ..Recorder::new(seen.clone())
    };

    let client = client_for(addr);
    within(client.stream_effects(None, handler, cancel))
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), ["1", "2", "3", "4", "5"]);

    let request_lines = drain(&mut requests);
    assert_eq!(request_lines.len(), 2);
    assert!(request_lines[0].starts_with("GET /effects"));
    assert!(!request_lines[0].contains("cursor="));
    assert!(request_lines[1].contains("cursor=3"));
}

#[tokio::test]
async fn cancellation_after_delivery_returns_ok() {
    let body: String = (1..=5).map(effect_frame).collect();
    let (addr, _requests) = spawn_script(vec![sse_response(&body)]).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let cancel = CancellationToken::new();
    let handler = Recorder {
        cancel_on: Some(("2".to_string(), cancel.clone())),
        ..Recorder::new(seen.clone())
    };

    let client = client_for(addr);
    within(client.stream_effects(None, handler, cancel))
        .await
        .unwrap();

    // Frames 3..5 were already buffered but must not be delivered.
    assert_eq!(*seen.lock().unwrap(), ["1", "2"]);
}

#[tokio::test]
async fn handler_error_aborts_without_reconnect() {
    let body: String = (1..=5).map(effect_frame).collect();
    let (addr, mut requests) = spawn_script(vec![sse_response(&body)]).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let handler = Recorder {
        fail_on: Some("4".to_string()),
        ..Recorder::new(seen.clone())
    };

    let client = client_for(addr);
    let err = within(client.stream_effects(None, handler, CancellationToken::new()))
        .await
        .unwrap_err();

    match err {
        StreamError::Handler(cause) => {
            assert_eq!(cause.to_string(), "handler rejected record 4");
        }
        other => panic!("expected Handler error, got {other:?}"),
    }
    assert_eq!(*seen.lock().unwrap(), ["1", "2", "3", "4"]);
    assert_eq!(drain(&mut requests).len(), 1);
}

#[tokio::test]
async fn missing_paging_token_is_fatal() {
    let body = "data: {\"id\":\"1\",\"type\":\"account_created\",\"type_i\":0}\n\n";
    let (addr, _requests) = spawn_script(vec![sse_response(body)]).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let handler = Recorder::new(seen.clone());

    let client = client_for(addr);
    let err = within(client.stream_effects(None, handler, CancellationToken::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, StreamError::Resumption));
    // The record itself was still delivered before the run stopped.
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn stream_with_no_records_cannot_resume() {
    let (addr, _requests) = spawn_script(vec![sse_response(": keep-alive\n\n")]).await;

    let client = client_for(addr);
    let err = within(client.stream_effects(
        None,
        Recorder::new(Arc::new(Mutex::new(Vec::new()))),
        CancellationToken::new(),
    ))
    .await
    .unwrap_err();

    assert!(matches!(err, StreamError::Resumption));
}

#[tokio::test]
async fn non_success_status_is_fatal() {
    let response =
        "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n".to_string();
    let (addr, _requests) = spawn_script(vec![response]).await;

    let client = client_for(addr);
    let err = within(client.stream_effects(
        None,
        Recorder::new(Arc::new(Mutex::new(Vec::new()))),
        CancellationToken::new(),
    ))
    .await
    .unwrap_err();

    match err {
        StreamError::Status(status) => assert_eq!(status.as_u16(), 404),
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_and_foreign_frames_are_skipped() {
    let body = format!(
        ": keep-alive\n\nevent: open\ndata: {{\"hello\":1}}\n\n{}garbage line\n\n{}",
        effect_frame(1),
        effect_frame(2)
    );
    let (addr, _requests) = spawn_script(vec![sse_response(&body)]).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let cancel = CancellationToken::new();
    let handler = Recorder {
        cancel_on: Some(("2".to_string(), cancel.clone())),
        ..Recorder::new(seen.clone())
    };

    let client = client_for(addr);
    within(client.stream_effects(None, handler, cancel))
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), ["1", "2"]);
}

#[tokio::test]
async fn corrupt_payload_is_fatal() {
    let body = "data: {\"type\":\"trade\",\"paging_token\":\"1\",\"offer_id\":\"oops\"}\n\n";
    let (addr, _requests) = spawn_script(vec![sse_response(body)]).await;

    let client = client_for(addr);
    let err = within(client.stream_effects(
        None,
        Recorder::new(Arc::new(Mutex::new(Vec::new()))),
        CancellationToken::new(),
    ))
    .await
    .unwrap_err();

    assert!(matches!(err, StreamError::Decode(_)));
}

#[tokio::test]
async fn streams_the_operation_family() {
    let body = format!("{}{}", operation_frame(1), operation_frame(2));
    let (addr, mut requests) = spawn_script(vec![sse_response(&body)]).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let cancel = CancellationToken::new();
    let handler = Recorder {
        cancel_on: Some(("2".to_string(), cancel.clone())),
        ..Recorder::new(seen.clone())
    };

    let client = client_for(addr);
    within(client.stream_operations(None, handler, cancel))
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), ["1", "2"]);
    assert!(drain(&mut requests)[0].starts_with("GET /operations"));
}

#[tokio::test]
async fn start_cursor_is_sent_on_the_first_request() {
    let (addr, mut requests) = spawn_script(vec![sse_response(&effect_frame(8))]).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let cancel = CancellationToken::new();
    let handler = Recorder {
        cancel_on: Some(("8".to_string(), cancel.clone())),
        ..Recorder::new(seen.clone())
    };

    let client = client_for(addr);
    within(client.stream_effects(Some("7".into()), handler, cancel))
        .await
        .unwrap();

    assert!(drain(&mut requests)[0].contains("cursor=7"));
}
