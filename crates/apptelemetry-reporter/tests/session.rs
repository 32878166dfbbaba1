//! Session loop tests over an in-memory WebSocket pair.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::DuplexStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::Role;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use apptelemetry_core::{Category, DimensionKey, TelemetryStore};
use apptelemetry_reporter::app_state::ReporterState;
use apptelemetry_reporter::config::ReporterConfig;
use apptelemetry_reporter::transport::session::run_session;

const AGENT: &str = "session-test/0.1";

struct Harness {
    server: WebSocketStream<DuplexStream>,
    store: Arc<TelemetryStore>,
    session: JoinHandle<apptelemetry_core::Result<()>>,
}

async fn start() -> Harness {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let client = WebSocketStream::from_raw_socket(client_io, Role::Client, None).await;
    let server = WebSocketStream::from_raw_socket(server_io, Role::Server, None).await;

    let mut cfg = ReporterConfig::default();
    cfg.reporter.agent = Some(AGENT.to_string());
    let store = Arc::new(TelemetryStore::new());
    let state = ReporterState::new(cfg, Arc::clone(&store));
    let session = tokio::spawn(run_session(client, state));

    Harness { server, store, session }
}

/// Next data frame from the reporter, skipping control frames.
async fn next_data(server: &mut WebSocketStream<DuplexStream>) -> Vec<u8> {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), server.next())
            .await
            .expect("response in time")
            .expect("stream open")
            .expect("valid frame");
        match msg {
            Message::Binary(b) => return b,
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

#[tokio::test]
async fn get_telemetry_returns_rendered_window() {
    let mut h = start().await;
    let key = DimensionKey::new(Category::Kv, "default", "a.example.com").unwrap();
    h.store.total(&key);

    h.server.send(Message::Binary(vec![0])).await.unwrap();
    let resp = next_data(&mut h.server).await;

    assert_eq!(resp[0], 0);
    let text = std::str::from_utf8(&resp[1..]).unwrap();
    assert!(
        text.starts_with(&format!(
            "sdk_kv_r_total{{agent=\"{AGENT}\",bucket=\"default\",node=\"a.example.com\"}} 1 "
        )),
        "{text}"
    );

    // window was reset
    h.server.send(Message::Binary(vec![0])).await.unwrap();
    assert_eq!(next_data(&mut h.server).await, vec![0]);
}

#[tokio::test]
async fn unknown_and_empty_commands_get_status_one() {
    let mut h = start().await;

    h.server.send(Message::Binary(vec![7])).await.unwrap();
    assert_eq!(next_data(&mut h.server).await, vec![1]);

    h.server.send(Message::Binary(Vec::new())).await.unwrap();
    assert_eq!(next_data(&mut h.server).await, vec![1]);

    // connection stays usable
    h.server.send(Message::Binary(vec![0])).await.unwrap();
    assert_eq!(next_data(&mut h.server).await, vec![0]);
}

#[tokio::test]
async fn ping_is_answered_with_pong() {
    let mut h = start().await;
    h.server.send(Message::Ping(b"hb".to_vec())).await.unwrap();

    let pong = loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), h.server.next())
            .await
            .expect("pong in time")
            .unwrap()
            .unwrap();
        if let Message::Pong(p) = msg {
            break p;
        }
    };
    assert_eq!(pong, b"hb".to_vec());
}

#[tokio::test]
async fn close_ends_session_cleanly() {
    let mut h = start().await;
    h.server.close(None).await.unwrap();

    let res = tokio::time::timeout(Duration::from_secs(5), h.session)
        .await
        .expect("session ends")
        .unwrap();
    assert!(res.is_ok());
}

#[tokio::test]
async fn dropped_peer_ends_session() {
    let h = start().await;
    drop(h.server);

    // an abrupt drop ends the session either cleanly or with a transport error
    tokio::time::timeout(Duration::from_secs(5), h.session)
        .await
        .expect("session ends")
        .unwrap()
        .ok();
}
