use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use tetris_duel::core::{EngineConfig, GameState};
use tetris_duel::relay::{run_server, RelayClient, ServerConfig, ServerMessage, StatePayload};

struct TestClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect failed");
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn recv(&mut self) -> serde_json::Value {
        let line = tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .unwrap()
            .expect("connection closed");
        serde_json::from_str(&line).unwrap()
    }

    async fn assert_silent(&mut self) {
        let res = tokio::time::timeout(Duration::from_millis(200), self.lines.next_line()).await;
        assert!(res.is_err(), "unexpected line: {:?}", res);
    }
}

async fn start_server() -> SocketAddr {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        log_path: None,
    };
    let (ready_tx, ready_rx) = oneshot::channel();

    tokio::spawn(async move {
        let _ = run_server(config, Some(ready_tx)).await;
    });

    tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped")
}

/// A connects and waits, then B connects and both get the same room.
async fn paired(addr: SocketAddr) -> (TestClient, TestClient, String) {
    let mut a = TestClient::connect(addr).await;
    assert_eq!(a.recv().await["type"], "waiting");

    let mut b = TestClient::connect(addr).await;
    let start_b = b.recv().await;
    let start_a = a.recv().await;
    assert_eq!(start_a["type"], "start");
    assert_eq!(start_b["type"], "start");
    assert_eq!(start_a["room"], start_b["room"]);

    let room = start_a["room"].as_str().unwrap().to_string();
    (a, b, room)
}

fn update_state_line() -> (String, serde_json::Value) {
    let mut game = GameState::new(EngineConfig::with_seed(99));
    game.start();
    game.hard_drop();
    let payload = StatePayload::from(&game.snapshot());

    let mut msg = serde_json::to_value(&payload).unwrap();
    msg["type"] = "update_state".into();
    (msg.to_string(), serde_json::to_value(&payload).unwrap())
}

#[tokio::test]
async fn test_relay_pairs_first_two_connections() {
    let addr = start_server().await;
    let (_a, _b, room) = paired(addr).await;
    assert!(room.starts_with("room_"));
}

#[tokio::test]
async fn test_relay_forwards_state_to_opponent_only() {
    let addr = start_server().await;
    let (mut a, mut b, _) = paired(addr).await;

    let (line, payload) = update_state_line();
    a.send(&line).await;

    let got = b.recv().await;
    assert_eq!(got["type"], "opponent_state");
    for key in ["stage", "score", "rows", "gameOver"] {
        assert_eq!(got[key], payload[key], "field {key}");
    }

    a.assert_silent().await;
}

#[tokio::test]
async fn test_relay_win_notifies_room_members_only() {
    let addr = start_server().await;
    let (mut a, mut b, _) = paired(addr).await;

    let mut c = TestClient::connect(addr).await;
    assert_eq!(c.recv().await["type"], "waiting");

    a.send(r#"{"type":"player_won"}"#).await;
    assert_eq!(a.recv().await["type"], "game_over_win");
    assert_eq!(b.recv().await["type"], "game_over_lose");
    c.assert_silent().await;
}

#[tokio::test]
async fn test_relay_rejects_malformed_lines_and_stays_open() {
    let addr = start_server().await;
    let mut a = TestClient::connect(addr).await;
    assert_eq!(a.recv().await["type"], "waiting");

    a.send("{not json").await;
    assert_eq!(a.recv().await["type"], "error");

    a.send(r#"{"type":"update_state","stage":[],"score":0,"rows":0,"gameOver":false}"#)
        .await;
    let err = a.recv().await;
    assert_eq!(err["type"], "error");
    assert!(err["message"].as_str().unwrap().contains("20 rows"));

    // Still connected: a second player pairs with us.
    let mut b = TestClient::connect(addr).await;
    assert_eq!(b.recv().await["type"], "start");
    assert_eq!(a.recv().await["type"], "start");
}

#[tokio::test]
async fn test_waiting_player_disconnect_frees_the_slot() {
    let addr = start_server().await;
    let mut a = TestClient::connect(addr).await;
    assert_eq!(a.recv().await["type"], "waiting");
    drop(a);

    // Give the server a moment to observe EOF.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut b = TestClient::connect(addr).await;
    assert_eq!(b.recv().await["type"], "waiting");
}

#[tokio::test]
async fn test_relay_client_round_trip() {
    let addr = start_server().await;

    let (alice, mut alice_events) = RelayClient::connect(addr).await.unwrap();
    let first = tokio::time::timeout(Duration::from_secs(2), alice_events.next_event())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first, Some(ServerMessage::Waiting));

    let (_bob, mut bob_events) = RelayClient::connect(addr).await.unwrap();
    for events in [&mut alice_events, &mut bob_events] {
        let msg = tokio::time::timeout(Duration::from_secs(2), events.next_event())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(msg, Some(ServerMessage::Start { .. })));
    }

    let mut game = GameState::new(EngineConfig::with_seed(4));
    game.start();
    let snap = game.snapshot();
    alice.send_state(&snap).unwrap();

    let msg = tokio::time::timeout(Duration::from_secs(2), bob_events.next_event())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        msg,
        Some(ServerMessage::OpponentState(StatePayload::from(&snap)))
    );

    alice.send_won().unwrap();
    let msg = tokio::time::timeout(Duration::from_secs(2), bob_events.next_event())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(msg, Some(ServerMessage::GameOverLose));
}
