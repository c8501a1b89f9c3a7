//! TCP relay server
//!
//! Accepts player connections, pairs them through the [`Matchmaker`] and
//! relays state updates and win declarations inside each room. Uses tokio for
//! async networking: one reader task and one writer task per connection.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, Mutex, RwLock};

use crate::matchmaking::{Delivery, Matchmaker};
use crate::protocol::{parse_client_message, ClientMessage, ServerMessage};

pub type ClientId = usize;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Append every inbound and outbound line to this file.
    pub log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("TETRIS_RELAY_HOST").unwrap_or(defaults.host);
        let port = env::var("TETRIS_RELAY_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let log_path = env::var("TETRIS_RELAY_LOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) });

        Self {
            host,
            port,
            log_path,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

/// Fail fast with `AddrInUse` before starting the async runtime.
pub fn check_tcp_listen_available(host: &str, port: u16) -> std::io::Result<()> {
    let listener = std::net::TcpListener::bind((host, port))?;
    drop(listener);
    Ok(())
}

/// Shared server state
struct ServerState {
    /// Pairing decisions are read-modify-write on the waiting slot.
    matchmaker: Mutex<Matchmaker<ClientId>>,
    clients: RwLock<HashMap<ClientId, mpsc::UnboundedSender<ServerMessage>>>,
}

impl ServerState {
    fn new() -> Self {
        Self {
            matchmaker: Mutex::new(Matchmaker::new()),
            clients: RwLock::new(HashMap::new()),
        }
    }

    async fn dispatch(&self, deliveries: Vec<Delivery<ClientId>>) {
        let clients = self.clients.read().await;
        for Delivery { to, message } in deliveries {
            if let Some(tx) = clients.get(&to) {
                let _ = tx.send(message);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    In,
    Out,
}

type WireLog = mpsc::UnboundedSender<(ClientId, Direction, Vec<u8>)>;

fn spawn_wire_log(path: String) -> WireLog {
    let (tx, mut rx) = mpsc::unbounded_channel::<(ClientId, Direction, Vec<u8>)>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(e) => {
                eprintln!("[Relay] Wire log {} unavailable: {}", path, e);
                return;
            }
        };

        while let Some((client_id, dir, bytes)) = rx.recv().await {
            let arrow = match dir {
                Direction::In => "<-",
                Direction::Out => "->",
            };
            let prefix = format!("{} {} ", client_id, arrow);
            if file.write_all(prefix.as_bytes()).await.is_err()
                || file.write_all(&bytes).await.is_err()
                || file.write_all(b"\n").await.is_err()
            {
                break;
            }
        }

        let _ = file.flush().await;
    });
    tx
}

/// Start the relay server
///
/// `ready_tx` receives the bound address once the listener is up, which lets
/// tests bind port 0.
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let wire_log = config.log_path.clone().map(spawn_wire_log);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let bound = listener.local_addr()?;
    println!("[Relay] TCP server listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new());
    let mut client_id_counter: ClientId = 0;

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        println!("[Relay] Client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let wire_log = wire_log.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, state, wire_log).await {
                eprintln!("[Relay] Client {} error: {}", client_id, e);
            }
            println!("[Relay] Client {} disconnected", client_id);
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: ClientId,
    state: Arc<ServerState>,
    wire_log: Option<WireLog>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    // Channel to send messages to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.clients.write().await.insert(client_id, tx.clone());

    let wire_log_out = wire_log.clone();

    // Spawn task to write messages to client
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if serde_json::to_writer(&mut buf, &msg).is_err() {
                continue;
            }
            if let Some(log) = wire_log_out.as_ref() {
                let _ = log.send((client_id, Direction::Out, buf.clone()));
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    {
        let mut matchmaker = state.matchmaker.lock().await;
        let deliveries = matchmaker.connect(client_id);
        match matchmaker.room_of(client_id) {
            Some(room) => println!("[Relay] Game started in {}", room),
            None => println!("[Relay] Client {} is waiting", client_id),
        }
        state.dispatch(deliveries).await;
    }

    let result = read_loop(&mut reader, client_id, &state, &tx, wire_log.as_ref()).await;

    // Clean up: leave the waiting slot or room, then stop the writer.
    state.matchmaker.lock().await.disconnect(client_id);
    state.clients.write().await.remove(&client_id);

    drop(tx);
    let _ = write_task.await;

    result
}

async fn read_loop<R>(
    reader: &mut BufReader<R>,
    client_id: ClientId,
    state: &ServerState,
    tx: &mpsc::UnboundedSender<ServerMessage>,
    wire_log: Option<&WireLog>,
) -> anyhow::Result<()>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            // Client disconnected
            return Ok(());
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(log) = wire_log {
            let _ = log.send((client_id, Direction::In, trimmed.as_bytes().to_vec()));
        }

        match parse_client_message(trimmed) {
            Ok(ClientMessage::UpdateState(payload)) => {
                let matchmaker = state.matchmaker.lock().await;
                let deliveries = matchmaker.relay_state(client_id, payload);
                state.dispatch(deliveries).await;
            }
            Ok(ClientMessage::PlayerWon) => {
                let matchmaker = state.matchmaker.lock().await;
                let deliveries = matchmaker.declare_win(client_id);
                if !deliveries.is_empty() {
                    println!("[Relay] Client {} won", client_id);
                }
                state.dispatch(deliveries).await;
            }
            Err(e) => {
                eprintln!("[Relay] Client {} sent bad message: {}", client_id, e);
                let _ = tx.send(ServerMessage::error(e.to_string()));
            }
        }
    }
}
