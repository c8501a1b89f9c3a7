//! Relay client
//!
//! Split into a cheap sending handle and an event stream so a game loop can
//! publish snapshots while another task waits for the opponent.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use tetris_duel_core::GameSnapshot;

use crate::protocol::{parse_server_message, ClientMessage, ServerMessage, StatePayload};

/// Sending half. Messages are queued and written by a background task.
#[derive(Debug, Clone)]
pub struct RelayClient {
    tx: mpsc::UnboundedSender<ClientMessage>,
}

/// Receiving half.
#[derive(Debug)]
pub struct RelayEvents {
    lines: Lines<BufReader<OwnedReadHalf>>,
}

impl RelayClient {
    pub async fn connect(addr: SocketAddr) -> anyhow::Result<(RelayClient, RelayEvents)> {
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("failed to connect to relay at {}", addr))?;
        let (read_half, mut write_half) = stream.into_split();

        let (tx, mut rx) = mpsc::unbounded_channel::<ClientMessage>();
        tokio::spawn(async move {
            let mut buf: Vec<u8> = Vec::with_capacity(4096);
            while let Some(msg) = rx.recv().await {
                buf.clear();
                if serde_json::to_writer(&mut buf, &msg).is_err() {
                    continue;
                }
                buf.push(b'\n');
                if write_half.write_all(&buf).await.is_err() {
                    break;
                }
                if write_half.flush().await.is_err() {
                    break;
                }
            }
        });

        Ok((
            RelayClient { tx },
            RelayEvents {
                lines: BufReader::new(read_half).lines(),
            },
        ))
    }

    pub fn send(&self, msg: ClientMessage) -> anyhow::Result<()> {
        self.tx
            .send(msg)
            .map_err(|_| anyhow::anyhow!("relay connection closed"))
    }

    /// Publish the board the opponent should see.
    pub fn send_state(&self, snapshot: &GameSnapshot) -> anyhow::Result<()> {
        self.send(ClientMessage::UpdateState(StatePayload::from(snapshot)))
    }

    pub fn send_won(&self) -> anyhow::Result<()> {
        self.send(ClientMessage::PlayerWon)
    }
}

impl RelayEvents {
    /// Next server message; `Ok(None)` once the server closes the connection.
    pub async fn next_event(&mut self) -> anyhow::Result<Option<ServerMessage>> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let msg = parse_server_message(trimmed)
                .with_context(|| format!("unexpected relay message: {}", trimmed))?;
            return Ok(Some(msg));
        }
    }
}
