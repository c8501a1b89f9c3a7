//! Two-player relay: wire protocol, matchmaking and the TCP server/client.
//!
//! The relay never simulates games. Each player runs its own engine and
//! publishes snapshots; the server pairs connections into rooms and forwards
//! snapshots and win declarations between the two members of a room.
//!
//! # Module Structure
//!
//! - [`protocol`]: line-delimited JSON messages and stage encoding
//! - [`matchmaking`]: waiting slot and room registry, free of I/O
//! - [`server`]: tokio TCP server around the matchmaker
//! - [`client`]: connection used by the terminal front end

pub mod client;
pub mod matchmaking;
pub mod protocol;
pub mod server;

pub use tetris_duel_types as types;

pub use client::{RelayClient, RelayEvents};
pub use matchmaking::{Delivery, Matchmaker};
pub use protocol::{
    parse_client_message, ClientMessage, ProtocolError, ServerMessage, StatePayload, WireStage,
};
pub use server::{check_tcp_listen_available, run_server, ServerConfig};
