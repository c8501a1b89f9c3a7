//! Tetris Duel (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so binaries, integration
//! tests and benches can write `tetris_duel::{core, relay, ...}`.

pub use tetris_duel_core as core;
pub use tetris_duel_input as input;
pub use tetris_duel_relay as relay;
pub use tetris_duel_term as term;
pub use tetris_duel_types as types;
