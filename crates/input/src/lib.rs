//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events to [`crate::types::GameAction`] and tracks the
//! held soft-drop key, including terminals that never report key releases.

pub mod map;
pub mod soft_drop;

pub use tetris_duel_types as types;

pub use map::{handle_key_event, is_soft_drop_key, should_quit};
pub use soft_drop::SoftDropLatch;
