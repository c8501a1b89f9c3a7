//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer: views draw into a plain
//! framebuffer, and the renderer flushes only the cells that changed since the
//! previous frame. Board cells are 2 columns wide to keep them roughly square.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use tetris_duel_core as core;
pub use tetris_duel_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{DuelView, GameView, OpponentBoard, Viewport};
pub use renderer::TerminalRenderer;
