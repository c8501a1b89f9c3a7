//! Core game logic - pure, deterministic, and testable
//!
//! Everything needed to simulate one player's falling-block game. There are no
//! dependencies on terminals, sockets or wall-clock time; the caller feeds in
//! actions and elapsed milliseconds and reads back a [`GameSnapshot`].
//!
//! # Module Structure
//!
//! - [`stage`]: 12x20 settled-cell grid, collision oracle, lock/sweep, render overlay
//! - [`pieces`]: shape matrices, matrix rotation and the SRS kick resolver
//! - [`rng`]: seedable 7-bag randomizer
//! - [`scoring`]: line-clear table and level interval
//! - [`clock`]: reschedulable single-shot drop timer
//! - [`game_state`]: the engine state machine tying it all together
//!
//! # Game Rules
//!
//! - **7-Bag Randomizer**: every kind appears once per bag of 7
//! - **SRS Rotation**: wall kicks for every kind except O, which never rotates
//! - **Floor spin cap**: at most 10 consecutive rotations while resting on a surface
//! - **No lock delay**: a piece that cannot descend locks on the next drop step
//! - **Hold**: one swap per spawned piece
//! - **Win**: 20 cleared rows end the game with a win
//!
//! # Example
//!
//! ```
//! use tetris_duel_core::{EngineConfig, GameState};
//! use tetris_duel_types::GameAction;
//!
//! let mut game = GameState::new(EngineConfig::with_seed(12345));
//! game.start();
//!
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::HardDrop);
//!
//! let snap = game.snapshot();
//! assert!(!snap.game_over);
//! assert!(snap.stage.cells().iter().any(|c| c.is_settled()));
//! ```

pub mod clock;
pub mod game_state;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod stage;

pub use tetris_duel_types as types;

// Re-export commonly used types for convenience
pub use clock::DropClock;
pub use game_state::{EngineConfig, GameState, Phase};
pub use pieces::{resolve_rotation, Mino, Piece, ShapeMatrix};
pub use rng::{generate_bag, seed_from_time, PieceBag, SimpleRng};
pub use scoring::{drop_interval_ms, line_clear_score};
pub use snapshot::GameSnapshot;
pub use stage::{collides, Stage};
