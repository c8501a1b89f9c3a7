//! Read-only view of the engine handed to renderers and the relay client.

use crate::game_state::Phase;
use crate::stage::Stage;
use crate::types::PieceKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    /// Settled cells with the ghost and active piece painted on top.
    pub stage: Stage,
    pub score: u32,
    /// Total rows cleared since `start`.
    pub rows_cleared: u32,
    pub level: u32,
    /// True after lock-out, block-out or a win.
    pub game_over: bool,
    pub won: bool,
    /// `None` while the drop clock is stopped.
    pub drop_interval_ms: Option<u32>,
    pub next_piece: Option<PieceKind>,
    pub held_piece: Option<PieceKind>,
    pub phase: Phase,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        self.phase == Phase::Playing
    }
}
