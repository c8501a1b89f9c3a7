//! Shared types and constants for the falling-block game.
//!
//! Everything here is plain data with no dependencies, so it can be used by the
//! simulation core, the relay protocol and the terminal front end alike.
//!
//! # Stage Dimensions
//!
//! - **Width**: 12 columns (indexed 0-11)
//! - **Height**: 20 rows (indexed 0-19, row 0 at the top)
//! - **Spawn position**: (`STAGE_WIDTH / 2 - 2`, 0) = (4, 0)
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `BASE_DROP_MS` | 1000 | Automatic drop interval at level 0 |
//! | `SOFT_DROP_INTERVAL_MS` | 30 | Drop interval while the soft-drop key is held |
//! | `LEVEL_DROP_FLOOR_MS` | 200 | Constant added to the per-level interval |
//!
//! # Examples
//!
//! ```
//! use tetris_duel_types::{PieceKind, RotationState, TurnDirection, STAGE_WIDTH};
//!
//! assert_eq!(PieceKind::from_str("t"), Some(PieceKind::T));
//! assert_eq!(
//!     RotationState::Spawn.turned(TurnDirection::CounterClockwise),
//!     RotationState::Left
//! );
//! assert_eq!(STAGE_WIDTH, 12);
//! ```

/// Stage width in cells (12 columns)
pub const STAGE_WIDTH: u8 = 12;

/// Stage height in cells (20 rows)
pub const STAGE_HEIGHT: u8 = 20;

/// Column of the top-left anchor of a freshly spawned piece.
pub const SPAWN_X: i8 = (STAGE_WIDTH / 2) as i8 - 2;

/// Row of the top-left anchor of a freshly spawned piece.
pub const SPAWN_Y: i8 = 0;

/// Fixed frame step of the terminal game loop.
pub const TICK_MS: u32 = 16;

/// Automatic drop interval at level 0.
pub const BASE_DROP_MS: u32 = 1000;

/// Added to `BASE_DROP_MS / (level + 1)` when the level changes.
pub const LEVEL_DROP_FLOOR_MS: u32 = 200;

/// Drop interval while the soft-drop key is held down.
pub const SOFT_DROP_INTERVAL_MS: u32 = 30;

/// Consecutive grounded rotations allowed before rotation is refused.
pub const FLOOR_SPIN_LIMIT: u8 = 10;

/// Total cleared rows that win the game.
pub const WIN_ROWS: u32 = 20;

/// Rows per level step used by the difficulty ramp.
pub const ROWS_PER_LEVEL: u32 = 10;

/// Line clear scoring table, indexed by the number of rows cleared at once.
///
/// Points are multiplied by (level + 1).
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];

/// The seven tetromino kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    /// All kinds, in bag-refill order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Parse a piece kind from its letter (case-insensitive)
    ///
    /// ```
    /// use tetris_duel_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("Z"), Some(PieceKind::Z));
    /// assert_eq!(PieceKind::from_str("x"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "I" => Some(PieceKind::I),
            "J" => Some(PieceKind::J),
            "L" => Some(PieceKind::L),
            "O" => Some(PieceKind::O),
            "S" => Some(PieceKind::S),
            "T" => Some(PieceKind::T),
            "Z" => Some(PieceKind::Z),
            _ => None,
        }
    }

    /// Uppercase letter, as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "I",
            PieceKind::J => "J",
            PieceKind::L => "L",
            PieceKind::O => "O",
            PieceKind::S => "S",
            PieceKind::T => "T",
            PieceKind::Z => "Z",
        }
    }

    /// Display colour as an (r, g, b) triple.
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            PieceKind::I => (80, 227, 230),
            PieceKind::J => (36, 95, 223),
            PieceKind::L => (223, 173, 36),
            PieceKind::O => (223, 217, 36),
            PieceKind::S => (48, 211, 56),
            PieceKind::T => (132, 61, 198),
            PieceKind::Z => (227, 78, 78),
        }
    }
}

/// Direction of a requested turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnDirection {
    /// dir = +1
    Clockwise,
    /// dir = -1
    CounterClockwise,
}

/// SRS rotation states.
///
/// The cycle goes: Spawn → Right → Two → Left → Spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationState {
    /// 0: spawn orientation
    Spawn,
    /// 1: rotated clockwise once
    Right,
    /// 2: rotated 180°
    Two,
    /// 3: rotated counter-clockwise once
    Left,
}

impl RotationState {
    pub fn index(&self) -> u8 {
        match self {
            RotationState::Spawn => 0,
            RotationState::Right => 1,
            RotationState::Two => 2,
            RotationState::Left => 3,
        }
    }

    pub fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => RotationState::Spawn,
            1 => RotationState::Right,
            2 => RotationState::Two,
            _ => RotationState::Left,
        }
    }

    /// `(old + (dir > 0 ? 1 : 3)) mod 4`
    ///
    /// ```
    /// use tetris_duel_types::{RotationState, TurnDirection};
    ///
    /// assert_eq!(RotationState::Left.turned(TurnDirection::Clockwise), RotationState::Spawn);
    /// assert_eq!(RotationState::Right.turned(TurnDirection::CounterClockwise), RotationState::Spawn);
    /// ```
    pub fn turned(&self, dir: TurnDirection) -> Self {
        let step = match dir {
            TurnDirection::Clockwise => 1,
            TurnDirection::CounterClockwise => 3,
        };
        Self::from_index(self.index() + step)
    }
}

/// Status of a stage cell.
///
/// The authoritative stage only ever holds `Empty` and `Settled`; the other two
/// appear only in render overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellStatus {
    #[default]
    Empty,
    /// Merged into the stage by a lock.
    Settled,
    /// Occupied by the active piece.
    Transient,
    /// Drop preview of the active piece.
    Ghost,
}

impl CellStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellStatus::Empty => "empty",
            CellStatus::Settled => "settled",
            CellStatus::Transient => "transient",
            CellStatus::Ghost => "ghost",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "empty" => Some(CellStatus::Empty),
            "settled" => Some(CellStatus::Settled),
            "transient" => Some(CellStatus::Transient),
            "ghost" => Some(CellStatus::Ghost),
            _ => None,
        }
    }
}

/// A single stage cell: `(pieceKind | empty, status)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    pub kind: Option<PieceKind>,
    pub status: CellStatus,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        kind: None,
        status: CellStatus::Empty,
    };

    pub fn settled(kind: PieceKind) -> Self {
        Self {
            kind: Some(kind),
            status: CellStatus::Settled,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.status == CellStatus::Settled
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
    }
}

/// Player and clock inputs understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// One automatic-drop step
    SoftDrop,
    /// Drop to the resting row and lock
    HardDrop,
    /// Rotate 90° clockwise
    RotateCw,
    /// Rotate 90° counter-clockwise
    RotateCcw,
    /// Swap with the hold slot
    Hold,
    /// Start a fresh game
    Restart,
}

impl GameAction {
    /// Parse an action name (case-insensitive)
    ///
    /// ```
    /// use tetris_duel_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("hardDrop"), Some(GameAction::HardDrop));
    /// assert_eq!(GameAction::from_str("nope"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "hold" => Some(GameAction::Hold),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Hold => "hold",
            GameAction::Restart => "restart",
        }
    }
}
