//! Game state module - the single-player engine
//!
//! Ties together the stage, the active piece, the 7-bag, the hold slot, scoring
//! and the drop clock. Every operation is a total state transition: input that
//! arrives outside its valid window (game over, hold already used, floor-spin
//! cap reached, blocked by the stage) is ignored and reported as `false`.
//!
//! Lifecycle: `Idle -> Playing -> (GameOver | Won)`. `start` always resets
//! fully, from any phase.

use crate::clock::DropClock;
use crate::pieces::{resolve_rotation, Piece};
use crate::rng::PieceBag;
use crate::scoring::{drop_interval_ms, level_up_due, line_clear_score};
use crate::snapshot::GameSnapshot;
use crate::stage::{collides, Stage};
use crate::types::{
    GameAction, PieceKind, TurnDirection, BASE_DROP_MS, FLOOR_SPIN_LIMIT, SOFT_DROP_INTERVAL_MS,
    WIN_ROWS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Idle,
    Playing,
    GameOver,
    Won,
}

impl Phase {
    pub fn is_over(&self) -> bool {
        matches!(self, Phase::GameOver | Phase::Won)
    }
}

/// Engine tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Seed of the first bag; later restarts continue the RNG sequence.
    pub seed: u32,
    /// Total cleared rows that win the game. `None` plays until topping out.
    pub win_rows: Option<u32>,
    /// Drop interval right after `start`.
    pub base_drop_ms: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            win_rows: Some(WIN_ROWS),
            base_drop_ms: BASE_DROP_MS,
        }
    }
}

impl EngineConfig {
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameState {
    config: EngineConfig,
    stage: Stage,
    active: Option<Piece>,
    next: Option<PieceKind>,
    bag: PieceBag,
    /// Seed for the bag built by the next `start`.
    next_seed: u32,
    hold: Option<PieceKind>,
    hold_used: bool,
    /// Consecutive rotations attempted while resting on a surface.
    floor_spins: u8,
    score: u32,
    rows_this_level: u32,
    total_rows: u32,
    level: u32,
    phase: Phase,
    /// Interval of the current level; restored when soft drop is released.
    gravity_ms: u32,
    clock: DropClock,
    soft_dropping: bool,
}

impl GameState {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            stage: Stage::new(),
            active: None,
            next: None,
            bag: PieceBag::new(config.seed),
            next_seed: config.seed,
            hold: None,
            hold_used: false,
            floor_spins: 0,
            score: 0,
            rows_this_level: 0,
            total_rows: 0,
            level: 0,
            phase: Phase::Idle,
            gravity_ms: config.base_drop_ms,
            clock: DropClock::stopped(),
            soft_dropping: false,
        }
    }

    /// Reset everything and spawn the first two pieces.
    pub fn start(&mut self) {
        let config = self.config;
        let seed = self.next_seed;
        *self = Self::new(config);
        self.bag = PieceBag::new(seed);

        let current = self.bag.pop();
        self.next = Some(self.bag.pop());
        self.active = Some(Piece::spawn(current));
        self.next_seed = self.bag.seed();

        self.phase = Phase::Playing;
        self.clock = DropClock::new(Some(config.base_drop_ms));
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn game_over(&self) -> bool {
        self.phase.is_over()
    }

    pub fn won(&self) -> bool {
        self.phase == Phase::Won
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn active(&self) -> Option<Piece> {
        self.active
    }

    pub fn next_piece(&self) -> Option<PieceKind> {
        self.next
    }

    pub fn held_piece(&self) -> Option<PieceKind> {
        self.hold
    }

    pub fn floor_spins(&self) -> u8 {
        self.floor_spins
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn rows_cleared(&self) -> u32 {
        self.total_rows
    }

    pub fn rows_this_level(&self) -> u32 {
        self.rows_this_level
    }

    pub fn drop_interval_ms(&self) -> Option<u32> {
        self.clock.interval_ms()
    }

    /// Shift the active piece one column. `dir` is -1 (left) or +1 (right).
    pub fn move_piece(&mut self, dir: i8) -> bool {
        let Some(active) = self.playing_piece() else {
            return false;
        };
        let dx = dir.signum();
        if dx == 0 || collides(&active, &self.stage, (dx, 0)) {
            return false;
        }
        self.active = Some(active.shifted(dx, 0));
        true
    }

    /// One automatic-drop step: ramp the level, then descend or lock.
    pub fn soft_drop_tick(&mut self) -> bool {
        let Some(active) = self.playing_piece() else {
            return false;
        };

        if level_up_due(self.total_rows, self.level) {
            self.level += 1;
            self.rows_this_level = 0;
            self.gravity_ms = drop_interval_ms(self.level);
            if !self.soft_dropping {
                self.clock.reschedule(Some(self.gravity_ms));
            }
        }

        if collides(&active, &self.stage, (0, 1)) {
            self.lock_active(active);
        } else {
            self.active = Some(active.shifted(0, 1));
            self.floor_spins = 0;
        }
        true
    }

    /// Jump to the resting row and lock.
    pub fn hard_drop(&mut self) -> bool {
        let Some(active) = self.playing_piece() else {
            return false;
        };
        let dy = self.stage.drop_distance(&active);
        if dy > 0 {
            self.floor_spins = 0;
        }
        self.lock_active(active.shifted(0, dy));
        true
    }

    /// Rotate through the kick tables, subject to the floor-spin cap.
    pub fn rotate(&mut self, dir: TurnDirection) -> bool {
        let Some(active) = self.playing_piece() else {
            return false;
        };

        if collides(&active, &self.stage, (0, 1)) {
            if self.floor_spins >= FLOOR_SPIN_LIMIT {
                return false;
            }
            self.floor_spins += 1;
        } else {
            self.floor_spins = 0;
        }

        let stage = &self.stage;
        match resolve_rotation(&active, dir, |p, delta| collides(p, stage, delta)) {
            Some(rotated) => {
                self.active = Some(rotated);
                true
            }
            None => false,
        }
    }

    /// Park the active kind, or swap it with the parked one. Once per spawn.
    pub fn hold_piece(&mut self) -> bool {
        let Some(active) = self.playing_piece() else {
            return false;
        };
        if self.hold_used {
            return false;
        }

        match self.hold.replace(active.kind) {
            None => self.spawn_next(),
            Some(held) => self.spawn(held),
        }
        self.hold_used = true;
        true
    }

    /// Advance the drop clock; runs one `soft_drop_tick` when it fires.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if !self.is_playing() {
            return false;
        }
        if self.clock.advance(elapsed_ms) {
            self.soft_drop_tick()
        } else {
            false
        }
    }

    /// Soft-drop key down (fast interval) or up (level interval).
    pub fn set_soft_drop(&mut self, active: bool) {
        if !self.is_playing() || self.soft_dropping == active {
            return;
        }
        self.soft_dropping = active;
        let interval = if active {
            SOFT_DROP_INTERVAL_MS
        } else {
            self.gravity_ms
        };
        self.clock.reschedule(Some(interval));
    }

    /// Override the drop interval; `None` stops the clock.
    pub fn set_drop_interval(&mut self, interval_ms: Option<u32>) {
        if !self.is_playing() {
            return;
        }
        self.clock.reschedule(interval_ms);
    }

    /// End the game from outside, e.g. when the relay reports the match result.
    pub fn finish(&mut self, won: bool) {
        self.end(if won { Phase::Won } else { Phase::GameOver });
    }

    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.move_piece(-1),
            GameAction::MoveRight => self.move_piece(1),
            GameAction::SoftDrop => self.soft_drop_tick(),
            GameAction::HardDrop => self.hard_drop(),
            GameAction::RotateCw => self.rotate(TurnDirection::Clockwise),
            GameAction::RotateCcw => self.rotate(TurnDirection::CounterClockwise),
            GameAction::Hold => self.hold_piece(),
            GameAction::Restart => {
                self.start();
                true
            }
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let stage = match self.playing_piece() {
            Some(active) => self.stage.overlay(&active),
            None => self.stage.clone(),
        };

        GameSnapshot {
            stage,
            score: self.score,
            rows_cleared: self.total_rows,
            level: self.level,
            game_over: self.game_over(),
            won: self.won(),
            drop_interval_ms: self.clock.interval_ms(),
            next_piece: self.next,
            held_piece: self.hold,
            phase: self.phase,
        }
    }

    fn playing_piece(&self) -> Option<Piece> {
        if self.is_playing() {
            self.active
        } else {
            None
        }
    }

    /// Lock sequence for a piece that can no longer descend.
    fn lock_active(&mut self, piece: Piece) {
        // Lock-out: blocked before leaving the spawn row.
        if piece.y < 1 {
            self.active = Some(piece);
            self.end(Phase::GameOver);
            return;
        }

        self.stage.lock(&piece);
        let cleared = self.stage.sweep().len();
        if cleared > 0 {
            self.score += line_clear_score(cleared, self.level);
            self.rows_this_level += cleared as u32;
            self.total_rows += cleared as u32;

            if self
                .config
                .win_rows
                .is_some_and(|target| self.total_rows >= target)
            {
                self.active = None;
                self.end(Phase::Won);
                return;
            }
        }

        self.spawn_next();
    }

    fn spawn_next(&mut self) {
        let kind = match self.next.take() {
            Some(kind) => kind,
            None => self.bag.pop(),
        };
        self.next = Some(self.bag.pop());
        self.hold_used = false;
        self.spawn(kind);
    }

    /// Place a fresh `kind` at the spawn cell; block-out ends the game.
    fn spawn(&mut self, kind: PieceKind) {
        let piece = Piece::spawn(kind);
        self.active = Some(piece);
        self.floor_spins = 0;
        if collides(&piece, &self.stage, (0, 0)) {
            self.end(Phase::GameOver);
        }
    }

    fn end(&mut self, phase: Phase) {
        self.phase = phase;
        self.soft_dropping = false;
        self.clock.reschedule(None);
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
