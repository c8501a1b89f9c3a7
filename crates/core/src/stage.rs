//! Stage module - the settled-cell grid
//!
//! The stage is a 12x20 grid stored as a flat row-major array.
//! Coordinates: (x, y) where x ranges 0..11 (left to right), y ranges 0..19
//! (top to bottom).
//!
//! Only `Empty` and `Settled` cells live in the authoritative grid. The
//! active piece and its ghost are painted onto a throwaway copy by
//! [`Stage::overlay`].

use arrayvec::ArrayVec;

use crate::pieces::Piece;
use crate::types::{Cell, CellStatus, STAGE_HEIGHT, STAGE_WIDTH};

const WIDTH: usize = STAGE_WIDTH as usize;
const HEIGHT: usize = STAGE_HEIGHT as usize;

/// Total number of cells on the stage
const STAGE_SIZE: usize = WIDTH * HEIGHT;

/// The settled-cell grid - 12 columns x 20 rows
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Stage {
    cells: [Cell; STAGE_SIZE],
}

/// Does `piece`, shifted by `delta`, leave the stage or overlap a settled cell?
///
/// Coordinates above row 0 count as outside the stage.
pub fn collides(piece: &Piece, stage: &Stage, delta: (i8, i8)) -> bool {
    piece
        .cells_at(delta)
        .any(|(x, y)| stage.get(x, y).map_or(true, |cell| cell.is_settled()))
}

impl Stage {
    /// Create a new empty stage
    pub fn new() -> Self {
        Self {
            cells: [Cell::EMPTY; STAGE_SIZE],
        }
    }

    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= STAGE_WIDTH as i8 || y < 0 || y >= STAGE_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * WIDTH + (x as usize))
    }

    pub fn width(&self) -> u8 {
        STAGE_WIDTH
    }

    pub fn height(&self) -> u8 {
        STAGE_HEIGHT
    }

    /// Cell at (x, y), `None` if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|i| self.cells[i])
    }

    pub fn is_settled(&self, x: i8, y: i8) -> bool {
        self.get(x, y).is_some_and(|c| c.is_settled())
    }

    /// Overwrite a cell. Returns false if out of bounds.
    ///
    /// Intended for building fixtures; gameplay mutates the grid only through
    /// [`Stage::lock`] and [`Stage::sweep`].
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// Row `y` as a slice.
    pub fn row(&self, y: usize) -> &[Cell] {
        &self.cells[y * WIDTH..(y + 1) * WIDTH]
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(WIDTH)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// A row with no empty cell.
    pub fn is_row_full(&self, y: usize) -> bool {
        y < HEIGHT && self.row(y).iter().all(|c| !c.is_empty())
    }

    /// Merge `piece` into the grid.
    ///
    /// Every non-settled cell is reset to empty first; settled cells are never
    /// overwritten. Piece cells outside the grid are dropped.
    pub fn lock(&mut self, piece: &Piece) {
        for cell in self.cells.iter_mut().filter(|c| !c.is_settled()) {
            *cell = Cell::EMPTY;
        }

        for (x, y) in piece.cells() {
            if let Some(i) = Self::index(x, y) {
                if !self.cells[i].is_settled() {
                    self.cells[i] = Cell::settled(piece.kind);
                }
            }
        }
    }

    /// Remove every full row, shifting the rows above down and inserting empty
    /// rows at the top.
    ///
    /// Returns the removed row indices (pre-sweep coordinates, bottom first).
    /// During play a single lock clears at most 4 rows.
    pub fn sweep(&mut self) -> ArrayVec<usize, HEIGHT> {
        let mut cleared = ArrayVec::new();
        let mut write_y = HEIGHT;

        // Two-pointer compaction from the bottom up.
        for read_y in (0..HEIGHT).rev() {
            if self.is_row_full(read_y) {
                cleared.push(read_y);
                continue;
            }
            write_y -= 1;
            if write_y != read_y {
                let src = read_y * WIDTH;
                self.cells.copy_within(src..src + WIDTH, write_y * WIDTH);
            }
        }

        for cell in &mut self.cells[..write_y * WIDTH] {
            *cell = Cell::EMPTY;
        }

        cleared
    }

    /// Rows the piece can fall before it is blocked.
    pub fn drop_distance(&self, piece: &Piece) -> i8 {
        let mut dy = 0;
        while dy < STAGE_HEIGHT as i8 && !collides(piece, self, (0, dy + 1)) {
            dy += 1;
        }
        dy
    }

    /// Render-only copy with the ghost (on empty cells only) and then the
    /// active piece painted on top.
    pub fn overlay(&self, piece: &Piece) -> Stage {
        let mut out = self.clone();
        let ghost_dy = self.drop_distance(piece);

        for (x, y) in piece.cells_at((0, ghost_dy)) {
            if let Some(i) = Self::index(x, y) {
                if out.cells[i].is_empty() {
                    out.cells[i] = Cell {
                        kind: Some(piece.kind),
                        status: CellStatus::Ghost,
                    };
                }
            }
        }

        for (x, y) in piece.cells() {
            if let Some(i) = Self::index(x, y) {
                out.cells[i] = Cell {
                    kind: Some(piece.kind),
                    status: CellStatus::Transient,
                };
            }
        }

        out
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}
