//! Pieces module - tetromino shape matrices and SRS rotation
//!
//! Shapes are small square matrices of [`Mino`] cells. Turning a piece is a
//! pure 90° matrix rotation (transpose, then reverse), after which the SRS
//! wall-kick table for the transition is searched for the first offset that
//! does not collide.
//! Reference: https://tetris.wiki/SRS

use crate::types::{PieceKind, RotationState, TurnDirection, SPAWN_X, SPAWN_Y};

/// One cell of a shape matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mino {
    #[default]
    Empty,
    Filled(PieceKind),
}

/// Largest shape matrix side (the I piece).
pub const MAX_SHAPE_SIZE: usize = 4;

/// Square shape matrix of side `size` (2, 3 or 4), stored in a fixed 4x4 array.
///
/// Entries outside `size x size` are always `Mino::Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeMatrix {
    size: usize,
    cells: [[Mino; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl ShapeMatrix {
    /// Build from rows of 0/1 markers.
    fn from_mask(kind: PieceKind, rows: &[&[u8]]) -> Self {
        let mut cells = [[Mino::Empty; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (y, row) in rows.iter().enumerate() {
            for (x, &bit) in row.iter().enumerate() {
                if bit != 0 {
                    cells[y][x] = Mino::Filled(kind);
                }
            }
        }
        Self {
            size: rows.len(),
            cells,
        }
    }

    /// Canonical spawn-orientation matrix for a kind.
    pub fn spawn(kind: PieceKind) -> Self {
        match kind {
            PieceKind::I => Self::from_mask(
                kind,
                &[&[0, 1, 0, 0], &[0, 1, 0, 0], &[0, 1, 0, 0], &[0, 1, 0, 0]],
            ),
            PieceKind::J => Self::from_mask(kind, &[&[0, 1, 0], &[0, 1, 0], &[1, 1, 0]]),
            PieceKind::L => Self::from_mask(kind, &[&[0, 1, 0], &[0, 1, 0], &[0, 1, 1]]),
            PieceKind::O => Self::from_mask(kind, &[&[1, 1], &[1, 1]]),
            PieceKind::S => Self::from_mask(kind, &[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]]),
            PieceKind::T => Self::from_mask(kind, &[&[0, 0, 0], &[1, 1, 1], &[0, 1, 0]]),
            PieceKind::Z => Self::from_mask(kind, &[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]]),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Cell at (x, y) in matrix coordinates; `Empty` outside the matrix.
    pub fn get(&self, x: usize, y: usize) -> Mino {
        if x >= self.size || y >= self.size {
            return Mino::Empty;
        }
        self.cells[y][x]
    }

    /// Offsets `(dx, dy)` of the filled cells, row by row.
    pub fn filled(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        (0..self.size).flat_map(move |y| {
            (0..self.size).filter_map(move |x| match self.cells[y][x] {
                Mino::Filled(_) => Some((x as i8, y as i8)),
                Mino::Empty => None,
            })
        })
    }

    /// Pure 90° rotation: transpose, then reverse each row (clockwise) or
    /// reverse the row order (counter-clockwise).
    pub fn rotated(&self, dir: TurnDirection) -> Self {
        let n = self.size;
        let mut cells = [[Mino::Empty; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (y, row) in cells.iter_mut().enumerate().take(n) {
            for (x, cell) in row.iter_mut().enumerate().take(n) {
                *cell = match dir {
                    TurnDirection::Clockwise => self.cells[n - 1 - x][y],
                    TurnDirection::CounterClockwise => self.cells[x][n - 1 - y],
                };
            }
        }
        Self { size: n, cells }
    }
}

/// A piece instance: kind, shape, rotation state and top-left anchor.
///
/// This is a small `Copy` value, so speculative moves and rotations work on a
/// plain copy and only replace the active piece when they succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: ShapeMatrix,
    pub rotation: RotationState,
    pub x: i8,
    pub y: i8,
}

impl Piece {
    /// Fresh instance at the spawn position in spawn orientation.
    pub fn spawn(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: ShapeMatrix::spawn(kind),
            rotation: RotationState::Spawn,
            x: SPAWN_X,
            y: SPAWN_Y,
        }
    }

    /// Absolute stage coordinates of the filled cells after applying `delta`.
    pub fn cells_at(&self, (dx, dy): (i8, i8)) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.shape
            .filled()
            .map(move |(mx, my)| (self.x + mx + dx, self.y + my + dy))
    }

    /// Absolute stage coordinates of the filled cells.
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.cells_at((0, 0))
    }

    pub fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// SRS wall kick data
/// Each entry is an SRS (dx, dy) offset, dy positive = upward.
/// Order: 0 = unkicked rotation, 1-4 = wall kicks
pub type KickTable = [[(i8, i8); 5]; 8];

/// JLSTZ kick table (shared by J, L, S, T, Z)
pub const JLSTZ_KICKS: KickTable = [
    // 0->1
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // 1->0
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // 1->2
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // 2->1
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // 2->3
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // 3->2
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // 3->0
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // 0->3
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
];

/// I piece kick table
pub const I_KICKS: KickTable = [
    // 0->1
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    // 1->0
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    // 1->2
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    // 2->1
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
    // 2->3
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    // 3->2
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    // 3->0
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
    // 0->3
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
];

/// Row of a kick table for the `"{from}-{to}"` transition.
fn transition_index(from: RotationState, to: RotationState) -> Option<usize> {
    match (from.index(), to.index()) {
        (0, 1) => Some(0),
        (1, 0) => Some(1),
        (1, 2) => Some(2),
        (2, 1) => Some(3),
        (2, 3) => Some(4),
        (3, 2) => Some(5),
        (3, 0) => Some(6),
        (0, 3) => Some(7),
        _ => None,
    }
}

/// Ordered kick candidates for a kind and transition.
///
/// Returns `None` for the O piece, which has no kick data.
pub fn kicks_for(
    kind: PieceKind,
    from: RotationState,
    to: RotationState,
) -> Option<&'static [(i8, i8); 5]> {
    let table = match kind {
        PieceKind::O => return None,
        PieceKind::I => &I_KICKS,
        _ => &JLSTZ_KICKS,
    };
    transition_index(from, to).map(|i| &table[i])
}

/// Resolve a turn request against a collision predicate.
///
/// `collides(candidate, delta)` must report whether `candidate` shifted by
/// `delta` overlaps settled cells or leaves the stage. Kick offsets are tried in
/// order and converted to the downward-positive stage convention `(dx, -dy)`.
/// The O piece is always rejected: it is left untouched rather than spun in
/// place. `None` means the caller keeps its piece unchanged.
pub fn resolve_rotation(
    piece: &Piece,
    dir: TurnDirection,
    collides: impl Fn(&Piece, (i8, i8)) -> bool,
) -> Option<Piece> {
    if piece.kind == PieceKind::O {
        return None;
    }

    let to = piece.rotation.turned(dir);
    let candidate = Piece {
        shape: piece.shape.rotated(dir),
        rotation: to,
        ..*piece
    };

    let kicks = kicks_for(piece.kind, piece.rotation, to)?;
    kicks.iter().find_map(|&(kx, ky)| {
        let delta = (kx, -ky);
        (!collides(&candidate, delta)).then(|| candidate.shifted(delta.0, delta.1))
    })
}
