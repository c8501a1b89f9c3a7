//! GameView: maps a [`GameSnapshot`] (and, in a match, the opponent's last
//! reported board) into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{GameSnapshot, Phase, ShapeMatrix, Stage};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{CellStatus, PieceKind, STAGE_HEIGHT, STAGE_WIDTH};

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const PANEL_W: u16 = 14;
const GAP: u16 = 2;

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// The opponent's board as last reported through the relay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpponentBoard {
    pub stage: Stage,
    pub score: u32,
    pub rows: u32,
    pub game_over: bool,
}

/// Match state shown next to the local board in multiplayer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DuelView {
    /// Connected but not yet paired.
    pub waiting: bool,
    pub opponent: Option<OpponentBoard>,
}

pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self { cell_w, cell_h }
    }

    fn frame_size(&self) -> (u16, u16) {
        (
            (STAGE_WIDTH as u16) * self.cell_w + 2,
            (STAGE_HEIGHT as u16) * self.cell_h + 2,
        )
    }

    /// Render into a fresh framebuffer.
    pub fn render(
        &self,
        snap: &GameSnapshot,
        duel: Option<&DuelView>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(&mut fb, snap, duel, viewport);
        fb
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        duel: Option<&DuelView>,
        viewport: Viewport,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let (frame_w, frame_h) = self.frame_size();
        let mut total_w = frame_w + GAP + PANEL_W;
        if duel.is_some() {
            total_w += GAP + frame_w;
        }

        let start_x = viewport.width.saturating_sub(total_w) / 2;
        let start_y = viewport.height.saturating_sub(frame_h) / 2;

        self.draw_stage(fb, start_x, start_y, &snap.stage);

        let panel_x = start_x + frame_w + GAP;
        self.draw_side_panel(fb, snap, duel, panel_x, start_y);

        let overlay = match snap.phase {
            Phase::Won => Some("YOU WON!"),
            Phase::GameOver => Some("GAME OVER"),
            Phase::Idle if duel.is_some_and(|d| d.waiting) => Some("WAITING FOR OPPONENT"),
            Phase::Idle => Some("PRESS R TO START"),
            Phase::Playing => None,
        };
        if let Some(text) = overlay {
            self.draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, text);
        }

        if let Some(duel) = duel {
            let opp_x = panel_x + PANEL_W + GAP;
            match &duel.opponent {
                Some(opponent) => {
                    self.draw_stage(fb, opp_x, start_y, &opponent.stage);
                    if opponent.game_over {
                        self.draw_overlay_text(fb, opp_x, start_y, frame_w, frame_h, "TOPPED OUT");
                    }
                }
                None => {
                    self.draw_stage(fb, opp_x, start_y, &Stage::new());
                    let text = if duel.waiting { "NO OPPONENT YET" } else { "NO DATA" };
                    self.draw_overlay_text(fb, opp_x, start_y, frame_w, frame_h, text);
                }
            }
        }
    }

    /// Framed stage with one glyph per cell status.
    fn draw_stage(&self, fb: &mut FrameBuffer, start_x: u16, start_y: u16, stage: &Stage) {
        let (frame_w, frame_h) = self.frame_size();
        let border = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        fb.fill_rect(
            start_x + 1,
            start_y + 1,
            frame_w - 2,
            frame_h - 2,
            ' ',
            CellStyle::new(Rgb::new(80, 80, 90), BOARD_BG),
        );
        fb.draw_box(start_x, start_y, frame_w, frame_h, border);

        for (y, row) in stage.rows().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                let (ch, style) = match (cell.status, cell.kind) {
                    (CellStatus::Settled, Some(kind)) => ('█', piece_style(kind)),
                    (CellStatus::Transient, Some(kind)) => ('█', piece_style(kind).bold()),
                    (CellStatus::Ghost, Some(kind)) => (
                        '░',
                        CellStyle::new(Rgb::from(kind.color()).dimmed(), BOARD_BG).dim(),
                    ),
                    _ => ('·', CellStyle::new(Rgb::new(90, 90, 100), BOARD_BG).dim()),
                };
                let px = start_x + 1 + (x as u16) * self.cell_w;
                let py = start_y + 1 + (y as u16) * self.cell_h;
                fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
            }
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        duel: Option<&DuelView>,
        panel_x: u16,
        start_y: u16,
    ) {
        if panel_x >= fb.width() {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

        let mut y = start_y;
        for (name, v) in [
            ("SCORE", snap.score),
            ("LEVEL", snap.level),
            ("ROWS", snap.rows_cleared),
        ] {
            fb.put_str(panel_x, y, name, label);
            fb.put_str(panel_x, y + 1, &v.to_string(), value);
            y += 3;
        }

        fb.put_str(panel_x, y, "NEXT", label);
        self.draw_preview(fb, panel_x, y + 1, snap.next_piece);
        y += 6;

        fb.put_str(panel_x, y, "HOLD", label);
        self.draw_preview(fb, panel_x, y + 1, snap.held_piece);
        y += 6;

        if let Some(opponent) = duel.and_then(|d| d.opponent.as_ref()) {
            fb.put_str(panel_x, y, "OPPONENT", label);
            fb.put_str(panel_x, y + 1, &format!("score {}", opponent.score), value);
            fb.put_str(panel_x, y + 2, &format!("rows  {}", opponent.rows), value);
        }
    }

    /// Spawn-orientation shape of `kind`, or a dash for an empty slot.
    fn draw_preview(&self, fb: &mut FrameBuffer, x: u16, y: u16, kind: Option<PieceKind>) {
        let Some(kind) = kind else {
            fb.put_str(x, y, "-", CellStyle::default().dim());
            return;
        };
        for (dx, dy) in ShapeMatrix::spawn(kind).filled() {
            fb.fill_rect(
                x + (dx as u16) * self.cell_w,
                y + (dy as u16) * self.cell_h,
                self.cell_w,
                self.cell_h,
                '█',
                piece_style(kind),
            );
        }
    }

    fn draw_overlay_text(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        frame_h: u16,
        text: &str,
    ) {
        let style = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
        fb.put_str_centered(start_x, frame_w, start_y + frame_h / 2, text, style);
    }
}

fn piece_style(kind: PieceKind) -> CellStyle {
    CellStyle::new(Rgb::from(kind.color()), BOARD_BG)
}
