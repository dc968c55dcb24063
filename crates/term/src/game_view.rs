//! GameView: maps a session snapshot into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{GameSnapshot, PairPool, TileSnapshot};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Phase, TileRole, TileState};

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

const TEXT: Rgb = Rgb::new(220, 220, 220);
const MUTED: Rgb = Rgb::new(120, 120, 130);
const HIDDEN_BG: Rgb = Rgb::new(30, 40, 70);
const SELECTED: Rgb = Rgb::new(240, 200, 60);
const MATCHED: Rgb = Rgb::new(90, 200, 110);
const LOST: Rgb = Rgb::new(220, 80, 70);
const CURSOR: Rgb = Rgb::new(255, 255, 255);

const HEADER_ROWS: u16 = 3;
const HELP: &str = "arrows/hjkl move  enter select  r restart  1-4 level  b/i/a difficulty  q quit";

/// Lays tiles out as boxes on the level's grid with a header and status lines.
pub struct GameView {
    /// Tile width in terminal columns, borders included.
    tile_w: u16,
    /// Tile height in terminal rows, borders included.
    tile_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        Self {
            tile_w: 14,
            tile_h: 3,
        }
    }
}

impl GameView {
    pub fn new(tile_w: u16, tile_h: u16) -> Self {
        Self {
            tile_w: tile_w.max(3),
            tile_h: tile_h.max(3),
        }
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        pool: &PairPool,
        cursor: Option<usize>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let (rows, cols) = grid_for(snap);
        let grid_w = (cols as u16).saturating_mul(self.tile_w);
        let grid_h = (rows as u16).saturating_mul(self.tile_h);
        let start_x = viewport.width.saturating_sub(grid_w) / 2;
        let total_h = grid_h.saturating_add(HEADER_ROWS + 4);
        let start_y = viewport.height.saturating_sub(total_h) / 2;

        self.draw_header(fb, snap, start_x, start_y);

        let grid_y = start_y.saturating_add(HEADER_ROWS);
        for tile in &snap.tiles {
            let row = (tile.index / cols) as u16;
            let col = (tile.index % cols) as u16;
            let x = start_x.saturating_add(col.saturating_mul(self.tile_w));
            let y = grid_y.saturating_add(row.saturating_mul(self.tile_h));
            let (face, style) = match face_up_style(tile.state, snap.status.phase) {
                Some(style) => (tile_face(tile, pool), style),
                None => ("?".to_string(), CellStyle::fg(MUTED).on(HIDDEN_BG)),
            };
            self.draw_tile(fb, &face, style, cursor == Some(tile.index), x, y);
        }

        let footer_y = grid_y.saturating_add(grid_h).saturating_add(1);
        self.draw_footer(fb, snap, start_x, footer_y);
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(
        &self,
        snap: &GameSnapshot,
        pool: &PairPool,
        cursor: Option<usize>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, pool, cursor, viewport, &mut fb);
        fb
    }

    fn draw_header(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, x: u16, y: u16) {
        let s = &snap.status;
        let title = CellStyle::fg(TEXT).bold();
        fb.put_str(
            x,
            y,
            &format!(
                "TILE MEMORY  level {}  {}",
                s.level.display_number(),
                s.difficulty.as_str()
            ),
            title,
        );

        let time_style = if s.timer_running && s.time_remaining <= 10 {
            CellStyle::fg(LOST).bold()
        } else {
            CellStyle::fg(TEXT)
        };
        let time = format!("Time: {:>3}s", s.time_remaining);
        fb.put_str(x, y.saturating_add(1), &time, time_style);
        fb.put_str(
            x.saturating_add(time.chars().count() as u16 + 2),
            y.saturating_add(1),
            &format!(
                "Moves: {}  Matches: {}/{}",
                s.moves_made, s.matches_found, s.matches_to_win
            ),
            CellStyle::fg(TEXT),
        );
    }

    fn draw_tile(
        &self,
        fb: &mut FrameBuffer,
        face: &str,
        style: CellStyle,
        under_cursor: bool,
        x: u16,
        y: u16,
    ) {
        let inner_w = self.tile_w - 2;

        let border = if under_cursor {
            CellStyle::fg(CURSOR).bold()
        } else {
            CellStyle::fg(MUTED)
        };

        fb.fill_rect(x.saturating_add(1), y.saturating_add(1), inner_w, self.tile_h - 2, ' ', style);
        fb.draw_box(x, y, self.tile_w, self.tile_h, border);
        fb.put_str_centered(
            x.saturating_add(1),
            y.saturating_add(self.tile_h / 2),
            inner_w,
            face,
            style,
        );
    }

    fn draw_footer(&self, fb: &mut FrameBuffer, snap: &GameSnapshot, x: u16, y: u16) {
        let s = &snap.status;
        fb.put_str(
            x,
            y,
            &format!(
                "Score: {} | Highest score: {}",
                s.score,
                s.best_score.unwrap_or(0)
            ),
            CellStyle::fg(TEXT).bold(),
        );

        let outcome = match s.phase {
            Phase::Loading => Some(("Press 1-4 to load a level", CellStyle::fg(TEXT))),
            Phase::Won => Some(("You matched every pair!", CellStyle::fg(MATCHED).bold())),
            Phase::Lost => Some(("Time's up! Press r to try again", CellStyle::fg(LOST).bold())),
            Phase::Playing => None,
        };
        if let Some((text, style)) = outcome {
            fb.put_str(x, y.saturating_add(1), text, style);
        }

        fb.put_str(x, y.saturating_add(2), HELP, CellStyle::fg(MUTED));
    }
}

/// Style of a face-up tile, or `None` while it is hidden. Once the game is
/// over every revealed tile takes the outcome colour.
fn face_up_style(state: TileState, phase: Phase) -> Option<CellStyle> {
    match (state, phase) {
        (TileState::Hidden, _) => None,
        (_, Phase::Won) => Some(CellStyle::fg(MATCHED).bold()),
        (_, Phase::Lost) => Some(CellStyle::fg(LOST)),
        (TileState::Selected, _) => Some(CellStyle::fg(SELECTED).bold()),
        (TileState::Matched, _) => Some(CellStyle::fg(MATCHED)),
    }
}

/// Grid for the snapshot's level, widened for boards that do not fill it.
fn grid_for(snap: &GameSnapshot) -> (usize, usize) {
    let (rows, cols) = snap.status.level.grid();
    let needed = snap.tiles.len().div_ceil(cols);
    (rows.max(needed), cols)
}

/// Image faces are shown upper-case so the two halves of a pair are
/// distinguishable.
fn tile_face(tile: &TileSnapshot, pool: &PairPool) -> String {
    let name = pool
        .name_of(tile.key)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", tile.key));
    match tile.role {
        TileRole::Image => name.to_uppercase(),
        TileRole::Label => name,
    }
}
