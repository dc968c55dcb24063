//! TerminalRenderer: flushes a framebuffer to a real terminal.
//!
//! Only cells that changed since the previous frame are rewritten. A size
//! change or [`TerminalRenderer::invalidate`] forces a full redraw.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, QueueableCommand,
};

use crate::fb::{CellStyle, FrameBuffer, Rgb};

pub struct TerminalRenderer {
    stdout: io::Stdout,
    last: Option<FrameBuffer>,
    buf: Vec<u8>,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last: None,
            buf: Vec::with_capacity(16 * 1024),
        }
    }

    /// Raw mode, alternate screen, hidden cursor.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        self.flush_buf()
    }

    /// Undo [`enter`](Self::enter).
    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next draw to be a full redraw (e.g. after a resize event).
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Draw `fb`, then swap it with the previous frame.
    ///
    /// After the call `fb` holds stale contents the caller overwrites next
    /// frame; no per-frame allocation or clone happens.
    pub fn draw_swap(&mut self, fb: &mut FrameBuffer) -> Result<()> {
        self.buf.clear();
        match self.last.take() {
            Some(mut prev) if prev.width() == fb.width() && prev.height() == fb.height() => {
                encode_diff_into(&prev, fb, &mut self.buf)?;
                std::mem::swap(&mut prev, fb);
                self.last = Some(prev);
            }
            _ => {
                encode_full_into(fb, &mut self.buf)?;
                let mut prev = FrameBuffer::new(fb.width(), fb.height());
                std::mem::swap(&mut prev, fb);
                self.last = Some(prev);
            }
        }
        self.flush_buf()
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Tracks the style last emitted so runs of equal style skip the escape codes.
struct StyleWriter<'a> {
    out: &'a mut Vec<u8>,
    current: Option<CellStyle>,
}

impl<'a> StyleWriter<'a> {
    fn new(out: &'a mut Vec<u8>) -> Self {
        Self { out, current: None }
    }

    fn print(&mut self, ch: char, style: CellStyle) -> Result<()> {
        if self.current != Some(style) {
            self.out.queue(SetAttribute(Attribute::Reset))?;
            self.out.queue(SetForegroundColor(rgb_to_color(style.fg)))?;
            self.out.queue(SetBackgroundColor(rgb_to_color(style.bg)))?;
            if style.bold {
                self.out.queue(SetAttribute(Attribute::Bold))?;
            }
            if style.dim {
                self.out.queue(SetAttribute(Attribute::Dim))?;
            }
            self.current = Some(style);
        }
        self.out.queue(Print(ch))?;
        Ok(())
    }

    fn finish(self) -> Result<()> {
        self.out.queue(ResetColor)?;
        self.out.queue(SetAttribute(Attribute::Reset))?;
        Ok(())
    }
}

/// Encode a full-frame redraw into `out` without touching stdout.
pub fn encode_full_into(fb: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let mut w = StyleWriter::new(out);
    for y in 0..fb.height() {
        w.out.queue(cursor::MoveTo(0, y))?;
        for x in 0..fb.width() {
            let cell = fb.get(x, y).unwrap_or_default();
            w.print(cell.ch, cell.style)?;
        }
    }
    w.finish()
}

/// Encode only the runs that differ between `prev` and `next`.
pub fn encode_diff_into(prev: &FrameBuffer, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    let mut w = StyleWriter::new(out);
    for (x, y, len) in changed_runs(prev, next) {
        w.out.queue(cursor::MoveTo(x, y))?;
        for dx in 0..len {
            let cell = next.get(x + dx, y).unwrap_or_default();
            w.print(cell.ch, cell.style)?;
        }
    }
    w.finish()
}

fn rgb_to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Horizontal runs `(x, y, len)` of cells that differ. Frames of different
/// size are entirely dirty.
fn changed_runs(prev: &FrameBuffer, next: &FrameBuffer) -> Vec<(u16, u16, u16)> {
    if prev.width() != next.width() || prev.height() != next.height() {
        return (0..next.height()).map(|y| (0, y, next.width())).collect();
    }

    let mut runs = Vec::new();
    for y in 0..next.height() {
        let mut start: Option<u16> = None;
        for x in 0..next.width() {
            let dirty = prev.get(x, y) != next.get(x, y);
            match (dirty, start) {
                (true, None) => start = Some(x),
                (false, Some(s)) => {
                    runs.push((s, y, x - s));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push((s, y, next.width() - s));
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fb::CellStyle;

    #[test]
    fn changed_runs_coalesce_adjacent_cells() {
        let style = CellStyle::default();
        let a = FrameBuffer::new(6, 2);
        let mut b = FrameBuffer::new(6, 2);
        for x in 1..=3 {
            b.set(x, 0, style.cell('X'));
        }
        b.set(5, 1, style.cell('Y'));

        assert_eq!(changed_runs(&a, &b), vec![(1, 0, 3), (5, 1, 1)]);
        assert!(changed_runs(&b, &b).is_empty());
    }

    #[test]
    fn resized_frame_is_fully_dirty() {
        let a = FrameBuffer::new(2, 1);
        let b = FrameBuffer::new(3, 2);
        assert_eq!(changed_runs(&a, &b), vec![(0, 0, 3), (0, 1, 3)]);
    }

    #[test]
    fn diff_of_identical_frames_only_resets_style() {
        let fb = FrameBuffer::new(4, 2);
        let mut diff = Vec::new();
        encode_diff_into(&fb, &fb, &mut diff).unwrap();
        let mut full = Vec::new();
        encode_full_into(&fb, &mut full).unwrap();
        assert!(diff.len() < full.len());
        assert!(!String::from_utf8_lossy(&diff).contains(' '));
    }

    #[test]
    fn style_converts_to_rgb_color() {
        let style = CellStyle::default();
        assert_eq!(
            rgb_to_color(style.fg),
            Color::Rgb {
                r: 220,
                g: 220,
                b: 220
            }
        );
    }
}
