//! Highlighted-tile cursor over the level's grid.

use crate::types::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Row-major cursor that wraps around the edges of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCursor {
    rows: usize,
    cols: usize,
    row: usize,
    col: usize,
}

impl GridCursor {
    pub fn new(level: Level) -> Self {
        let (rows, cols) = level.grid();
        Self {
            rows,
            cols,
            row: 0,
            col: 0,
        }
    }

    /// Re-fit to a new level, keeping the position when it still exists.
    pub fn resize(&mut self, level: Level) {
        let (rows, cols) = level.grid();
        self.rows = rows;
        self.cols = cols;
        self.row = self.row.min(rows - 1);
        self.col = self.col.min(cols - 1);
    }

    pub fn index(&self) -> usize {
        self.row * self.cols + self.col
    }

    pub fn position(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn step(&mut self, dir: Direction) {
        match dir {
            Direction::Up => self.row = (self.row + self.rows - 1) % self.rows,
            Direction::Down => self.row = (self.row + 1) % self.rows,
            Direction::Left => self.col = (self.col + self.cols - 1) % self.cols,
            Direction::Right => self.col = (self.col + 1) % self.cols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_wrap_around() {
        let mut c = GridCursor::new(Level::One);
        c.step(Direction::Left);
        assert_eq!(c.position(), (0, 3));
        assert_eq!(c.index(), 3);
        c.step(Direction::Up);
        assert_eq!(c.position(), (2, 3));
        assert_eq!(c.index(), 11);
        c.step(Direction::Down);
        c.step(Direction::Right);
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn resize_clamps_position() {
        let mut c = GridCursor::new(Level::Four);
        for _ in 0..3 {
            c.step(Direction::Up);
        }
        c.step(Direction::Left);
        assert_eq!(c.position(), (1, 7));

        c.resize(Level::One);
        assert_eq!(c.position(), (1, 3));
        assert_eq!(c.index(), 7);
    }
}
