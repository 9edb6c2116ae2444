use crate::{ActivePiece, TileColor};

pub type Cell = Option<TileColor>;
pub type Line = [Cell; Board::WIDTH];

/// The playing field. Row `0` is the top row, `y` grows downwards.
///
/// Invariant: there are always exactly `Board::HEIGHT` lines of `Board::WIDTH` cells.
#[derive(Eq, PartialEq, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    lines: Vec<Line>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            lines: vec![Line::default(); Self::HEIGHT],
        }
    }
}

impl Board {
    pub const WIDTH: usize = 10;
    pub const HEIGHT: usize = 20;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Looks up a cell. Coordinates outside the board give `None`.
    pub fn get(&self, x: isize, y: isize) -> Option<Cell> {
        let x = usize::try_from(x).ok().filter(|&x| x < Self::WIDTH)?;
        let y = usize::try_from(y).ok().filter(|&y| y < Self::HEIGHT)?;
        Some(self.lines[y][x])
    }

    /// Whether a cell exists at these coordinates and is empty.
    /// Anything outside the board counts as occupied.
    pub fn is_free(&self, x: isize, y: isize) -> bool {
        matches!(self.get(x, y), Some(None))
    }

    /// Overwrites a single cell, returning `false` if the coordinates are off the board.
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) -> bool {
        match self.lines.get_mut(y).and_then(|line| line.get_mut(x)) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Writes the piece's color into every board cell its matrix covers.
    ///
    /// Does not check for collisions; the caller must have done so. Cells that would
    /// land off the board are skipped.
    pub fn merge(&mut self, piece: &ActivePiece) {
        for (x, y) in piece.tiles() {
            let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
                continue;
            };
            self.set(x, y, Some(piece.color));
        }
    }

    pub fn line_is_full(&self, y: usize) -> bool {
        self.lines
            .get(y)
            .is_some_and(|line| line.iter().all(Option::is_some))
    }

    /// Removes every completely filled line and inserts an empty one at the top for each.
    ///
    /// Returns the indices of the removed lines as they were found, bottom first.
    /// After a removal the same index is checked again, since the line above has
    /// shifted into it.
    pub fn clear_completed_rows(&mut self) -> Vec<usize> {
        let mut cleared = Vec::new();
        let mut shifted = 0;
        let mut y = Self::HEIGHT;
        while y > 0 {
            if self.line_is_full(y - 1) {
                self.lines.remove(y - 1);
                self.lines.insert(0, Line::default());
                cleared.push(y - 1 - shifted);
                shifted += 1;
            } else {
                y -= 1;
            }
        }
        cleared
    }

    pub fn reset(&mut self) {
        for line in self.lines.iter_mut() {
            line.fill(None);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines
            .iter()
            .all(|line| line.iter().all(Option::is_none))
    }
}
