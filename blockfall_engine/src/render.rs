use crate::{GameState, TileColor};

/// Something a frame can be painted onto, addressed in whole board cells.
pub trait DrawSurface {
    /// Paints the entire surface in one color.
    fn clear(&mut self, color: TileColor);

    fn fill_cell(&mut self, x: isize, y: isize, color: TileColor);
}

/// Paints the background, then the landed cells, then the active piece on top.
pub fn render(state: &GameState, surface: &mut impl DrawSurface) {
    surface.clear(TileColor::Background);
    for (y, line) in state.board.lines().iter().enumerate() {
        for (x, cell) in line.iter().enumerate() {
            if let Some(color) = cell {
                surface.fill_cell(x as isize, y as isize, *color);
            }
        }
    }
    let piece = &state.active_piece;
    for (x, y) in piece.tiles() {
        surface.fill_cell(x, y, piece.color);
    }
}
