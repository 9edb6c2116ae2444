use crate::{Board, Shape, Tetromino, TileColor};

pub type Coord = (isize, isize);
pub type Offset = (isize, isize);

/// The piece currently under player control.
///
/// `pos` is the board coordinate of the top-left cell of `shape`.
#[derive(Eq, PartialEq, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActivePiece {
    pub kind: Tetromino,
    pub shape: Shape,
    pub color: TileColor,
    pub pos: Coord,
}

/// Whether any filled cell of `piece` lies off the board or on an occupied cell.
pub fn collides(board: &Board, piece: &ActivePiece) -> bool {
    !piece.fits(board)
}

impl ActivePiece {
    pub fn new(kind: Tetromino, pos: Coord) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            color: kind.color(),
            pos,
        }
    }

    /// Absolute board coordinates of every filled cell.
    pub fn tiles(&self) -> impl Iterator<Item = Coord> + '_ {
        let (x, y) = self.pos;
        self.shape
            .cells()
            .map(move |(dx, dy)| (x + dx as isize, y + dy as isize))
    }

    pub fn fits(&self, board: &Board) -> bool {
        self.tiles().all(|(x, y)| board.is_free(x, y))
    }

    pub fn fits_at(&self, board: &Board, (dx, dy): Offset) -> Option<ActivePiece> {
        let mut new_piece = self.clone();
        new_piece.pos = (self.pos.0 + dx, self.pos.1 + dy);
        new_piece.fits(board).then_some(new_piece)
    }

    /// The piece turned a quarter in place, if it fits there. No kicks are tried.
    pub fn rotated_fits(&self, board: &Board) -> Option<ActivePiece> {
        let new_piece = ActivePiece {
            shape: self.shape.rotated(),
            ..self.clone()
        };
        new_piece.fits(board).then_some(new_piece)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_are_offset_by_position() {
        let piece = ActivePiece::new(Tetromino::S, (4, 0));
        let tiles = piece.tiles().collect::<Vec<_>>();
        assert_eq!(tiles, vec![(5, 0), (6, 0), (4, 1), (5, 1)]);
    }

    #[test]
    fn every_shape_collides_out_of_bounds() {
        let board = Board::new();
        for kind in Tetromino::ALL {
            let piece = ActivePiece::new(kind, (4, 0));
            assert!(!collides(&board, &piece), "{kind:?} at spawn");

            let below = ActivePiece::new(kind, (4, Board::HEIGHT as isize));
            assert!(collides(&board, &below), "{kind:?} below board");

            let left = ActivePiece::new(kind, (-1, 5));
            assert!(collides(&board, &left), "{kind:?} at column -1");

            let right = ActivePiece::new(kind, (Board::WIDTH as isize, 5));
            assert!(collides(&board, &right), "{kind:?} at column width");

            let overhang = Board::WIDTH as isize - piece.shape.width() as isize + 1;
            let right_edge = ActivePiece::new(kind, (overhang, 5));
            assert!(collides(&board, &right_edge), "{kind:?} overhanging right");
        }
    }

    #[test]
    fn collides_with_occupied_cell() {
        let mut board = Board::new();
        board.set(5, 1, Some(TileColor::Red));
        let piece = ActivePiece::new(Tetromino::O, (4, 0));
        assert!(collides(&board, &piece));
        let piece = ActivePiece::new(Tetromino::O, (6, 0));
        assert!(!collides(&board, &piece));
    }

    #[test]
    fn empty_matrix_cells_do_not_collide() {
        let mut board = Board::new();
        // S piece at (4,0) leaves (4,0) empty.
        board.set(4, 0, Some(TileColor::Red));
        let piece = ActivePiece::new(Tetromino::S, (4, 0));
        assert!(!collides(&board, &piece));
    }

    #[test]
    fn collision_check_does_not_mutate() {
        let board = Board::new();
        let piece = ActivePiece::new(Tetromino::J, (-1, 3));
        let (board_before, piece_before) = (board.clone(), piece.clone());
        let _ = collides(&board, &piece);
        assert_eq!(board, board_before);
        assert_eq!(piece, piece_before);
    }

    #[test]
    fn fits_at_rejects_walls() {
        let board = Board::new();
        let piece = ActivePiece::new(Tetromino::I, (0, 0));
        assert!(piece.fits_at(&board, (-1, 0)).is_none());
        let moved = piece.fits_at(&board, (1, 0)).unwrap();
        assert_eq!(moved.pos, (1, 0));
        assert_eq!(piece.pos, (0, 0));
    }

    #[test]
    fn rotation_in_place_only() {
        let board = Board::new();
        // Upright bar against the right wall cannot turn back flat.
        let mut piece = ActivePiece::new(Tetromino::I, (8, 10));
        piece.shape = piece.shape.rotated();
        assert!(piece.fits(&board));
        assert!(piece.rotated_fits(&board).is_none());

        let piece = ActivePiece::new(Tetromino::I, (4, 0));
        let turned = piece.rotated_fits(&board).unwrap();
        assert_eq!((turned.shape.width(), turned.shape.height()), (1, 4));
        assert_eq!(turned.pos, piece.pos);
        assert_eq!(Tetromino::I.shape(), piece.shape);
    }
}
