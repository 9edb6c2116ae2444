use std::fmt;

#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TileColor {
    Background,
    Blue,
    Purple,
    Green,
    Red,
    Pink,
    Brown,
    Yellow,
}

#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tetromino {
    I,
    S,
    Z,
    O,
    T,
    J,
    L,
}

/// Rectangular matrix of filled/empty cells, stored row by row.
///
/// A `Shape` is always owned by whoever holds it. Rotating produces a new matrix,
/// so the catalog templates can never be altered through an active piece.
#[derive(Eq, PartialEq, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape {
    rows: Vec<Vec<bool>>,
}

#[rustfmt::skip]
const TEMPLATES: [(&[&[u8]], TileColor); 7] = [
    (&[&[1, 1, 1, 1]],             TileColor::Blue),   // ▀▀▀▀
    (&[&[0, 1, 1], &[1, 1, 0]],    TileColor::Purple), // ▄█▀
    (&[&[1, 1, 0], &[0, 1, 1]],    TileColor::Green),  // ▀█▄
    (&[&[1, 1], &[1, 1]],          TileColor::Red),    // ██
    (&[&[0, 1, 0], &[1, 1, 1]],    TileColor::Pink),   // ▄█▄
    (&[&[1, 1, 1], &[0, 0, 1]],    TileColor::Brown),  // ▀▀█
    (&[&[1, 1, 1], &[1, 0, 0]],    TileColor::Yellow), // █▀▀
];

impl Tetromino {
    pub const ALL: [Tetromino; 7] = [
        Tetromino::I,
        Tetromino::S,
        Tetromino::Z,
        Tetromino::O,
        Tetromino::T,
        Tetromino::J,
        Tetromino::L,
    ];

    const fn index(&self) -> usize {
        match self {
            Tetromino::I => 0,
            Tetromino::S => 1,
            Tetromino::Z => 2,
            Tetromino::O => 3,
            Tetromino::T => 4,
            Tetromino::J => 5,
            Tetromino::L => 6,
        }
    }

    /// A fresh copy of this template's matrix.
    pub fn shape(&self) -> Shape {
        let (rows, _) = TEMPLATES[self.index()];
        Shape::from_rows(rows)
    }

    pub const fn color(&self) -> TileColor {
        TEMPLATES[self.index()].1
    }
}

impl Shape {
    /// Builds a shape from rows of `0`/`1` values. Every row must have the same length.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Self {
        let rows: Vec<Vec<bool>> = rows
            .iter()
            .map(|row| row.as_ref().iter().map(|&v| v != 0).collect())
            .collect();
        debug_assert!(
            rows.windows(2).all(|w| w[0].len() == w[1].len()),
            "shape rows of unequal length"
        );
        Self { rows }
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Offsets `(dx, dy)` of all filled cells, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(dx, &filled)| filled.then_some((dx, dy)))
        })
    }

    /// Quarter turn: transpose, then reverse the row order.
    pub fn rotated(&self) -> Self {
        let rows = (0..self.width())
            .map(|x| self.rows.iter().map(|row| row[x]).collect())
            .rev()
            .collect();
        Self { rows }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&filled| if filled { '#' } else { '.' })
                    .collect::<String>()
            })
            .collect::<Vec<_>>();
        write!(f, "Shape[{}]", lines.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(shape: &Shape) -> usize {
        let mut rotated = shape.rotated();
        let mut turns = 1;
        while &rotated != shape {
            rotated = rotated.rotated();
            turns += 1;
        }
        turns
    }

    #[test]
    fn four_turns_restore_every_template() {
        for tetromino in Tetromino::ALL {
            let shape = tetromino.shape();
            let turned = shape.rotated().rotated().rotated().rotated();
            assert_eq!(turned, shape, "{tetromino:?}");
        }
    }

    #[test]
    fn rotation_period_matches_symmetry() {
        let expected = [
            (Tetromino::I, 2),
            (Tetromino::S, 2),
            (Tetromino::Z, 2),
            (Tetromino::O, 1),
            (Tetromino::T, 4),
            (Tetromino::J, 4),
            (Tetromino::L, 4),
        ];
        for (tetromino, turns) in expected {
            assert_eq!(period(&tetromino.shape()), turns, "{tetromino:?}");
        }
    }

    #[test]
    fn rotation_swaps_dimensions() {
        let bar = Tetromino::I.shape();
        let upright = bar.rotated();
        assert_eq!((bar.width(), bar.height()), (4, 1));
        assert_eq!((upright.width(), upright.height()), (1, 4));

        let t = Tetromino::T.shape().rotated();
        assert_eq!(t, Shape::from_rows(&[[0u8, 1], [1, 1], [0, 1]]));
    }

    #[test]
    fn rotating_a_copy_leaves_template_untouched() {
        let mut shape = Tetromino::L.shape();
        for _ in 0..3 {
            shape = shape.rotated();
        }
        assert_ne!(shape, Tetromino::L.shape());
        assert_eq!(Tetromino::L.shape(), Shape::from_rows(&[[1u8, 1, 1], [1, 0, 0]]));
    }

    #[test]
    fn every_template_has_four_cells_and_own_color() {
        let mut colors = Tetromino::ALL.map(|t| t.color()).to_vec();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), 7);
        assert!(!colors.contains(&TileColor::Background));
        for tetromino in Tetromino::ALL {
            assert_eq!(tetromino.shape().cells().count(), 4, "{tetromino:?}");
        }
    }
}
