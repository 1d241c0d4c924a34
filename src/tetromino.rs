//! Tetromino definitions and shapes
//!
//! Each of the 7 pieces has one canonical occupancy grid for its spawn
//! state. The other three rotation states are derived by turning that grid
//! clockwise, so the canonical grid is the single source of truth.

use serde::{Deserialize, Serialize};

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TetrominoType {
    I, // long bar
    O, // square
    T,
    S,
    Z,
    J,
    L,
}

impl TetrominoType {
    /// All tetromino types, in bag order before shuffling
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::J,
            TetrominoType::L,
        ]
    }

    /// Pieces allowed as bag duplicates (no S, Z or O)
    pub fn safe() -> [TetrominoType; 4] {
        [
            TetrominoType::I,
            TetrominoType::T,
            TetrominoType::J,
            TetrominoType::L,
        ]
    }

    /// Canonical grid for rotation state 0
    pub fn spawn_shape(&self) -> Shape {
        const X: bool = true;
        const O: bool = false;
        match self {
            TetrominoType::I => Shape::from_rows(&[
                &[O, O, O, O],
                &[X, X, X, X],
                &[O, O, O, O],
                &[O, O, O, O],
            ]),
            TetrominoType::O => Shape::from_rows(&[&[X, X], &[X, X]]),
            TetrominoType::T => Shape::from_rows(&[&[O, X, O], &[X, X, X], &[O, O, O]]),
            TetrominoType::S => Shape::from_rows(&[&[O, X, X], &[X, X, O], &[O, O, O]]),
            TetrominoType::Z => Shape::from_rows(&[&[X, X, O], &[O, X, X], &[O, O, O]]),
            TetrominoType::J => Shape::from_rows(&[&[X, O, O], &[X, X, X], &[O, O, O]]),
            TetrominoType::L => Shape::from_rows(&[&[O, O, X], &[X, X, X], &[O, O, O]]),
        }
    }

    /// Occupancy grid at the given rotation state
    pub fn shape(&self, rotation: Rotation) -> Shape {
        (0..rotation.index()).fold(self.spawn_shape(), |shape, _| shape.rotated_cw())
    }

    /// One-letter tag used in text dumps
    pub fn letter(&self) -> char {
        match self {
            TetrominoType::I => 'I',
            TetrominoType::O => 'O',
            TetrominoType::T => 'T',
            TetrominoType::S => 'S',
            TetrominoType::Z => 'Z',
            TetrominoType::J => 'J',
            TetrominoType::L => 'L',
        }
    }
}

/// Square occupancy grid of side 2, 3 or 4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    size: usize,
    cells: [[bool; 4]; 4],
}

impl Shape {
    fn from_rows(rows: &[&[bool]]) -> Self {
        let mut cells = [[false; 4]; 4];
        for (r, row) in rows.iter().enumerate() {
            cells[r][..row.len()].copy_from_slice(row);
        }
        Self {
            size: rows.len(),
            cells,
        }
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.cells[row][col]
    }

    /// Turn the grid 90° clockwise: `rotated[c][n-1-r] = grid[r][c]`
    pub fn rotated_cw(&self) -> Shape {
        let n = self.size;
        let mut cells = [[false; 4]; 4];
        for r in 0..n {
            for c in 0..n {
                cells[c][n - 1 - r] = self.cells[r][c];
            }
        }
        Shape { size: n, cells }
    }

    /// Offsets (row, col) of every occupied cell, top to bottom
    pub fn offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.size).flat_map(move |r| {
            (0..self.size)
                .filter(move |&c| self.cells[r][c])
                .map(move |c| (r as i32, c as i32))
        })
    }
}

/// Rotation states (using SRS naming convention)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    North, // Spawn state
    East,  // Clockwise from North
    South, // 180 from North
    West,  // Counter-clockwise from North
}

impl Rotation {
    /// Rotate clockwise: North → East → South → West → North
    pub fn cw(&self) -> Rotation {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise: North → West → South → East → North
    pub fn ccw(&self) -> Rotation {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }

    /// Number of clockwise quarter turns from the spawn state
    pub fn index(&self) -> u8 {
        match self {
            Rotation::North => 0,
            Rotation::East => 1,
            Rotation::South => 2,
            Rotation::West => 3,
        }
    }

    pub fn from_index(index: u8) -> Rotation {
        match index % 4 {
            0 => Rotation::North,
            1 => Rotation::East,
            2 => Rotation::South,
            _ => Rotation::West,
        }
    }

    pub fn all() -> [Rotation; 4] {
        [Rotation::North, Rotation::East, Rotation::South, Rotation::West]
    }
}

/// Direction for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    /// Target state when turning from `from` in this direction
    pub fn apply(&self, from: Rotation) -> Rotation {
        match self {
            RotationDirection::Clockwise => from.cw(),
            RotationDirection::CounterClockwise => from.ccw(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_piece_has_four_cells() {
        for piece in TetrominoType::all() {
            for rotation in Rotation::all() {
                assert_eq!(piece.shape(rotation).offsets().count(), 4, "{piece:?} {rotation:?}");
            }
        }
    }

    #[test]
    fn test_four_turns_is_identity() {
        for piece in TetrominoType::all() {
            let shape = piece.spawn_shape();
            let turned = (0..4).fold(shape, |s, _| s.rotated_cw());
            assert_eq!(turned, shape);
        }
    }

    #[test]
    fn test_t_stem_follows_rotation() {
        // Stem is the lone cell outside the flat row of three
        assert!(TetrominoType::T.shape(Rotation::North).is_filled(0, 1));
        assert!(TetrominoType::T.shape(Rotation::East).is_filled(1, 2));
        assert!(TetrominoType::T.shape(Rotation::South).is_filled(2, 1));
        assert!(TetrominoType::T.shape(Rotation::West).is_filled(1, 0));
        assert!(!TetrominoType::T.shape(Rotation::South).is_filled(0, 1));
    }

    #[test]
    fn test_i_piece_turns_vertical() {
        let east = TetrominoType::I.shape(Rotation::East);
        let cols: Vec<_> = east.offsets().map(|(_, c)| c).collect();
        assert_eq!(cols, vec![2, 2, 2, 2]);
    }

    #[test]
    fn test_o_piece_is_rotation_invariant() {
        let north = TetrominoType::O.shape(Rotation::North);
        for rotation in Rotation::all() {
            assert_eq!(TetrominoType::O.shape(rotation), north);
        }
    }

    #[test]
    fn test_rotation_cycle() {
        for rotation in Rotation::all() {
            assert_eq!(rotation.cw().ccw(), rotation);
            assert_eq!(Rotation::from_index(rotation.index()), rotation);
        }
        assert_eq!(RotationDirection::CounterClockwise.apply(Rotation::North), Rotation::West);
    }
}
