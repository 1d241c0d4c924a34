//! Active falling piece

use crate::board::BOARD_WIDTH;
use crate::tetromino::{Rotation, TetrominoType};

/// Column of the bounding box's left edge at spawn
pub const SPAWN_X: i32 = BOARD_WIDTH as i32 / 2 - 1;
/// Preferred spawn row, with one fallback row above it
pub const SPAWN_ROWS: [i32; 2] = [0, -1];

/// An active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    /// The type of tetromino
    pub piece_type: TetrominoType,
    /// Current rotation state
    pub rotation: Rotation,
    /// Column of the bounding box's left edge
    pub x: i32,
    /// Row of the bounding box's top edge; row 0 is the top of the board
    /// and may go negative while the piece is above it
    pub y: i32,
}

impl Piece {
    /// Create a piece in spawn orientation at the given row
    pub fn spawn(piece_type: TetrominoType, y: i32) -> Self {
        Self {
            piece_type,
            rotation: Rotation::North,
            x: SPAWN_X,
            y,
        }
    }

    /// Absolute (row, col) of every block
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let (x, y) = (self.x, self.y);
        let shape = self.piece_type.shape(self.rotation);
        let offsets: Vec<_> = shape.offsets().collect();
        offsets.into_iter().map(move |(dr, dc)| (y + dr, x + dc))
    }

    /// Copy of this piece moved by (dx, dy)
    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Copy of this piece turned to `rotation` and moved by (dx, dy)
    pub fn turned(&self, rotation: Rotation, dx: i32, dy: i32) -> Self {
        Self {
            rotation,
            ..self.shifted(dx, dy)
        }
    }

    /// Check if this is a T piece (for spin detection)
    pub fn is_t_piece(&self) -> bool {
        matches!(self.piece_type, TetrominoType::T)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_position() {
        let piece = Piece::spawn(TetrominoType::T, 0);
        assert_eq!((piece.x, piece.y), (4, 0));
        assert_eq!(piece.rotation, Rotation::North);
    }

    #[test]
    fn test_cells_follow_anchor() {
        let piece = Piece::spawn(TetrominoType::I, 0);
        let cells: Vec<_> = piece.cells().collect();
        assert_eq!(cells, vec![(1, 4), (1, 5), (1, 6), (1, 7)]);

        let moved: Vec<_> = piece.shifted(-4, 3).cells().collect();
        assert_eq!(moved, vec![(4, 0), (4, 1), (4, 2), (4, 3)]);
    }

    #[test]
    fn test_turned_keeps_type() {
        let piece = Piece::spawn(TetrominoType::L, 0).turned(Rotation::South, 1, 2);
        assert_eq!(piece.piece_type, TetrominoType::L);
        assert_eq!(piece.rotation, Rotation::South);
        assert_eq!((piece.x, piece.y), (SPAWN_X + 1, 2));
    }
}
