//! Game board representation and collision detection

use crate::piece::Piece;
use crate::tetromino::TetrominoType;

/// Standard board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// A cell on the board - either empty or filled by a piece type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(TetrominoType),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }

    /// Piece type occupying the cell
    pub fn piece(&self) -> Option<TetrominoType> {
        match self {
            Cell::Empty => None,
            Cell::Filled(piece_type) => Some(*piece_type),
        }
    }
}

/// The game board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    /// Grid stored as [row][col], row 0 is the top
    cells: [[Cell; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    /// Get the cell at (row, col), or None if out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        if !Self::in_bounds(row, col) {
            return None;
        }
        Some(self.cells[row as usize][col as usize])
    }

    /// Set a cell; returns false if out of bounds
    pub fn set(&mut self, row: i32, col: i32, cell: Cell) -> bool {
        if !Self::in_bounds(row, col) {
            return false;
        }
        self.cells[row as usize][col as usize] = cell;
        true
    }

    fn in_bounds(row: i32, col: i32) -> bool {
        (0..BOARD_HEIGHT as i32).contains(&row) && (0..BOARD_WIDTH as i32).contains(&col)
    }

    /// Whether a single block may sit at (row, col). Rows above the board
    /// are open as long as the column is on the board.
    pub fn is_free(&self, row: i32, col: i32) -> bool {
        if col < 0 || col >= BOARD_WIDTH as i32 || row >= BOARD_HEIGHT as i32 {
            return false;
        }
        row < 0 || self.cells[row as usize][col as usize].is_empty()
    }

    /// Whether every block of the piece sits on a free cell
    pub fn is_valid_position(&self, piece: &Piece) -> bool {
        piece.cells().all(|(row, col)| self.is_free(row, col))
    }

    /// Board with the piece stamped in. Blocks above row 0 are dropped.
    pub fn place(&self, piece: &Piece) -> Board {
        let mut board = *self;
        for (row, col) in piece.cells() {
            board.set(row, col, Cell::Filled(piece.piece_type));
        }
        board
    }

    /// Board with every full row removed, and how many were removed
    pub fn clear_lines(&self) -> (Board, u32) {
        let mut board = *self;
        let mut cleared = 0;
        let mut row = BOARD_HEIGHT;

        // Bottom to top; after a removal the same index holds the row that
        // was above it, so it is tested again
        while row > 0 {
            let index = row - 1;
            if board.is_line_full(index) {
                board.cells.copy_within(0..index, 1);
                board.cells[0] = [Cell::Empty; BOARD_WIDTH];
                cleared += 1;
            } else {
                row -= 1;
            }
        }

        (board, cleared)
    }

    /// Lowest row the piece can reach by falling straight down
    pub fn drop_position(&self, piece: &Piece) -> i32 {
        let mut landed = *piece;
        loop {
            let below = landed.shifted(0, 1);
            if !self.is_valid_position(&below) {
                return landed.y;
            }
            landed = below;
        }
    }

    /// Check if a line is completely filled
    fn is_line_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|cell| cell.is_filled())
    }

    /// Check if the board is completely empty (for perfect-clear detection)
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_empty()))
    }

    /// Both of the top two rows hold at least one block
    pub fn is_topped_out(&self) -> bool {
        self.cells[..2]
            .iter()
            .all(|row| row.iter().any(|cell| cell.is_filled()))
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; BOARD_WIDTH]> {
        self.cells.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetromino::Rotation;
    use proptest::prelude::*;

    fn fill_row(board: &mut Board, row: i32, except: &[i32]) {
        for col in 0..BOARD_WIDTH as i32 {
            if !except.contains(&col) {
                board.set(row, col, Cell::Filled(TetrominoType::J));
            }
        }
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert!(board.is_empty());
        assert!(!board.is_topped_out());
    }

    #[test]
    fn test_set_and_get() {
        let mut board = Board::new();
        assert!(board.set(5, 5, Cell::Filled(TetrominoType::Z)));
        assert_eq!(board.get(5, 5), Some(Cell::Filled(TetrominoType::Z)));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut board = Board::new();
        assert_eq!(board.get(-1, 0), None);
        assert_eq!(board.get(0, -1), None);
        assert_eq!(board.get(BOARD_HEIGHT as i32, 0), None);
        assert_eq!(board.get(0, BOARD_WIDTH as i32), None);
        assert!(!board.set(-1, 3, Cell::Filled(TetrominoType::O)));
    }

    #[test]
    fn test_piece_above_board_is_valid() {
        let board = Board::new();
        let piece = Piece::spawn(TetrominoType::I, -5);
        assert!(board.is_valid_position(&piece));
        assert!(!board.is_valid_position(&piece.shifted(-5, 0)));
    }

    #[test]
    fn test_place_drops_blocks_above_board() {
        let board = Board::new();
        // T at y = -1: the stem is above the board, the flat row is on row 0
        let placed = board.place(&Piece::spawn(TetrominoType::T, -1));
        let filled = placed
            .rows()
            .flatten()
            .filter(|cell| cell.is_filled())
            .count();
        assert_eq!(filled, 3);
        assert_eq!(placed.get(0, 4), Some(Cell::Filled(TetrominoType::T)));
        assert!(board.is_empty());
    }

    #[test]
    fn test_clear_single_line() {
        let mut board = Board::new();
        fill_row(&mut board, 19, &[]);
        board.set(18, 0, Cell::Filled(TetrominoType::S));

        let (cleared, lines) = board.clear_lines();
        assert_eq!(lines, 1);
        // The block from row 18 should now be on row 19
        assert_eq!(cleared.get(19, 0), Some(Cell::Filled(TetrominoType::S)));
        assert!(cleared.get(18, 0).unwrap().is_empty());
    }

    #[test]
    fn test_clear_adjacent_and_split_lines() {
        let mut board = Board::new();
        fill_row(&mut board, 19, &[]);
        fill_row(&mut board, 18, &[]);
        fill_row(&mut board, 17, &[3]);
        fill_row(&mut board, 16, &[]);
        board.set(15, 9, Cell::Filled(TetrominoType::L));

        let (cleared, lines) = board.clear_lines();
        assert_eq!(lines, 3);
        assert!(cleared.get(19, 3).unwrap().is_empty());
        assert!(cleared.get(19, 2).unwrap().is_filled());
        assert_eq!(cleared.get(18, 9), Some(Cell::Filled(TetrominoType::L)));
        assert!(cleared.rows().take(18).flatten().all(|c| c.is_empty()));
    }

    #[test]
    fn test_clear_without_full_rows_is_noop() {
        let mut board = Board::new();
        fill_row(&mut board, 19, &[0]);
        fill_row(&mut board, 12, &[9]);
        let (cleared, lines) = board.clear_lines();
        assert_eq!(lines, 0);
        assert_eq!(cleared, board);
    }

    #[test]
    fn test_drop_position() {
        let mut board = Board::new();
        let piece = Piece::spawn(TetrominoType::O, 0);
        assert_eq!(board.drop_position(&piece), 18);

        board.set(10, 5, Cell::Filled(TetrominoType::I));
        assert_eq!(board.drop_position(&piece), 8);
    }

    #[test]
    fn test_topped_out_needs_both_rows() {
        let mut board = Board::new();
        board.set(0, 0, Cell::Filled(TetrominoType::T));
        assert!(!board.is_topped_out());
        board.set(1, 9, Cell::Filled(TetrominoType::T));
        assert!(board.is_topped_out());
    }

    fn any_type() -> impl Strategy<Value = TetrominoType> {
        prop::sample::select(TetrominoType::all().to_vec())
    }

    proptest! {
        #[test]
        fn prop_validity_matches_cell_checks(
            piece_type in any_type(),
            rot in 0u8..4,
            x in -4i32..12,
            y in -6i32..22,
            blocks in prop::collection::vec((0i32..20, 0i32..10), 0..40),
        ) {
            let mut board = Board::new();
            for (row, col) in &blocks {
                board.set(*row, *col, Cell::Filled(TetrominoType::O));
            }
            let piece = Piece { piece_type, rotation: Rotation::from_index(rot), x, y };

            let expected = piece.cells().all(|(row, col)| {
                let in_columns = (0..BOARD_WIDTH as i32).contains(&col);
                let above_bottom = row < BOARD_HEIGHT as i32;
                let unoccupied = row < 0 || !blocks.contains(&(row, col));
                in_columns && above_bottom && unoccupied
            });
            prop_assert_eq!(board.is_valid_position(&piece), expected);
        }

        #[test]
        fn prop_drop_position_is_resting(
            piece_type in any_type(),
            rot in 0u8..4,
            x in 0i32..7,
        ) {
            let piece = Piece { piece_type, rotation: Rotation::from_index(rot), x, y: -2 };
            let board = Board::new();
            prop_assume!(board.is_valid_position(&piece));
            let y = board.drop_position(&piece);
            let landed = Piece { y, ..piece };
            prop_assert!(board.is_valid_position(&landed));
            prop_assert!(!board.is_valid_position(&landed.shifted(0, 1)));
        }
    }
}
