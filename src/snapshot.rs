//! Read-only view of a session for renderers and other observers

use crate::board::Cell;
use crate::game::{Game, GamePhase};
use crate::mode::{GameMode, format_clock};
use crate::piece::Piece;
use crate::srs::SpinType;
use crate::tetromino::TetrominoType;
use serde::{Deserialize, Serialize};

/// Active piece as observers see it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceView {
    #[serde(rename = "type")]
    pub piece_type: TetrominoType,
    pub x: i32,
    pub y: i32,
    /// Quarter turns clockwise from spawn, 0..=3
    pub rotation: u8,
}

impl From<&Piece> for PieceView {
    fn from(piece: &Piece) -> Self {
        Self {
            piece_type: piece.piece_type,
            x: piece.x,
            y: piece.y,
            rotation: piece.rotation.index(),
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub mode: GameMode,
    pub paused: bool,
    pub game_over: bool,
    pub time_up: bool,
    /// Rows top to bottom; `None` is an empty cell
    pub board: Vec<Vec<Option<TetrominoType>>>,
    pub current: Option<PieceView>,
    /// Landing row of the current piece
    pub ghost_y: Option<i32>,
    pub next: Option<TetrominoType>,
    pub held: Option<TetrominoType>,
    pub can_hold: bool,
    pub score: u64,
    pub level: u32,
    pub lines: u32,
    pub combo: u32,
    pub spin: SpinType,
    pub perfect_clear: bool,
    pub showing_tetris: bool,
    pub last_lines_cleared: u32,
    /// Sprint seconds left; zero in classic
    pub time_remaining: u32,
    /// `M:SS` countdown, sprint only
    pub clock: Option<String>,
    pub drop_interval_ms: u64,
}

impl Game {
    /// Capture the current state
    pub fn snapshot(&self) -> GameSnapshot {
        let board = self
            .board()
            .rows()
            .map(|row| row.iter().map(Cell::piece).collect())
            .collect();
        let score = self.score();

        GameSnapshot {
            phase: self.phase(),
            mode: self.mode(),
            paused: self.is_paused(),
            game_over: self.is_game_over(),
            time_up: self.is_time_up(),
            board,
            current: self.current_piece().map(PieceView::from),
            ghost_y: self.ghost_y(),
            next: self.next_piece(),
            held: self.held_piece(),
            can_hold: self.can_hold(),
            score: score.points,
            level: score.level,
            lines: score.lines,
            combo: score.combo,
            spin: self.spin(),
            perfect_clear: self.is_perfect_clear(),
            showing_tetris: self.is_showing_tetris(),
            last_lines_cleared: self.last_lines_cleared(),
            time_remaining: self.time_remaining(),
            clock: (self.mode() == GameMode::Sprint).then(|| format_clock(self.time_remaining())),
            drop_interval_ms: self.drop_interval().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bag::{Bag, BagPolicy};
    use crate::board::{BOARD_HEIGHT, BOARD_WIDTH};
    use crate::mode::GameConfig;

    #[test]
    fn test_ready_snapshot() {
        let snapshot = Game::with_seed(3).snapshot();
        assert_eq!(snapshot.phase, GamePhase::Ready);
        assert_eq!(snapshot.board.len(), BOARD_HEIGHT);
        assert!(snapshot.board.iter().all(|row| row.len() == BOARD_WIDTH));
        assert!(snapshot.current.is_none());
        assert!(snapshot.clock.is_none());
        assert_eq!(snapshot.level, 1);
    }

    #[test]
    fn test_playing_snapshot_has_piece_and_ghost() {
        let mut game = Game::with_bag(Bag::with_policy(5, BagPolicy::strict()));
        game.start(GameConfig::sprint(75));
        let snapshot = game.snapshot();

        let current = snapshot.current.unwrap();
        assert_eq!((current.x, current.y, current.rotation), (4, 0, 0));
        assert!(snapshot.ghost_y.unwrap() >= 16);
        assert!(snapshot.next.is_some());
        assert_eq!(snapshot.clock.as_deref(), Some("1:15"));
        assert_eq!(snapshot.drop_interval_ms, 950);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut game = Game::with_seed(11);
        game.start(GameConfig::classic());
        let value = serde_json::to_value(game.snapshot()).unwrap();

        assert_eq!(value["phase"], "playing");
        assert_eq!(value["mode"], "classic");
        assert_eq!(value["spin"], "none");
        assert!(value["board"][0][0].is_null());
        assert!(value["current"]["type"].is_string());

        let back: GameSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(back, game.snapshot());
    }
}
