//! Core game state and logic
//!
//! [`Game`] is the only thing that mutates a session. Input layers and
//! timers call its action methods; anything that doesn't apply in the
//! current state is ignored rather than reported.

use crate::bag::{Bag, BagPolicy};
use crate::board::Board;
use crate::mode::{GameConfig, GameMode};
use crate::piece::{Piece, SPAWN_ROWS};
use crate::score::Score;
use crate::srs::{self, SpinType};
use crate::tetromino::{RotationDirection, TetrominoType};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    #[default]
    Ready,
    Playing,
    Ended,
}

/// Translation directions for the active piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Down,
}

/// How the active piece last changed; spins only count after a rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastAction {
    Move,
    Rotate,
    Drop,
}

/// Input actions the game can process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCW,
    RotateCCW,
    Hold,
    /// Toggles between paused and running
    Pause,
}

/// What the most recent lock produced, for notification layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockInfo {
    pub piece_type: TetrominoType,
    pub lines_cleared: u32,
    pub points: u64,
    pub spin: SpinType,
    pub perfect_clear: bool,
    /// Four lines at once
    pub tetris: bool,
    pub combo: u32,
}

/// The main game struct
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    /// Current falling piece
    current: Option<Piece>,
    /// Lookahead; always present while playing
    next: Option<TetrominoType>,
    /// Held piece (can swap once per piece)
    hold_piece: Option<TetrominoType>,
    can_hold: bool,
    bag: Bag,
    score: Score,
    phase: GamePhase,
    paused: bool,
    game_over: bool,
    time_up: bool,
    /// Config of the running session, reused by restart
    config: Option<GameConfig>,
    mode: GameMode,
    /// Sprint seconds left
    time_remaining: u32,
    last_action: Option<LastAction>,
    spin: SpinType,
    perfect_clear: bool,
    showing_tetris: bool,
    last_lines_cleared: u32,
    /// Result of the last lock
    pub last_lock: Option<LockInfo>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Create an idle game with a randomly seeded bag
    pub fn new() -> Self {
        Self::with_bag(Bag::new())
    }

    /// Create an idle game with a seeded bag, for replays and tests
    pub fn with_seed(seed: u64) -> Self {
        Self::with_bag(Bag::with_seed(seed))
    }

    pub fn with_bag(bag: Bag) -> Self {
        Self {
            board: Board::new(),
            current: None,
            next: None,
            hold_piece: None,
            can_hold: true,
            bag,
            score: Score::new(),
            phase: GamePhase::Ready,
            paused: false,
            game_over: false,
            time_up: false,
            config: None,
            mode: GameMode::Classic,
            time_remaining: 0,
            last_action: None,
            spin: SpinType::None,
            perfect_clear: false,
            showing_tetris: false,
            last_lines_cleared: 0,
            last_lock: None,
        }
    }

    pub fn set_bag_policy(&mut self, policy: BagPolicy) {
        self.bag.set_policy(policy);
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn config(&self) -> Option<GameConfig> {
        self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_piece(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    pub fn next_piece(&self) -> Option<TetrominoType> {
        self.next
    }

    pub fn held_piece(&self) -> Option<TetrominoType> {
        self.hold_piece
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn spin(&self) -> SpinType {
        self.spin
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_time_up(&self) -> bool {
        self.time_up
    }

    pub fn is_perfect_clear(&self) -> bool {
        self.perfect_clear
    }

    pub fn is_showing_tetris(&self) -> bool {
        self.showing_tetris
    }

    pub fn last_lines_cleared(&self) -> u32 {
        self.last_lines_cleared
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// Playing and not paused; the only state that accepts piece input
    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Playing && !self.paused
    }

    /// Gravity period the timer should use at the current level
    pub fn drop_interval(&self) -> Duration {
        self.score.drop_interval()
    }

    /// Row where the active piece would land
    pub fn ghost_y(&self) -> Option<i32> {
        self.current
            .as_ref()
            .map(|piece| self.board.drop_position(piece))
    }

    /// Begin a fresh session; allowed from any phase
    pub fn start(&mut self, config: GameConfig) {
        let config = config.normalized();
        self.clear_session();
        self.bag.reset();
        self.config = Some(config);
        self.mode = config.mode;
        self.time_remaining = config.starting_time();
        self.phase = GamePhase::Playing;
        self.next = Some(self.bag.next());
        info!(mode = config.mode.name(), time_limit = ?config.time_limit, "session started");

        self.spawn_next();
    }

    /// Start again with the same config; ignored if nothing was started
    pub fn restart(&mut self) {
        if let Some(config) = self.config {
            self.start(config);
        }
    }

    /// Drop the session entirely and wait for a new start
    pub fn reset_to_ready(&mut self) {
        self.clear_session();
        self.bag.reset();
        info!("session reset to ready");
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Playing {
            self.paused = false;
        }
    }

    /// Process an input action
    pub fn process_action(&mut self, action: Action) {
        match action {
            Action::MoveLeft => self.move_piece(Direction::Left),
            Action::MoveRight => self.move_piece(Direction::Right),
            Action::SoftDrop => self.move_piece(Direction::Down),
            Action::HardDrop => self.hard_drop(),
            Action::RotateCW => self.rotate_cw(),
            Action::RotateCCW => self.rotate_ccw(),
            Action::Hold => self.hold(),
            Action::Pause if self.paused => self.resume(),
            Action::Pause => self.pause(),
        }
    }

    /// Player move; a blocked move down locks the piece
    pub fn move_piece(&mut self, direction: Direction) {
        self.shift(direction, true);
    }

    /// Timer-driven fall: like a soft drop but scores nothing
    pub fn gravity(&mut self) {
        self.shift(Direction::Down, false);
    }

    pub fn rotate_cw(&mut self) {
        self.rotate(RotationDirection::Clockwise);
    }

    pub fn rotate_ccw(&mut self) {
        self.rotate(RotationDirection::CounterClockwise);
    }

    /// Drop straight to the landing row and lock
    pub fn hard_drop(&mut self) {
        if !self.is_running() {
            return;
        }
        let Some(piece) = self.current.as_mut() else {
            return;
        };

        let landing = self.board.drop_position(piece);
        let distance = landing - piece.y;
        piece.y = landing;
        self.score.add_hard_drop(distance as u32);
        self.last_action = Some(LastAction::Drop);
        self.spin = SpinType::None;
        self.lock_piece();
    }

    /// Stash the active piece, or swap it with the stashed one
    pub fn hold(&mut self) {
        if !self.is_running() || !self.can_hold {
            return;
        }
        let Some(current) = self.current.take() else {
            return;
        };

        self.can_hold = false;
        self.spin = SpinType::None;
        match self.hold_piece.replace(current.piece_type) {
            // Swapped-in piece does not draw from the lookahead
            Some(held) => {
                self.place_spawn(held);
            }
            None => self.spawn_next(),
        }
    }

    /// Feed the sprint countdown; reaching zero ends the session
    pub fn tick_sprint_clock(&mut self, seconds_remaining: u32) {
        if self.mode != GameMode::Sprint || !self.is_running() {
            return;
        }
        self.time_remaining = seconds_remaining;
        if seconds_remaining == 0 {
            self.phase = GamePhase::Ended;
            self.time_up = true;
            self.paused = false;
            info!(score = self.score.points, lines = self.score.lines, "sprint time up");
        }
    }

    /// Hide the four-line notification
    pub fn dismiss_tetris(&mut self) {
        self.showing_tetris = false;
    }

    /// Hide the perfect-clear notification
    pub fn dismiss_perfect_clear(&mut self) {
        self.perfect_clear = false;
    }

    fn shift(&mut self, direction: Direction, manual: bool) {
        if !self.is_running() {
            return;
        }
        let Some(piece) = self.current else {
            return;
        };

        let (dx, dy) = match direction {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
        };
        let moved = piece.shifted(dx, dy);

        if self.board.is_valid_position(&moved) {
            self.current = Some(moved);
            self.last_action = Some(LastAction::Move);
            self.spin = SpinType::None;
            if manual && direction == Direction::Down {
                self.score.add_soft_drop(1);
            }
        } else if direction == Direction::Down {
            self.lock_piece();
        }
    }

    fn rotate(&mut self, direction: RotationDirection) {
        if !self.is_running() {
            return;
        }
        let Some(piece) = self.current else {
            return;
        };

        let target = direction.apply(piece.rotation);
        if let Some(rotated) = srs::try_rotate(&self.board, &piece, target) {
            self.current = Some(rotated);
            self.last_action = Some(LastAction::Rotate);
            self.spin = srs::classify_spin(
                &self.board,
                &rotated,
                self.last_action == Some(LastAction::Rotate),
            );
            if self.spin.is_spin() {
                debug!(spin = ?self.spin, "spin detected");
            }
        }
    }

    /// Put the lookahead into play and draw a new one
    fn spawn_next(&mut self) {
        let Some(next) = self.next else {
            return;
        };
        if self.place_spawn(next) {
            self.next = Some(self.bag.next());
        }
    }

    /// Place a piece at the spawn point, or end the game if it can't fit
    fn place_spawn(&mut self, piece_type: TetrominoType) -> bool {
        let spawned = if self.board.is_topped_out() {
            None
        } else {
            SPAWN_ROWS
                .iter()
                .map(|&y| Piece::spawn(piece_type, y))
                .find(|piece| self.board.is_valid_position(piece))
        };

        match spawned {
            Some(piece) => {
                self.current = Some(piece);
                self.last_action = None;
                self.spin = SpinType::None;
                true
            }
            None => {
                self.current = None;
                self.phase = GamePhase::Ended;
                self.game_over = true;
                self.paused = false;
                info!(
                    piece = ?piece_type,
                    score = self.score.points,
                    lines = self.score.lines,
                    "game over: spawn blocked"
                );
                false
            }
        }
    }

    /// Lock the current piece, score it and spawn the next
    fn lock_piece(&mut self) {
        let Some(piece) = self.current.take() else {
            return;
        };

        let spin = self.spin;
        let (board, lines_cleared) = self.board.place(&piece).clear_lines();
        self.board = board;

        let perfect_clear = lines_cleared > 0 && self.board.is_empty();
        let points = self.score.add_lock(lines_cleared, spin, perfect_clear);
        let tetris = lines_cleared == 4;

        self.perfect_clear = perfect_clear;
        self.showing_tetris = tetris;
        self.last_lines_cleared = lines_cleared;
        self.can_hold = true;
        self.spin = SpinType::None;
        self.last_action = None;
        self.last_lock = Some(LockInfo {
            piece_type: piece.piece_type,
            lines_cleared,
            points,
            spin,
            perfect_clear,
            tetris,
            combo: self.score.combo,
        });

        if lines_cleared > 0 {
            debug!(
                lines_cleared,
                points,
                ?spin,
                perfect_clear,
                combo = self.score.combo,
                level = self.score.level,
                "lines cleared"
            );
        }

        self.spawn_next();
    }

    /// Everything except the bag back to a pre-start state
    fn clear_session(&mut self) {
        *self = Self::with_bag(self.bag.clone());
    }
}
