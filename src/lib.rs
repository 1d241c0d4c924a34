//! BLOCKFALL - falling-block puzzle engine
//!
//! SRS rotation with wall kicks, T-spin bonuses, combos, perfect clears and
//! timed sprints. [`Game`] is a synchronous state machine; [`driver`] wraps it
//! in a tokio actor for hosts that need timers.

pub mod bag;
pub mod board;
pub mod driver;
pub mod game;
pub mod mode;
pub mod piece;
pub mod score;
pub mod settings;
pub mod snapshot;
pub mod srs;
pub mod tetromino;

pub use bag::{Bag, BagPolicy};
pub use board::{BOARD_HEIGHT, BOARD_WIDTH, Board, Cell};
pub use driver::{Command, DriverHandle, spawn_driver};
pub use game::{Action, Direction, Game, GamePhase, LockInfo};
pub use mode::{GameConfig, GameMode};
pub use piece::Piece;
pub use score::Score;
pub use settings::Settings;
pub use snapshot::{GameSnapshot, PieceView};
pub use srs::SpinType;
pub use tetromino::{Rotation, RotationDirection, TetrominoType};
