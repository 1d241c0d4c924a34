//! Super Rotation System (SRS) wall kick data and spin detection
//!
//! SRS defines the wall kicks attempted when rotating a piece.
//! If a rotation would cause collision, these offsets are tried in order.

use crate::board::Board;
use crate::piece::Piece;
use crate::tetromino::{Rotation, TetrominoType};
use serde::{Deserialize, Serialize};

/// Candidate offset (dx, dy); dy grows downward like board rows
pub type Kick = (i32, i32);

const NO_KICK: &[Kick] = &[(0, 0)];

// Standard SRS tables with the vertical component negated (rows grow down)
const JLSTZ_01: &[Kick] = &[(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)];
const JLSTZ_10: &[Kick] = &[(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)];
const JLSTZ_12: &[Kick] = &[(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)];
const JLSTZ_21: &[Kick] = &[(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)];
const JLSTZ_23: &[Kick] = &[(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)];
const JLSTZ_32: &[Kick] = &[(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)];
const JLSTZ_30: &[Kick] = &[(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)];
const JLSTZ_03: &[Kick] = &[(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)];

const I_01: &[Kick] = &[(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)];
const I_10: &[Kick] = &[(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)];
const I_12: &[Kick] = &[(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)];
const I_21: &[Kick] = &[(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)];
const I_23: &[Kick] = &[(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)];
const I_32: &[Kick] = &[(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)];
const I_30: &[Kick] = &[(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)];
const I_03: &[Kick] = &[(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)];

/// Table key for a transition, e.g. `"0->1"`
pub fn transition_key(from: Rotation, to: Rotation) -> String {
    format!("{}->{}", from.index(), to.index())
}

/// Ordered kick candidates for turning `piece_type` from `from` to `to`.
/// Transitions outside the quarter-turn tables only try in place.
pub fn wall_kicks(piece_type: TetrominoType, from: Rotation, to: Rotation) -> &'static [Kick] {
    let key = (from.index(), to.index());
    match piece_type {
        // O piece doesn't rotate
        TetrominoType::O => NO_KICK,
        TetrominoType::I => match key {
            (0, 1) => I_01,
            (1, 0) => I_10,
            (1, 2) => I_12,
            (2, 1) => I_21,
            (2, 3) => I_23,
            (3, 2) => I_32,
            (3, 0) => I_30,
            (0, 3) => I_03,
            _ => NO_KICK,
        },
        _ => match key {
            (0, 1) => JLSTZ_01,
            (1, 0) => JLSTZ_10,
            (1, 2) => JLSTZ_12,
            (2, 1) => JLSTZ_21,
            (2, 3) => JLSTZ_23,
            (3, 2) => JLSTZ_32,
            (3, 0) => JLSTZ_30,
            (0, 3) => JLSTZ_03,
            _ => NO_KICK,
        },
    }
}

/// Try to turn `piece` to `to`, returning the first placement that fits
pub fn try_rotate(board: &Board, piece: &Piece, to: Rotation) -> Option<Piece> {
    wall_kicks(piece.piece_type, piece.rotation, to)
        .iter()
        .map(|&(dx, dy)| piece.turned(to, dx, dy))
        .find(|candidate| board.is_valid_position(candidate))
}

/// Spin classification of the last rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpinType {
    #[default]
    None,
    Mini,
    Full,
}

impl SpinType {
    pub fn is_spin(&self) -> bool {
        !matches!(self, SpinType::None)
    }
}

/// Classify a T piece that just rotated into place.
///
/// Looks at the four diagonal neighbours of the T's center; walls, floor and
/// ceiling count as filled. With three or more filled, both corners on the
/// stem side make a full spin and one makes a mini.
pub fn classify_spin(board: &Board, piece: &Piece, last_action_was_rotate: bool) -> SpinType {
    if !piece.is_t_piece() || !last_action_was_rotate {
        return SpinType::None;
    }

    let (center_row, center_col) = (piece.y + 1, piece.x + 1);
    let corners = [
        (center_row - 1, center_col - 1), // 0: top-left
        (center_row - 1, center_col + 1), // 1: top-right
        (center_row + 1, center_col - 1), // 2: bottom-left
        (center_row + 1, center_col + 1), // 3: bottom-right
    ];
    let filled = corners.map(|(row, col)| board.get(row, col).is_none_or(|cell| cell.is_filled()));
    let filled_count = filled.iter().filter(|&&f| f).count();
    if filled_count < 3 {
        return SpinType::None;
    }

    let (front_a, front_b) = match piece.rotation {
        Rotation::North => (0, 1), // stem up
        Rotation::East => (1, 3),  // stem right
        Rotation::South => (2, 3), // stem down
        Rotation::West => (0, 2),  // stem left
    };
    match (filled[front_a], filled[front_b]) {
        (true, true) => SpinType::Full,
        (true, false) | (false, true) => SpinType::Mini,
        (false, false) => SpinType::None,
    }
}
