//! Scoring and level progression

use crate::srs::SpinType;
use std::time::Duration;

/// Base points by lines cleared in one lock
const LINE_POINTS: [u64; 5] = [0, 100, 300, 500, 800];
/// Spin bonus by lines cleared, before the mini/full multiplier
const SPIN_POINTS: [u64; 4] = [100, 300, 500, 800];
/// Combo multiplier ceiling
const MAX_COMBO_MULTIPLIER: u64 = 10;

pub const LINES_PER_LEVEL: u32 = 10;
const INITIAL_DROP_MS: u64 = 1000;
const DROP_MS_PER_LEVEL: u64 = 50;
const MIN_DROP_MS: u64 = 50;

/// Points for the cleared lines alone, scaled by `level + 1`
pub fn base_score(lines_cleared: u32, level: u32) -> u64 {
    let points = LINE_POINTS.get(lines_cleared as usize).copied().unwrap_or(0);
    points * (level as u64 + 1)
}

/// Bonus once a streak of clearing locks reaches three
pub fn combo_bonus(combo: u32, level: u32) -> u64 {
    if combo < 3 {
        return 0;
    }
    let multiplier = (combo as u64 - 2).min(MAX_COMBO_MULTIPLIER);
    50 * multiplier * level as u64
}

/// Bonus for emptying the whole board
pub fn perfect_clear_bonus(lines_cleared: u32, level: u32) -> u64 {
    1000 * level as u64 + 500 * lines_cleared as u64
}

/// Bonus for locking right after a mini or full spin
pub fn spin_bonus(spin: SpinType, lines_cleared: u32, level: u32) -> u64 {
    let level = level as u64;
    // Halves, so a mini's 0.5 multiplier stays in integers
    let halves = match spin {
        SpinType::None => return 0,
        SpinType::Mini => 1,
        SpinType::Full => 2,
    };
    match lines_cleared {
        0 => 100 * level,
        n => SPIN_POINTS
            .get(n as usize - 1)
            .map_or(0, |points| points * halves * level / 2),
    }
}

/// Everything a lock contributes to the score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockScore {
    pub lines_cleared: u32,
    /// Level before this lock's lines are counted
    pub level: u32,
    /// Streak including this lock
    pub combo: u32,
    /// Classification of the rotation that led to the lock
    pub spin: SpinType,
    pub perfect_clear: bool,
}

impl LockScore {
    /// Total points awarded for the lock
    pub fn points(&self) -> u64 {
        let mut points = base_score(self.lines_cleared, self.level);
        if self.lines_cleared > 0 {
            points += combo_bonus(self.combo, self.level);
        }
        if self.perfect_clear {
            points += perfect_clear_bonus(self.lines_cleared, self.level);
        }
        points + spin_bonus(self.spin, self.lines_cleared, self.level)
    }
}

/// Level reached after clearing `lines` in total
pub fn level_for_lines(lines: u32) -> u32 {
    lines / LINES_PER_LEVEL + 1
}

/// Gravity period for a level, floored at 50ms
pub fn drop_interval(level: u32) -> Duration {
    let ms = INITIAL_DROP_MS
        .saturating_sub(level as u64 * DROP_MS_PER_LEVEL)
        .max(MIN_DROP_MS);
    Duration::from_millis(ms)
}

/// Running score for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
    /// Consecutive locks that cleared at least one line
    pub combo: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0,
            level: 1,
            lines: 0,
            combo: 0,
        }
    }

    /// Apply a lock's result and return the points it earned
    pub fn add_lock(&mut self, lines_cleared: u32, spin: SpinType, perfect_clear: bool) -> u64 {
        self.combo = if lines_cleared > 0 { self.combo + 1 } else { 0 };

        let points = LockScore {
            lines_cleared,
            level: self.level,
            combo: self.combo,
            spin,
            perfect_clear,
        }
        .points();

        self.points += points;
        self.lines += lines_cleared;
        self.level = level_for_lines(self.lines);
        points
    }

    /// Add score for a manual soft drop (1 point per cell)
    pub fn add_soft_drop(&mut self, cells: u32) {
        self.points += cells as u64;
    }

    /// Add score for hard drop (2 points per cell)
    pub fn add_hard_drop(&mut self, cells: u32) {
        self.points += cells as u64 * 2;
    }

    /// Gravity period for the current level
    pub fn drop_interval(&self) -> Duration {
        drop_interval(self.level)
    }
}
