//! Game modes: Classic and Sprint

use serde::{Deserialize, Serialize};

/// Sprint length used when none is configured
pub const DEFAULT_SPRINT_SECONDS: u32 = 120;

/// Available game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Classic, // Endless, ends only on top out
    Sprint,  // Ends when the countdown runs out
}

impl GameMode {
    pub fn name(&self) -> &'static str {
        match self {
            GameMode::Classic => "Classic",
            GameMode::Sprint => "Sprint",
        }
    }
}

/// How a session is started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameConfig {
    pub mode: GameMode,
    /// Sprint length in seconds
    pub time_limit: Option<u32>,
}

impl GameConfig {
    pub fn classic() -> Self {
        Self {
            mode: GameMode::Classic,
            time_limit: None,
        }
    }

    pub fn sprint(seconds: u32) -> Self {
        Self {
            mode: GameMode::Sprint,
            time_limit: Some(seconds),
        }
    }

    /// A sprint without a positive time limit has nothing to count down,
    /// so it plays as classic
    pub fn normalized(self) -> Self {
        match (self.mode, self.time_limit) {
            (GameMode::Sprint, Some(seconds)) if seconds > 0 => self,
            _ => Self::classic(),
        }
    }

    /// Seconds on the clock at start; zero outside sprint
    pub fn starting_time(&self) -> u32 {
        match self.mode {
            GameMode::Sprint => self.time_limit.unwrap_or(0),
            GameMode::Classic => 0,
        }
    }
}

/// Format whole seconds as M:SS
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprint_without_limit_falls_back_to_classic() {
        let config = GameConfig {
            mode: GameMode::Sprint,
            time_limit: None,
        };
        assert_eq!(config.normalized(), GameConfig::classic());
        assert_eq!(GameConfig::sprint(0).normalized(), GameConfig::classic());
    }

    #[test]
    fn test_valid_configs_are_kept() {
        assert_eq!(GameConfig::sprint(90).normalized(), GameConfig::sprint(90));
        assert_eq!(GameConfig::sprint(90).starting_time(), 90);
        // A stray limit on classic is dropped
        let classic = GameConfig {
            mode: GameMode::Classic,
            time_limit: Some(30),
        };
        assert_eq!(classic.normalized(), GameConfig::classic());
        assert_eq!(GameConfig::classic().starting_time(), 0);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(120), "2:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(9), "0:09");
    }
}
