//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/blockfall/settings.toml (or platform equivalent)

use crate::bag::BagPolicy;
use crate::game::Action;
use crate::mode::{DEFAULT_SPRINT_SECONDS, GameConfig, GameMode};
use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Game settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Keybindings
    pub keys: KeyBindings,
    /// Gameplay settings
    pub gameplay: GameplaySettings,
}

/// Key bindings (stored as strings for easy editing)
/// Each action can have one or more keys bound to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_left: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_right: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_down: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate_counterclockwise: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub hard_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub hold: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub pause: Vec<String>,
}

/// Deserialize keys as either a single string or array of strings
fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct KeysVisitor;

    impl<'de> Visitor<'de> for KeysVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a key name or array of key names")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut keys = Vec::new();
            while let Some(key) = seq.next_element::<String>()? {
                keys.push(key);
            }
            Ok(keys)
        }
    }

    deserializer.deserialize_any(KeysVisitor)
}

/// Serialize keys: single key as string, multiple as array
fn serialize_keys<S>(keys: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;

    if let [key] = keys {
        serializer.serialize_str(key)
    } else {
        let mut seq = serializer.serialize_seq(Some(keys.len()))?;
        for key in keys {
            seq.serialize_element(key)?;
        }
        seq.end()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec!["ArrowLeft".to_string()],
            move_right: vec!["ArrowRight".to_string()],
            move_down: vec!["ArrowDown".to_string()],
            rotate: vec!["ArrowUp".to_string()],
            rotate_counterclockwise: vec!["KeyZ".to_string()],
            hard_drop: vec!["Space".to_string()],
            hold: vec!["KeyC".to_string()],
            pause: vec!["Escape".to_string()],
        }
    }
}

impl KeyBindings {
    fn bindings(&self) -> [(&[String], Action); 8] {
        [
            (&self.move_left[..], Action::MoveLeft),
            (&self.move_right[..], Action::MoveRight),
            (&self.move_down[..], Action::SoftDrop),
            (&self.rotate[..], Action::RotateCW),
            (&self.rotate_counterclockwise[..], Action::RotateCCW),
            (&self.hard_drop[..], Action::HardDrop),
            (&self.hold[..], Action::Hold),
            (&self.pause[..], Action::Pause),
        ]
    }

    /// Action for a binding name as written in `[keys]`, e.g. `hard_drop`
    pub fn action_named(name: &str) -> Option<Action> {
        let action = match name {
            "move_left" => Action::MoveLeft,
            "move_right" => Action::MoveRight,
            "move_down" => Action::SoftDrop,
            "rotate" => Action::RotateCW,
            "rotate_counterclockwise" => Action::RotateCCW,
            "hard_drop" => Action::HardDrop,
            "hold" => Action::Hold,
            "pause" => Action::Pause,
            _ => return None,
        };
        Some(action)
    }

    fn keys_mut(&mut self, action: Action) -> &mut Vec<String> {
        match action {
            Action::MoveLeft => &mut self.move_left,
            Action::MoveRight => &mut self.move_right,
            Action::SoftDrop => &mut self.move_down,
            Action::RotateCW => &mut self.rotate,
            Action::RotateCCW => &mut self.rotate_counterclockwise,
            Action::HardDrop => &mut self.hard_drop,
            Action::Hold => &mut self.hold,
            Action::Pause => &mut self.pause,
        }
    }

    /// Make `key` the only key for `action`, unbinding it everywhere else
    pub fn bind(&mut self, action: Action, key: &str) {
        for keys in [
            &mut self.move_left,
            &mut self.move_right,
            &mut self.move_down,
            &mut self.rotate,
            &mut self.rotate_counterclockwise,
            &mut self.hard_drop,
            &mut self.hold,
            &mut self.pause,
        ] {
            keys.retain(|k| k != key);
        }
        *self.keys_mut(action) = vec![key.to_string()];
    }

    /// Action bound to a key name; first binding wins on conflicts
    pub fn action_for(&self, key: &str) -> Option<Action> {
        self.bindings()
            .into_iter()
            .find(|(keys, _)| keys.iter().any(|k| k == key))
            .map(|(_, action)| action)
    }
}

/// Gameplay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// Mode used by a bare `start`
    pub default_mode: GameMode,
    /// Sprint length in seconds
    pub sprint_seconds: u32,
    /// Allow the rare extra pieces in a bag
    pub duplicate_pieces: bool,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            default_mode: GameMode::Classic,
            sprint_seconds: DEFAULT_SPRINT_SECONDS,
            duplicate_pieces: true,
        }
    }
}

impl GameplaySettings {
    /// Start config for a mode with the configured sprint length
    pub fn config_for(&self, mode: GameMode) -> GameConfig {
        match mode {
            GameMode::Classic => GameConfig::classic(),
            GameMode::Sprint => GameConfig::sprint(self.sprint_seconds),
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config_for(self.default_mode)
    }

    pub fn bag_policy(&self) -> BagPolicy {
        if self.duplicate_pieces {
            BagPolicy::default()
        } else {
            BagPolicy::strict()
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "blockfall", "blockfall")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Parse settings text; missing fields take their defaults
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Load settings from file, or fall back to defaults
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "invalid settings, using defaults");
                Self::default()
            }),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no settings file");
                Self::default()
            }
        }
    }

    /// Save settings to file
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::settings_path().context("could not determine config directory")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create config dir {}", dir.display()))?;
        }
        let contents = toml::to_string_pretty(self).context("failed to serialize settings")?;
        fs::write(path, contents)
            .with_context(|| format!("failed to write settings to {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let keys = KeyBindings::default();
        assert_eq!(keys.action_for("ArrowLeft"), Some(Action::MoveLeft));
        assert_eq!(keys.action_for("ArrowUp"), Some(Action::RotateCW));
        assert_eq!(keys.action_for("KeyZ"), Some(Action::RotateCCW));
        assert_eq!(keys.action_for("Space"), Some(Action::HardDrop));
        assert_eq!(keys.action_for("KeyC"), Some(Action::Hold));
        assert_eq!(keys.action_for("Escape"), Some(Action::Pause));
        assert_eq!(keys.action_for("KeyQ"), None);
    }

    #[test]
    fn test_keys_accept_string_or_list() {
        let settings = Settings::parse(
            r#"
            [keys]
            hard_drop = "Enter"
            rotate = ["ArrowUp", "KeyX"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.keys.hard_drop, vec!["Enter"]);
        assert_eq!(settings.keys.action_for("KeyX"), Some(Action::RotateCW));
        // Untouched actions keep their defaults
        assert_eq!(settings.keys.hold, vec!["KeyC"]);
        assert_eq!(settings.gameplay, GameplaySettings::default());
    }

    #[test]
    fn test_gameplay_section() {
        let settings = Settings::parse(
            r#"
            [gameplay]
            default_mode = "sprint"
            sprint_seconds = 90
            duplicate_pieces = false
            "#,
        )
        .unwrap();

        assert_eq!(settings.gameplay.config(), GameConfig::sprint(90));
        assert_eq!(settings.gameplay.bag_policy(), BagPolicy::strict());
        assert_eq!(Settings::default().gameplay.config(), GameConfig::classic());
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        assert!(Settings::parse("[gameplay]\nsprint_seconds = \"soon\"").is_err());
    }

    #[test]
    fn test_bind_moves_key_between_actions() {
        let mut keys = KeyBindings::default();
        keys.bind(Action::Hold, "Space");

        assert_eq!(keys.hold, vec!["Space"]);
        assert!(keys.hard_drop.is_empty());
        assert_eq!(keys.action_for("Space"), Some(Action::Hold));
        assert_eq!(keys.action_for("KeyC"), None);

        assert_eq!(KeyBindings::action_named("hard_drop"), Some(Action::HardDrop));
        assert_eq!(KeyBindings::action_named("quit"), None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir()
            .join(format!("blockfall-settings-{}", std::process::id()));
        let path = dir.join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.keys.bind(Action::RotateCW, "KeyX");
        settings.gameplay.sprint_seconds = 30;
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path), settings);
        fs::write(&path, "keys = 3").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_round_trip_keeps_single_keys_flat() {
        let text = toml::to_string_pretty(&Settings::default()).unwrap();
        assert!(text.contains("move_left = \"ArrowLeft\""));
        assert_eq!(Settings::parse(&text).unwrap(), Settings::default());
    }
}
