//! BLOCKFALL - headless front end
//!
//! Reads one key name or command per line from stdin and prints game
//! snapshots as JSON on stdout. Logs go to a file in the temp dir.

use anyhow::{Context, bail};
use blockfall::driver::{Command, DriverHandle, spawn_driver};
use blockfall::game::{Action, Game};
use blockfall::mode::{GameConfig, GameMode};
use blockfall::settings::{GameplaySettings, KeyBindings, Settings};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::{info, warn};

/// Get the blockfall temp directory, creating it if needed
fn blockfall_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("blockfall");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// A parsed stdin line
#[derive(Debug, PartialEq)]
enum Line {
    Start(GameConfig),
    Restart,
    Ready,
    Show,
    Quit,
    /// Rebind an action and persist the settings
    Bind(Action, String),
    ResetKeys,
    Key(String),
}

fn parse_line(line: &str, gameplay: &GameplaySettings) -> anyhow::Result<Line> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        bail!("empty line");
    };

    let parsed = match word {
        "start" => Line::Start(parse_start(words.next(), words.next(), gameplay)?),
        "restart" => Line::Restart,
        "ready" => Line::Ready,
        "show" => Line::Show,
        "quit" => Line::Quit,
        "bind" => {
            let (Some(name), Some(key)) = (words.next(), words.next()) else {
                bail!("usage: bind <action> <key>");
            };
            let action = KeyBindings::action_named(name)
                .with_context(|| format!("unknown action {name:?}"))?;
            Line::Bind(action, key.to_string())
        }
        "reset-keys" => Line::ResetKeys,
        key => Line::Key(key.to_string()),
    };
    Ok(parsed)
}

fn parse_start(
    mode: Option<&str>,
    seconds: Option<&str>,
    gameplay: &GameplaySettings,
) -> anyhow::Result<GameConfig> {
    let config = match (mode, seconds) {
        (None, _) => gameplay.config(),
        (Some("classic"), _) => gameplay.config_for(GameMode::Classic),
        (Some("sprint"), None) => gameplay.config_for(GameMode::Sprint),
        (Some("sprint"), Some(seconds)) => {
            let seconds = seconds
                .parse()
                .with_context(|| format!("invalid sprint length {seconds:?}"))?;
            GameConfig::sprint(seconds)
        }
        (Some(other), _) => bail!("unknown mode {other:?}"),
    };
    Ok(config)
}

fn save_settings(settings: &Settings) {
    if let Err(e) = settings.save() {
        warn!(error = %e, "could not save settings");
        eprintln!("Warning: Could not save settings: {e:#}");
    }
}

fn print_snapshot(runtime: &Runtime, driver: &DriverHandle) -> anyhow::Result<()> {
    let snapshot = runtime.block_on(driver.snapshot())?;
    let json = serde_json::to_string(&snapshot).context("failed to encode snapshot")?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}")?;
    stdout.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    let log_dir = blockfall_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file; stdout carries the snapshots
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blockfall=debug".parse()?),
        )
        .with_ansi(false)
        .init();

    info!(
        "BLOCKFALL starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let mut settings = Settings::load();

    let runtime = Runtime::new().context("failed to create async runtime")?;
    let mut game = Game::new();
    game.set_bag_policy(settings.gameplay.bag_policy());
    let driver = spawn_driver(runtime.handle(), game);

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let parsed = match parse_line(&line, &settings.gameplay) {
            Ok(parsed) => parsed,
            Err(e) => {
                eprintln!("{e:#}");
                continue;
            }
        };

        match parsed {
            Line::Start(config) => driver.send(Command::Start(config))?,
            Line::Restart => driver.send(Command::Restart)?,
            Line::Ready => driver.send(Command::ResetToReady)?,
            Line::Show => print_snapshot(&runtime, &driver)?,
            Line::Quit => break,
            Line::Bind(action, key) => {
                info!(?action, key = %key, "rebinding");
                settings.keys.bind(action, &key);
                save_settings(&settings);
            }
            Line::ResetKeys => {
                settings.keys = KeyBindings::default();
                save_settings(&settings);
            }
            Line::Key(key) => match settings.keys.action_for(&key) {
                Some(action) => driver.send(Command::Action(action))?,
                None => {
                    warn!(key = %key, "unbound key");
                    eprintln!("unbound key {key:?}");
                }
            },
        }
    }

    print_snapshot(&runtime, &driver)?;
    runtime.block_on(driver.shutdown())?;
    info!("BLOCKFALL shutting down");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let gameplay = GameplaySettings::default();
        assert_eq!(parse_line("restart", &gameplay).unwrap(), Line::Restart);
        assert_eq!(parse_line("  show ", &gameplay).unwrap(), Line::Show);
        assert_eq!(
            parse_line("ArrowLeft", &gameplay).unwrap(),
            Line::Key("ArrowLeft".to_string())
        );
        assert!(parse_line("", &gameplay).is_err());
    }

    #[test]
    fn test_parse_bind() {
        let gameplay = GameplaySettings::default();
        assert_eq!(
            parse_line("bind hold KeyX", &gameplay).unwrap(),
            Line::Bind(Action::Hold, "KeyX".to_string())
        );
        assert_eq!(parse_line("reset-keys", &gameplay).unwrap(), Line::ResetKeys);
        assert!(parse_line("bind hold", &gameplay).is_err());
        assert!(parse_line("bind teleport KeyT", &gameplay).is_err());
    }

    #[test]
    fn test_parse_start() {
        let gameplay = GameplaySettings {
            sprint_seconds: 45,
            ..GameplaySettings::default()
        };
        assert_eq!(parse_start(None, None, &gameplay).unwrap(), GameConfig::classic());
        assert_eq!(
            parse_start(Some("sprint"), None, &gameplay).unwrap(),
            GameConfig::sprint(45)
        );
        assert_eq!(
            parse_start(Some("sprint"), Some("90"), &gameplay).unwrap(),
            GameConfig::sprint(90)
        );
        assert!(parse_start(Some("sprint"), Some("soon"), &gameplay).is_err());
        assert!(parse_start(Some("marathon"), None, &gameplay).is_err());
    }
}
