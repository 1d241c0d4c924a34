//! Single-writer actor that owns a [`Game`] on a tokio runtime
//!
//! Input commands, the gravity timer, the sprint clock and notification
//! expiry all reach the game through one task, so nothing else ever
//! mutates it. Observers read snapshots from a watch channel.

use crate::game::{Action, Game};
use crate::mode::{GameConfig, GameMode};
use crate::snapshot::GameSnapshot;
use anyhow::{Context, anyhow};
use std::future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep_until};
use tracing::{debug, info};

/// How long the four-line notification stays up
pub const TETRIS_NOTICE: Duration = Duration::from_millis(1500);
/// How long the perfect-clear notification stays up
pub const PERFECT_CLEAR_NOTICE: Duration = Duration::from_millis(2500);

const SPRINT_TICK: Duration = Duration::from_secs(1);

/// Requests accepted by the driver
#[derive(Debug)]
pub enum Command {
    Start(GameConfig),
    Restart,
    ResetToReady,
    Action(Action),
    /// Reply with the state as of this point in the command stream
    Snapshot(oneshot::Sender<GameSnapshot>),
    Shutdown,
}

/// Sending side of a running driver
#[derive(Debug)]
pub struct DriverHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<GameSnapshot>,
    task: JoinHandle<()>,
}

impl DriverHandle {
    pub fn send(&self, command: Command) -> anyhow::Result<()> {
        self.commands
            .send(command)
            .map_err(|_| anyhow!("game driver has stopped"))
    }

    /// Exact state after every command sent before this call
    pub async fn snapshot(&self) -> anyhow::Result<GameSnapshot> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot(reply))?;
        response
            .await
            .context("game driver dropped a snapshot request")
    }

    /// Latest published snapshot, updated after every change
    pub fn watch(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshots.clone()
    }

    /// Stop the actor and wait for it to finish
    pub async fn shutdown(self) -> anyhow::Result<()> {
        // Already stopped is fine
        let _ = self.commands.send(Command::Shutdown);
        self.task.await.context("game driver task failed")
    }
}

/// Spawn the actor on the given runtime
pub fn spawn_driver(handle: &Handle, game: Game) -> DriverHandle {
    let (commands, command_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshots) = watch::channel(game.snapshot());

    let task = handle.spawn(run(game, command_rx, snapshot_tx));

    DriverHandle {
        commands,
        snapshots,
        task,
    }
}

/// Timers derived from the game state; none run unless the game is running
#[derive(Default)]
struct Timers {
    gravity: Option<Interval>,
    gravity_period: Option<Duration>,
    sprint: Option<Interval>,
    tetris_until: Option<Instant>,
    perfect_clear_until: Option<Instant>,
}

impl Timers {
    fn repeating(period: Duration) -> Interval {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }

    /// Arm, re-arm or stop the periodic timers to match the game
    fn sync(&mut self, game: &Game) {
        if !game.is_running() {
            self.gravity = None;
            self.gravity_period = None;
            self.sprint = None;
            return;
        }

        let period = game.drop_interval();
        if self.gravity_period != Some(period) {
            debug!(period_ms = period.as_millis() as u64, "gravity re-armed");
            self.gravity = Some(Self::repeating(period));
            self.gravity_period = Some(period);
        }

        if game.mode() != GameMode::Sprint {
            self.sprint = None;
        } else if self.sprint.is_none() {
            self.sprint = Some(Self::repeating(SPRINT_TICK));
        }
    }

    /// Forget everything so the next sync starts fresh
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Start notification countdowns for a lock the game just reported
    fn notify(&mut self, game: &mut Game) {
        let Some(lock) = game.last_lock.take() else {
            return;
        };
        let now = Instant::now();
        if lock.tetris {
            self.tetris_until = Some(now + TETRIS_NOTICE);
        }
        if lock.perfect_clear {
            self.perfect_clear_until = Some(now + PERFECT_CLEAR_NOTICE);
        }
    }
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending().await,
    }
}

async fn expire(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => future::pending().await,
    }
}

async fn run(
    mut game: Game,
    mut commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<GameSnapshot>,
) {
    info!("game driver started");
    let mut timers = Timers::default();

    loop {
        timers.sync(&game);

        // Timers first: a due tick lands before a request made at the same instant
        tokio::select! {
            biased;

            _ = tick(&mut timers.gravity) => game.gravity(),
            _ = tick(&mut timers.sprint) => {
                let remaining = game.time_remaining().saturating_sub(1);
                game.tick_sprint_clock(remaining);
            }
            _ = expire(timers.tetris_until) => {
                timers.tetris_until = None;
                game.dismiss_tetris();
            }
            _ = expire(timers.perfect_clear_until) => {
                timers.perfect_clear_until = None;
                game.dismiss_perfect_clear();
            }
            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                match command {
                    Command::Start(config) => {
                        timers.reset();
                        game.start(config);
                    }
                    Command::Restart => {
                        timers.reset();
                        game.restart();
                    }
                    Command::ResetToReady => {
                        timers.reset();
                        game.reset_to_ready();
                    }
                    Command::Action(action) => {
                        debug!(?action, "action");
                        game.process_action(action);
                    }
                    Command::Snapshot(reply) => {
                        let _ = reply.send(game.snapshot());
                    }
                    Command::Shutdown => break,
                }
            }
        }

        timers.notify(&mut game);
        let next = game.snapshot();
        snapshots.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    info!("game driver stopped");
}
