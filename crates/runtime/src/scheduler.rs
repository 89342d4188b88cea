//! Fixed-rate scheduler: owns the [`Hub`] and drives it at `tick_rate_hz`,
//! interleaving inbound control commands between ticks.
//!
//! Grounded on two idioms from the corpus: the tokio interval tick loop
//! (`loop { interval.tick().await; ... }`) and the mpsc-command-plus-select!
//! worker shape used for the simulation actor this crate was built from.

use std::time::Duration;

use arena_core::{ActorId, Vec2, WorldConfig};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, instrument};

use crate::error::{Result, RuntimeError};
use crate::hub::Hub;
use crate::protocol::{ClientMessage, ServerMessage};

/// Requests the scheduler's owning task accepts over its command channel.
/// Every variant that needs a reply carries a `oneshot::Sender`; fire-and-forget
/// variants (client messages, disconnect) don't.
pub enum SchedulerCommand {
    Join { position: Vec2, max_health: f32, reply: oneshot::Sender<ActorId> },
    Subscribe { player: ActorId, outbox: mpsc::Sender<ServerMessage>, reply: oneshot::Sender<Result<()>> },
    ClientMessage { player: ActorId, message: ClientMessage, now: f64 },
    Disconnect { player: ActorId },
    Shutdown,
}

/// A cloneable handle used to talk to a running [`Scheduler`] from connection
/// tasks without sharing the world itself.
#[derive(Clone)]
pub struct SchedulerHandle {
    commands: mpsc::Sender<SchedulerCommand>,
}

impl SchedulerHandle {
    pub async fn join(&self, position: Vec2, max_health: f32) -> Result<ActorId> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(SchedulerCommand::Join { position, max_health, reply })
            .await
            .map_err(|_| RuntimeError::SchedulerClosed)?;
        rx.await.map_err(|_| RuntimeError::SchedulerClosed)
    }

    pub async fn subscribe(&self, player: ActorId, outbox: mpsc::Sender<ServerMessage>) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(SchedulerCommand::Subscribe { player, outbox, reply })
            .await
            .map_err(|_| RuntimeError::SchedulerClosed)?;
        rx.await.map_err(|_| RuntimeError::SchedulerClosed)?
    }

    pub async fn send_client_message(&self, player: ActorId, message: ClientMessage, now: f64) -> Result<()> {
        self.commands
            .send(SchedulerCommand::ClientMessage { player, message, now })
            .await
            .map_err(|_| RuntimeError::SchedulerClosed)
    }

    pub async fn disconnect(&self, player: ActorId) -> Result<()> {
        self.commands.send(SchedulerCommand::Disconnect { player }).await.map_err(|_| RuntimeError::SchedulerClosed)
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.commands.send(SchedulerCommand::Shutdown).await.map_err(|_| RuntimeError::SchedulerClosed)
    }
}

/// Owns the [`Hub`] and advances it at a fixed rate. Spawn [`Scheduler::run`]
/// as its own task; talk to it via the returned [`SchedulerHandle`].
pub struct Scheduler {
    hub: Hub,
    commands: mpsc::Receiver<SchedulerCommand>,
    tick_interval: Duration,
    now: f64,
}

impl Scheduler {
    /// Builds a scheduler and a handle to it. `now_fn` supplies wall-clock
    /// seconds at construction; the scheduler advances its own clock by
    /// `dt` every tick afterward so tests can drive it without a real clock.
    pub fn new(config: WorldConfig, now: f64, command_capacity: usize) -> (Self, SchedulerHandle) {
        let tick_interval = Duration::from_secs_f32(config.dt());
        let (tx, rx) = mpsc::channel(command_capacity);
        let scheduler = Self { hub: Hub::new(config), commands: rx, tick_interval, now };
        (scheduler, SchedulerHandle { commands: tx })
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    /// Runs the fixed-rate loop until a [`SchedulerCommand::Shutdown`]
    /// arrives or every handle is dropped. The world step itself never
    /// yields; only the wait between ticks and the command channel recv do.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        let mut interval = time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(tick_hz = 1.0 / self.tick_interval.as_secs_f32(), "scheduler started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.now += self.tick_interval.as_secs_f64();
                    self.hub.tick(self.now);
                }
                command = self.commands.recv() => {
                    match command {
                        Some(SchedulerCommand::Shutdown) | None => break,
                        Some(command) => self.handle_command(command),
                    }
                }
            }
        }

        info!("scheduler stopped");
    }

    fn handle_command(&mut self, command: SchedulerCommand) {
        match command {
            SchedulerCommand::Join { position, max_health, reply } => {
                let id = self.hub.join(position, max_health);
                let _ = reply.send(id);
            }
            SchedulerCommand::Subscribe { player, outbox, reply } => {
                let result = self.hub.subscribe(player, outbox);
                let _ = reply.send(result);
            }
            SchedulerCommand::ClientMessage { player, message, now } => {
                self.hub.handle_client_message(player, message, now);
            }
            SchedulerCommand::Disconnect { player } => {
                self.hub.disconnect(player);
            }
            SchedulerCommand::Shutdown => unreachable!("handled by the caller before dispatch"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn join_and_subscribe_round_trip_through_the_handle() {
        let (scheduler, handle) = Scheduler::new(WorldConfig::new(1, 100.0, 100.0), 0.0, 16);
        let run = tokio::spawn(scheduler.run());

        let player = handle.join(Vec2::new(1.0, 1.0), 100.0).await.unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        handle.subscribe(player, tx).await.unwrap();
        let frame = rx.recv().await.expect("initial snapshot");
        assert!(matches!(frame, ServerMessage::State(s) if s.resync));

        handle.shutdown().await.unwrap();
        run.await.unwrap();
    }

    #[tokio::test]
    async fn client_message_eventually_acks() {
        let (scheduler, handle) = Scheduler::new(WorldConfig::new(1, 100.0, 100.0), 0.0, 16);
        let run = tokio::spawn(scheduler.run());

        let player = handle.join(Vec2::ZERO, 100.0).await.unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        handle.subscribe(player, tx).await.unwrap();
        rx.recv().await.unwrap(); // initial snapshot

        handle
            .send_client_message(player, ClientMessage::Input { dx: 1.0, dy: 0.0, facing: None, seq: Some(1) }, 0.0)
            .await
            .unwrap();
        let mut saw_ack = false;
        for _ in 0..4 {
            match rx.recv().await.unwrap() {
                ServerMessage::CommandAck { seq: 1, .. } => {
                    saw_ack = true;
                    break;
                }
                _ => continue,
            }
        }
        assert!(saw_ack);

        handle.shutdown().await.unwrap();
        run.await.unwrap();
    }
}
