//! Subscription hub: join/subscribe/disconnect, snapshot vs. diff frame
//! selection, keyframe cadence and recovery, and command ack/reject
//! dispatch. Everything here runs synchronously inside the tick loop driven
//! by [`crate::scheduler::Scheduler`] — the world step itself never yields,
//! so outbound writes use a bounded channel and a full channel is treated as
//! a terminal subscription failure rather than something worth blocking on.

use std::collections::BTreeMap;

use arena_core::command::StageResult;
use arena_core::{ActorId, StepOutput, Vec2, World, WorldConfig};
use tokio::sync::mpsc;

use crate::error::{Result, RuntimeError};
use crate::events::{ConnectionEvent, Event, EventBus};
use crate::protocol::{ClientMessage, EffectView, GroundItemView, NpcView, ObstacleView, PlayerView, ServerMessage, StateFrame};

/// Per-client fan-out state. `outbox` is bounded: a slow or wedged client
/// eventually fills it, at which point the hub drops the subscription rather
/// than stall the tick loop.
struct Subscription {
    outbox: mpsc::Sender<ServerMessage>,
    keyframe_cadence: u64,
    ticks_since_keyframe: u64,
}

/// Owns the simulation world and the set of live client subscriptions.
pub struct Hub {
    world: World,
    subscriptions: BTreeMap<ActorId, Subscription>,
    events: EventBus,
}

type Views = (Vec<PlayerView>, Vec<NpcView>, Vec<ObstacleView>, Vec<EffectView>, Vec<GroundItemView>);

fn build_views(world: &World) -> Views {
    let baseline = world.config.generic_max_health;
    let players = world.players.values().map(|a| PlayerView::from_actor(a, baseline)).collect();
    let npcs = world.npcs.values().map(|a| NpcView::from_actor(a, baseline)).collect();
    let obstacles = world.obstacles.iter().map(ObstacleView::from_obstacle).collect();
    let effects = world.effects.values().map(EffectView::from_effect).collect();
    let ground_items = world.ground_items.iter().map(GroundItemView::from_ground_item).collect();
    (players, npcs, obstacles, effects, ground_items)
}

fn snapshot_frame(world: &World, views: Views) -> StateFrame {
    StateFrame {
        tick: world.tick,
        sequence: world.tick,
        resync: true,
        players: Some(views.0),
        npcs: Some(views.1),
        obstacles: Some(views.2),
        effects: Some(views.3),
        ground_items: Some(views.4),
        patches: Vec::new(),
        server_time: world.clock_secs,
        config: Some(world.config.clone()),
    }
}

impl Hub {
    pub fn new(config: WorldConfig) -> Self {
        Self::with_events(config, EventBus::new())
    }

    pub fn with_events(config: WorldConfig, events: EventBus) -> Self {
        let mut world = World::new(config);
        world.seed_default_content();
        Self { world, subscriptions: BTreeMap::new(), events }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Allocates a new player actor. Returns its ID; the caller still has to
    /// call [`Hub::subscribe`] to attach an outbound channel.
    pub fn join(&mut self, position: Vec2, max_health: f32) -> ActorId {
        let id = self.world.spawn_player(position, max_health);
        self.events.publish(Event::Connection(ConnectionEvent::Joined(id)));
        id
    }

    /// Attaches an outbound channel to an already-joined player and sends the
    /// initial full snapshot with `resync = true`.
    pub fn subscribe(&mut self, player: ActorId, outbox: mpsc::Sender<ServerMessage>) -> Result<()> {
        if self.world.actor(player).is_none() {
            return Err(RuntimeError::UnknownSubscription(player));
        }
        let frame = snapshot_frame(&self.world, build_views(&self.world));
        if outbox.try_send(ServerMessage::State(frame)).is_err() {
            return Err(RuntimeError::SubscriptionClosed(player));
        }
        self.subscriptions.insert(
            player,
            Subscription { outbox, keyframe_cadence: self.world.config.default_keyframe_cadence, ticks_since_keyframe: 0 },
        );
        self.events.publish(Event::Connection(ConnectionEvent::Subscribed(player)));
        Ok(())
    }

    /// Removes a player and its subscription, e.g. on inbound channel close.
    pub fn disconnect(&mut self, player: ActorId) {
        self.world.remove_player(player);
        self.drop_subscription(player);
    }

    /// Routes one inbound client message. Input/path/cancelPath/action stage
    /// into the world's sequence-numbered command queue; heartbeat, console,
    /// and the keyframe controls are handled here directly since they carry
    /// no wire sequence number of their own.
    pub fn handle_client_message(&mut self, player: ActorId, msg: ClientMessage, now: f64) {
        match &msg {
            ClientMessage::Heartbeat { sent_at } => {
                self.world.heartbeat(player, *sent_at);
                let rtt = (now - *sent_at).max(0.0);
                self.send(player, ServerMessage::Heartbeat { server_time: now, client_time: *sent_at, rtt });
                return;
            }
            ClientMessage::KeyframeRequest { keyframe_seq } => {
                self.handle_keyframe_request(player, *keyframe_seq);
                return;
            }
            ClientMessage::KeyframeCadence { keyframe_interval } => {
                if let Some(sub) = self.subscriptions.get_mut(&player) {
                    sub.keyframe_cadence = (*keyframe_interval).max(1);
                }
                return;
            }
            ClientMessage::Console { .. } => return,
            _ => {}
        }
        let sequence = msg.sequence().unwrap_or(0);
        let Some(payload) = msg.into_command_payload() else { return };
        let result = self.world.submit_command(player, sequence, Some(payload));
        self.send_stage_result(player, result);
    }

    /// `requestedSeq` ahead of the current tick has nothing to serve: the hub
    /// keeps no historical snapshot log, so it nacks with the tick it *can*
    /// serve. A `requestedSeq` at or behind the current tick is always
    /// satisfiable by the current full snapshot.
    fn handle_keyframe_request(&mut self, player: ActorId, requested_seq: u64) {
        if requested_seq > self.world.tick {
            self.send(player, ServerMessage::KeyframeNack { requested_seq, earliest_available_seq: self.world.tick });
            return;
        }
        let frame = snapshot_frame(&self.world, build_views(&self.world));
        if let Some(sub) = self.subscriptions.get_mut(&player) {
            sub.ticks_since_keyframe = 0;
        }
        self.send(player, ServerMessage::State(frame));
    }

    fn send_stage_result(&mut self, player: ActorId, result: StageResult) {
        match result {
            StageResult::Accepted { sequence, origin_tick } => {
                self.send(player, ServerMessage::CommandAck { seq: sequence, tick: Some(origin_tick) });
            }
            StageResult::Rejected { sequence, reason } => {
                let retry = reason.retry();
                self.send(player, ServerMessage::CommandReject { seq: sequence, reason: reason.into(), retry });
            }
        }
    }

    /// Advances the world by one tick and fans out the resulting frame to
    /// every subscriber.
    pub fn tick(&mut self, now: f64) -> StepOutput {
        let dt = self.world.config.dt();
        let output = self.world.step(now, dt);
        for id in &output.disconnected_players {
            self.drop_subscription(*id);
        }
        self.broadcast(&output, now);
        output
    }

    fn broadcast(&mut self, output: &StepOutput, now: f64) {
        if self.subscriptions.is_empty() {
            return;
        }
        let views = build_views(&self.world);
        let config = self.world.config.clone();
        let players: Vec<ActorId> = self.subscriptions.keys().copied().collect();
        for player in players {
            let needs_keyframe = output.resync
                || self.subscriptions.get(&player).is_some_and(|sub| sub.ticks_since_keyframe + 1 >= sub.keyframe_cadence);
            let frame = if needs_keyframe {
                StateFrame {
                    tick: output.tick,
                    sequence: output.tick,
                    resync: true,
                    players: Some(views.0.clone()),
                    npcs: Some(views.1.clone()),
                    obstacles: Some(views.2.clone()),
                    effects: Some(views.3.clone()),
                    ground_items: Some(views.4.clone()),
                    patches: output.patches.clone(),
                    server_time: now,
                    config: Some(config.clone()),
                }
            } else {
                StateFrame {
                    tick: output.tick,
                    sequence: output.tick,
                    resync: false,
                    patches: output.patches.clone(),
                    server_time: now,
                    ..Default::default()
                }
            };
            if let Some(sub) = self.subscriptions.get_mut(&player) {
                sub.ticks_since_keyframe = if needs_keyframe { 0 } else { sub.ticks_since_keyframe + 1 };
            }
            self.send(player, ServerMessage::State(frame));
        }
    }

    fn send(&mut self, player: ActorId, msg: ServerMessage) {
        let Some(sub) = self.subscriptions.get(&player) else { return };
        if sub.outbox.try_send(msg).is_err() {
            self.drop_subscription(player);
        }
    }

    fn drop_subscription(&mut self, player: ActorId) {
        if self.subscriptions.remove(&player).is_some() {
            self.events.publish(Event::Connection(ConnectionEvent::Disconnected(player)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub() -> Hub {
        Hub::new(WorldConfig::new(7, 200.0, 200.0))
    }

    #[test]
    fn subscribe_unknown_player_is_rejected() {
        let mut hub = hub();
        let (tx, _rx) = mpsc::channel(8);
        let err = hub.subscribe(ActorId::new(99), tx).unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownSubscription(_)));
    }

    #[test]
    fn subscribe_sends_initial_snapshot() {
        let mut hub = hub();
        let player = hub.join(Vec2::new(10.0, 10.0), 100.0);
        let (tx, mut rx) = mpsc::channel(8);
        hub.subscribe(player, tx).unwrap();
        let msg = rx.try_recv().expect("initial snapshot");
        match msg {
            ServerMessage::State(frame) => {
                assert!(frame.resync);
                assert_eq!(frame.players.unwrap().len(), 1);
            }
            _ => panic!("expected a state frame"),
        }
    }

    #[test]
    fn tick_sends_diff_frame_without_forced_keyframe() {
        let mut hub = hub();
        let player = hub.join(Vec2::new(10.0, 10.0), 100.0);
        let (tx, mut rx) = mpsc::channel(8);
        hub.subscribe(player, tx).unwrap();
        rx.try_recv().unwrap(); // initial snapshot

        hub.tick(0.0);
        let msg = rx.try_recv().expect("diff frame");
        match msg {
            ServerMessage::State(frame) => assert!(!frame.resync),
            _ => panic!("expected a state frame"),
        }
    }

    #[test]
    fn keyframe_request_ahead_of_tick_is_nacked() {
        let mut hub = hub();
        let player = hub.join(Vec2::new(10.0, 10.0), 100.0);
        let (tx, mut rx) = mpsc::channel(8);
        hub.subscribe(player, tx).unwrap();
        rx.try_recv().unwrap();

        hub.handle_client_message(player, ClientMessage::KeyframeRequest { keyframe_seq: 1000 }, 0.0);
        let msg = rx.try_recv().expect("keyframe nack");
        assert!(matches!(msg, ServerMessage::KeyframeNack { requested_seq: 1000, earliest_available_seq: 0 }));
    }

    #[test]
    fn heartbeat_stale_disconnects_player_and_forces_keyframe_for_survivors() {
        let mut hub = hub();
        let stale = hub.join(Vec2::new(0.0, 0.0), 100.0);
        let survivor = hub.join(Vec2::new(5.0, 5.0), 100.0);
        let (stale_tx, mut stale_rx) = mpsc::channel(8);
        let (survivor_tx, mut survivor_rx) = mpsc::channel(8);
        hub.subscribe(stale, stale_tx).unwrap();
        hub.subscribe(survivor, survivor_tx).unwrap();
        stale_rx.try_recv().unwrap();
        survivor_rx.try_recv().unwrap();
        hub.handle_client_message(survivor, ClientMessage::Heartbeat { sent_at: 9.0 }, 9.0);
        survivor_rx.try_recv().unwrap(); // heartbeat reply

        hub.tick(10.0); // `stale` never heartbeats; default timeout is 6s
        assert!(hub.world().actor(stale).is_none());
        assert!(hub.world().actor(survivor).is_some());
        assert!(stale_rx.try_recv().is_err());
        let msg = survivor_rx.try_recv().expect("forced keyframe for the survivor");
        match msg {
            ServerMessage::State(frame) => assert!(frame.resync),
            _ => panic!("expected a state frame"),
        }
    }

    #[test]
    fn input_command_is_acked() {
        let mut hub = hub();
        let player = hub.join(Vec2::new(0.0, 0.0), 100.0);
        let (tx, mut rx) = mpsc::channel(8);
        hub.subscribe(player, tx).unwrap();
        rx.try_recv().unwrap();

        hub.handle_client_message(player, ClientMessage::Input { dx: 1.0, dy: 0.0, facing: None, seq: Some(1) }, 0.0);
        let msg = rx.try_recv().expect("command ack");
        assert!(matches!(msg, ServerMessage::CommandAck { seq: 1, .. }));
    }
}
