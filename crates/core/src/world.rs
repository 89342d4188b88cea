//! The world: single-owner simulation state and the fixed-rate tick loop.

use std::collections::BTreeMap;
use std::sync::Arc as Rc;

use crate::ability::AbilityRegistry;
use crate::actor::{Actor, ActorKind};
use crate::ai::{AiContext, AiFsm, NearbyActor};
use crate::command::{Command, CommandPayload, CommandQueue, StageResult};
use crate::config::WorldConfig;
use crate::effect::{Effect, EffectKind, EffectSpawn};
use crate::geometry::{Aabb, Vec2};
use crate::ground_item::GroundItemLayer;
use crate::ids::{ActorId, EffectId, IdAllocator};
use crate::journal::{Journal, Patch, PatchEntity, PatchKind};
use crate::projectile::{ProjectileTemplate, TargetCandidate};
use crate::rng::WorldRng;
use crate::status::StatusRegistry;
use crate::telemetry::TelemetrySink;

/// A static rectangular hazard or obstacle.
#[derive(Clone, Debug)]
pub struct Obstacle {
    pub aabb: Aabb,
    pub obstacle_type: String,
}

/// A full or partial state frame ready for the subscription hub to encode.
/// Diff frames leave the collection fields `None`; snapshots populate all of
/// them. Patches always accompany a diff frame, even when empty.
#[derive(Clone, Debug, Default)]
pub struct StepOutput {
    pub tick: u64,
    pub resync: bool,
    pub patches: Vec<Patch>,
    /// Players removed this tick for missing `3 x heartbeat_interval` worth
    /// of heartbeats. The caller (subscription hub) must drop their
    /// subscriptions and force a keyframe for everyone else on this frame.
    pub disconnected_players: Vec<ActorId>,
}

/// The simulation's single-owner world. All mutation happens inside
/// [`World::step`]; nothing outside the tick loop touches these fields
/// directly except through the command queue and subscription reads.
pub struct World {
    pub config: WorldConfig,
    pub tick: u64,
    pub clock_secs: f64,
    pub rng: WorldRng,
    pub obstacles: Vec<Obstacle>,
    pub players: BTreeMap<ActorId, Actor>,
    pub npcs: BTreeMap<ActorId, Actor>,
    pub effects: BTreeMap<EffectId, Effect>,
    pub spatial_index: crate::spatial::SpatialIndex,
    pub ground_items: GroundItemLayer,
    pub status_registry: StatusRegistry,
    pub projectile_templates: BTreeMap<String, ProjectileTemplate>,
    pub ai_registry: BTreeMap<String, Rc<AiFsm>>,
    pub ability_registry: AbilityRegistry,
    pub journal: Journal,
    pub command_queue: CommandQueue,
    pub telemetry: TelemetrySink,
    pub reset_generation: u64,
    pub pending_resync: bool,
    actor_ids: IdAllocator,
    effect_ids: IdAllocator,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        let seed = config.seed;
        Self {
            rng: WorldRng::new(seed),
            config,
            tick: 0,
            clock_secs: 0.0,
            obstacles: Vec::new(),
            players: BTreeMap::new(),
            npcs: BTreeMap::new(),
            effects: BTreeMap::new(),
            spatial_index: crate::spatial::SpatialIndex::new(64.0, 256),
            ground_items: GroundItemLayer::new(64.0, 8.0, 24.0, 4.0),
            status_registry: StatusRegistry::new(),
            projectile_templates: BTreeMap::new(),
            ai_registry: BTreeMap::new(),
            ability_registry: AbilityRegistry::new(),
            journal: Journal::new(),
            command_queue: CommandQueue::new(32),
            telemetry: TelemetrySink::default(),
            reset_generation: 0,
            pending_resync: true,
            actor_ids: IdAllocator::new(),
            effect_ids: IdAllocator::new(),
        }
    }

    // -- lookups shared by combat/status/projectile/ai modules --

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.players.get(&id).or_else(|| self.npcs.get(&id))
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        if let Some(actor) = self.players.get_mut(&id) {
            return Some(actor);
        }
        self.npcs.get_mut(&id)
    }

    pub fn effect(&self, id: EffectId) -> Option<&Effect> {
        self.effects.get(&id)
    }

    pub fn effect_mut(&mut self, id: EffectId) -> Option<&mut Effect> {
        self.effects.get_mut(&id)
    }

    pub fn obstacle_overlap(&self, aabb: &Aabb) -> bool {
        self.obstacles.iter().any(|o| o.aabb.overlaps(aabb))
    }

    pub fn player_target_candidates(&self) -> Vec<TargetCandidate> {
        self.players
            .values()
            .map(|a| TargetCandidate { id: a.id, center: a.position, radius: self.config.actor_half_extent })
            .collect()
    }

    pub fn npc_target_candidates(&self) -> Vec<TargetCandidate> {
        self.npcs
            .values()
            .map(|a| TargetCandidate { id: a.id, center: a.position, radius: self.config.actor_half_extent })
            .collect()
    }

    pub fn dispatch_combat_hit(&mut self, effect_id: EffectId, target: ActorId, now: f64) {
        crate::combat::dispatch_hit(self, effect_id, target, now);
    }

    // -- spawning --

    pub fn spawn_player(&mut self, position: Vec2, max_health: f32) -> ActorId {
        let id = ActorId::new(self.actor_ids.allocate());
        self.players.insert(id, Actor::new_player(id, position, max_health));
        self.command_queue.register_actor(id);
        id
    }

    pub fn spawn_npc(&mut self, archetype: impl Into<String>, position: Vec2, max_health: f32) -> ActorId {
        let id = ActorId::new(self.actor_ids.allocate());
        self.npcs.insert(id, Actor::new_npc(id, archetype, position, max_health));
        id
    }

    pub fn remove_player(&mut self, id: ActorId) {
        self.players.remove(&id);
        self.command_queue.unregister_actor(id);
    }

    /// Spawns an effect from a contract intent. Refuses (returning `None`)
    /// when the spatial index is at capacity for the effect's cell.
    pub fn spawn_effect(&mut self, spawn: EffectSpawn, now: f64) -> Option<EffectId> {
        let id = EffectId::new(self.effect_ids.allocate());
        if !self.spatial_index.insert(id, spawn.aabb) {
            self.telemetry.spawn_refused("spatial index at capacity");
            return None;
        }
        let effect = Effect {
            id,
            kind: spawn.kind,
            owner: spawn.owner,
            aabb: spawn.aabb,
            circle: spawn.circle,
            spawn_tick: self.tick,
            expires_at: now + spawn.lifetime_secs,
            params: spawn.params,
            projectile: spawn.projectile,
            follow_actor: spawn.follow_actor,
            status_tag: spawn.status_tag,
            contract_managed: spawn.contract_managed,
        };
        self.effects.insert(id, effect);
        Some(id)
    }

    /// Casts `ability_id` for `actor_id` against its registered cooldown and
    /// effect shape, spawning the resulting effect on success. Returns the
    /// spawned effect's id, or `None` if the ability is unregistered, the
    /// actor is unknown, or the ability is still on cooldown.
    pub fn use_ability(&mut self, actor_id: ActorId, ability_id: &str, now: f64) -> Option<EffectId> {
        let spawn = crate::ability::cast(self, actor_id, ability_id, now)?;
        self.spawn_effect(spawn, now)
    }

    // -- AI plumbing --

    pub fn npc_ids_due_for_decision(&self) -> Vec<ActorId> {
        let mut ids: Vec<ActorId> = self
            .npcs
            .values()
            .filter(|a| a.ai.as_ref().is_some_and(|ai| ai.next_decision_tick <= self.tick))
            .map(|a| a.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn npc_archetype(&self, id: ActorId) -> Option<String> {
        match &self.npcs.get(&id)?.kind {
            ActorKind::Npc { archetype } => Some(archetype.clone()),
            _ => None,
        }
    }

    pub fn build_ai_context(&mut self, npc_id: ActorId, now: f64) -> Option<AiContext> {
        let npc = self.npcs.get(&npc_id)?;
        let position = npc.position;
        let blackboard = npc.ai.as_ref()?.blackboard.clone();

        let mut nearby: Vec<NearbyActor> = self
            .players
            .values()
            .map(|a| NearbyActor { id: a.id, position: a.position, tag: "player".to_string() })
            .collect();
        nearby.extend(self.npcs.values().filter(|a| a.id != npc_id).map(|a| NearbyActor {
            id: a.id,
            position: a.position,
            tag: match &a.kind {
                ActorKind::Npc { archetype } => archetype.clone(),
                _ => "npc".to_string(),
            },
        }));
        nearby.sort_by_key(|a| a.id);

        Some(AiContext {
            actor: npc_id,
            position,
            now,
            nearby,
            blackboard,
            random_unit: self.rng.unit_f32(),
            commands: Vec::new(),
        })
    }

    pub fn apply_ai_result(&mut self, npc_id: ActorId, blackboard: crate::ai::Blackboard, commands: Vec<crate::ai::AiCommand>, cadence_ticks: u64) {
        if let Some(npc) = self.npcs.get_mut(&npc_id) {
            if let Some(ai) = npc.ai.as_mut() {
                ai.blackboard = blackboard;
                ai.next_decision_tick = self.tick + cadence_ticks.max(1);
            }
        }
        for command in commands {
            self.apply_npc_command(npc_id, command);
        }
    }

    fn apply_npc_command(&mut self, npc_id: ActorId, command: crate::ai::AiCommand) {
        use crate::ai::AiCommand;
        let Some(npc) = self.npcs.get_mut(&npc_id) else { return };
        match command {
            AiCommand::Move { dx, dy } => npc.last_intent = Vec2::new(dx, dy),
            AiCommand::Face(facing) => npc.facing = facing,
            AiCommand::Action(ability) => {
                self.use_ability(npc_id, &ability, self.clock_secs);
            }
        }
    }

    // -- command staging --

    pub fn submit_command(&mut self, player: ActorId, sequence: u64, payload: Option<CommandPayload>) -> StageResult {
        self.command_queue.stage(player, self.tick, sequence, payload)
    }

    /// Refreshes a player's heartbeat timestamp directly, bypassing the
    /// sequence-numbered command queue: the wire protocol's `heartbeat`
    /// message carries no sequence number, so it cannot participate in the
    /// same dedup counter as input/path/action commands.
    pub fn heartbeat(&mut self, player: ActorId, sent_at_secs: f64) {
        if let Some(link) = self.players.get_mut(&player).and_then(|a| a.player.as_mut()) {
            link.last_heartbeat_secs = sent_at_secs;
        }
    }

    /// Players who haven't heartbeated within `3 x heartbeat_interval`.
    /// Removes them from the world and returns their IDs so the caller can
    /// drop the matching subscriptions and force a keyframe.
    fn expire_stale_heartbeats(&mut self, now: f64) -> Vec<ActorId> {
        let timeout = self.config.heartbeat_timeout_secs() as f64;
        let stale: Vec<ActorId> = self
            .players
            .values()
            .filter(|actor| actor.player.as_ref().is_some_and(|link| now - link.last_heartbeat_secs > timeout))
            .map(|actor| actor.id)
            .collect();
        for id in &stale {
            self.remove_player(*id);
        }
        stale
    }

    // -- tick loop --

    /// Advances the world by one fixed tick. `now` is the wall-clock instant
    /// in seconds since an arbitrary epoch; `dt` is `config.dt()`.
    pub fn step(&mut self, now: f64, dt: f32) -> StepOutput {
        self.clock_secs = now;
        let disconnected_players = self.expire_stale_heartbeats(now);
        self.drain_commands();
        crate::ai::run(self, now);
        self.apply_movement(dt);
        self.resolve_collisions();
        self.advance_effects(now, dt);
        self.advance_statuses(now);
        self.cleanup(now);

        let resync = self.pending_resync || !disconnected_players.is_empty();
        self.pending_resync = false;
        let patches = self.journal.drain();
        self.tick += 1;

        StepOutput { tick: self.tick, resync, patches, disconnected_players }
    }

    fn drain_commands(&mut self) {
        let staged = self.command_queue.drain();
        for (player, commands) in staged {
            for command in commands {
                self.apply_command_if_new(player, command);
            }
        }
    }

    fn apply_command_if_new(&mut self, player: ActorId, command: Command) {
        let Some(actor) = self.players.get_mut(&player) else { return };
        let Some(link) = actor.player.as_mut() else { return };
        if command.sequence <= link.last_processed_seq {
            return;
        }
        link.last_processed_seq = command.sequence;

        match command.payload {
            CommandPayload::Input { dx, dy, facing } => {
                actor.last_intent = Vec2::new(dx, dy);
                if let Some(facing) = facing {
                    actor.facing = facing;
                }
                self.journal.push(PatchEntity::Actor(player), PatchKind::PlayerIntent(Vec2::new(dx, dy)));
            }
            CommandPayload::Path { destination } => {
                actor.path_target = Some(crate::actor::PathTarget { destination });
            }
            CommandPayload::CancelPath => {
                actor.path_target = None;
            }
            CommandPayload::Action { action } => {
                drop(actor);
                self.use_ability(player, &action, self.clock_secs);
            }
            CommandPayload::Heartbeat { sent_at_secs } => {
                if let Some(link) = self.players.get_mut(&player).and_then(|a| a.player.as_mut()) {
                    link.last_heartbeat_secs = sent_at_secs;
                }
            }
            CommandPayload::Console { .. } | CommandPayload::KeyframeRequest { .. } | CommandPayload::KeyframeCadence { .. } => {
                // Handled by the subscription hub, not the world step.
            }
        }
    }

    fn apply_movement(&mut self, dt: f32) {
        let half = self.config.actor_half_extent;
        let (width, height) = (self.config.world_width, self.config.world_height);
        let speed = self.config.actor_speed;
        for actor in self.players.values_mut().chain(self.npcs.values_mut()) {
            let intent = actor.last_intent;
            if intent.length_sq() == 0.0 || !intent.is_finite() {
                continue;
            }
            let unit = intent.normalized();
            if unit.length_sq() == 0.0 {
                continue;
            }
            actor.facing = unit.to_facing();
            let candidate = actor.position.add(unit.scale(speed * dt));
            let clamped = Vec2::new(candidate.x.clamp(half, width - half), candidate.y.clamp(half, height - half));
            let moved_aabb = Aabb::square(clamped, half);
            if self.obstacles.iter().any(|o| o.aabb.overlaps(&moved_aabb)) {
                continue;
            }
            actor.position = clamped;
        }
        self.journal_actor_patches();
    }

    fn journal_actor_patches(&mut self) {
        let entries: Vec<(ActorId, Vec2, crate::geometry::Facing, bool)> = self
            .players
            .values()
            .map(|a| (a.id, a.position, a.facing, true))
            .chain(self.npcs.values().map(|a| (a.id, a.position, a.facing, false)))
            .collect();
        for (id, position, facing, is_player) in entries {
            let (pos_kind, facing_kind) = if is_player {
                (PatchKind::PlayerPos(position), PatchKind::PlayerFacing(facing))
            } else {
                (PatchKind::NpcPos(position), PatchKind::NpcFacing(facing))
            };
            self.journal.push(PatchEntity::Actor(id), pos_kind);
            self.journal.push(PatchEntity::Actor(id), facing_kind);
        }
    }

    fn resolve_collisions(&mut self) {
        let half = self.config.actor_half_extent;
        let min_separation = 2.0 * half;
        let mut ids: Vec<ActorId> = self.players.keys().chain(self.npcs.keys()).copied().collect();
        ids.sort_unstable();

        for _ in 0..self.config.collision_iterations {
            let mut moved = false;
            for i in 0..ids.len() {
                for j in (i + 1)..ids.len() {
                    let (a_pos, b_pos) = match (self.actor(ids[i]), self.actor(ids[j])) {
                        (Some(a), Some(b)) => (a.position, b.position),
                        _ => continue,
                    };
                    let delta = b_pos.sub(a_pos);
                    let distance = delta.length();
                    if distance >= min_separation || distance <= f32::EPSILON {
                        continue;
                    }
                    let push = (min_separation - distance) * 0.5;
                    let direction = delta.normalized();
                    if let Some(a) = self.actor_mut(ids[i]) {
                        a.position = a.position.sub(direction.scale(push));
                    }
                    if let Some(b) = self.actor_mut(ids[j]) {
                        b.position = b.position.add(direction.scale(push));
                    }
                    moved = true;
                }
            }
            if !moved {
                break;
            }
        }
    }

    fn advance_effects(&mut self, now: f64, dt: f32) {
        let projectile_ids: Vec<EffectId> = self
            .effects
            .values()
            .filter(|e| e.kind == EffectKind::Projectile)
            .map(|e| e.id)
            .collect();
        for id in projectile_ids {
            crate::projectile::advance(self, id, now, dt);
        }

        let melee_ids: Vec<EffectId> = self
            .effects
            .values()
            .filter(|e| matches!(e.kind, EffectKind::Melee | EffectKind::AreaExplosion))
            .map(|e| e.id)
            .collect();
        for id in melee_ids {
            self.resolve_static_effect_overlap(id, now);
        }
    }

    fn resolve_static_effect_overlap(&mut self, effect_id: EffectId, now: f64) {
        let Some(effect) = self.effect(effect_id) else { return };
        let aabb = effect.aabb;
        let players = self.player_target_candidates();
        let npcs = self.npc_target_candidates();
        let mut hits = Vec::new();
        for candidate in players.iter().chain(npcs.iter()) {
            if crate::geometry::circle_rect_overlap(candidate.center, candidate.radius, &aabb) {
                hits.push(candidate.id);
            }
        }
        for target in hits {
            self.dispatch_combat_hit(effect_id, target, now);
        }
    }

    fn advance_statuses(&mut self, now: f64) {
        let ids: Vec<ActorId> = self.players.keys().chain(self.npcs.keys()).copied().collect();
        for id in ids {
            crate::status::advance(self, id, now);
        }

        for obstacle in self.obstacles.iter().filter(|o| o.obstacle_type == "lava").cloned().collect::<Vec<_>>() {
            let candidates: Vec<ActorId> = self
                .players
                .values()
                .chain(self.npcs.values())
                .filter(|a| crate::geometry::circle_rect_overlap(a.position, self.config.actor_half_extent, &obstacle.aabb))
                .map(|a| a.id)
                .collect();
            for actor_id in candidates {
                crate::status::apply(self, actor_id, "burning", actor_id, now);
            }
        }
    }

    fn cleanup(&mut self, now: f64) {
        let expired: Vec<EffectId> = self.effects.values().filter(|e| e.is_expired(now)).map(|e| e.id).collect();
        for id in expired {
            self.effects.remove(&id);
            self.spatial_index.remove(id);
        }

        let defeated_npcs: Vec<ActorId> = self.npcs.values().filter(|a| a.is_defeated()).map(|a| a.id).collect();
        for id in defeated_npcs {
            self.npcs.remove(&id);
        }
        let defeated_players: Vec<ActorId> = self.players.values().filter(|a| a.is_defeated()).map(|a| a.id).collect();
        for id in defeated_players {
            self.players.remove(&id);
        }
    }

    // -- reset --

    /// Rebuilds the world from `config`, clearing all transient state and
    /// flagging the next broadcast as a resync.
    pub fn reset(&mut self, config: WorldConfig) {
        let fresh = World::new(config);
        let registries = (
            std::mem::take(&mut self.status_registry),
            std::mem::take(&mut self.projectile_templates),
            std::mem::take(&mut self.ai_registry),
            std::mem::take(&mut self.ability_registry),
        );
        *self = fresh;
        self.status_registry = registries.0;
        self.projectile_templates = registries.1;
        self.ai_registry = registries.2;
        self.ability_registry = registries.3;
        self.reset_generation += 1;
        self.journal.clear();
        self.pending_resync = true;
    }

    // -- default content --

    /// Registers the built-in ability, status, and projectile definitions,
    /// wires the goblin AI archetype, and spawns one goblin NPC at the
    /// arena's center. This is the content a running server starts with;
    /// a bare [`World::new`] stays empty so unit tests can register exactly
    /// what they need.
    pub fn seed_default_content(&mut self) {
        self.ability_registry.register(crate::ability::AbilityDefinition {
            ability_id: "attack".to_string(),
            cooldown_secs: 1.0,
            effect: crate::ability::AbilityEffect::Melee {
                reach: self.config.actor_half_extent + 12.0,
                half_extent: 12.0,
                health_delta: -10.0,
                lifetime_secs: 0.15,
            },
            status_tag: Some("bleeding".to_string()),
        });
        self.ability_registry.register(crate::ability::AbilityDefinition {
            ability_id: "throw".to_string(),
            cooldown_secs: 1.5,
            effect: crate::ability::AbilityEffect::Projectile { template: "arrow".to_string() },
            status_tag: None,
        });

        self.status_registry.register(
            crate::status::StatusDefinition {
                status_type: "bleeding".to_string(),
                duration_secs: 3.0,
                tick_interval_secs: 1.0,
                initial_tick: false,
            },
            crate::status::StatusHooks { on_apply: None, on_tick: tick_bleeding, on_expire: None },
        );
        self.status_registry.register(
            crate::status::StatusDefinition {
                status_type: "burning".to_string(),
                duration_secs: 4.0,
                tick_interval_secs: 1.0,
                initial_tick: true,
            },
            crate::status::StatusHooks { on_apply: None, on_tick: tick_burning, on_expire: None },
        );

        self.projectile_templates.insert("arrow".to_string(), arrow_template());

        self.ai_registry.insert("goblin".to_string(), Rc::new(crate::ai::goblin_fsm(160.0, 24.0)));
        let center = Vec2::new(self.config.world_width * 0.5, self.config.world_height * 0.5);
        let goblin = self.spawn_npc("goblin", center, 40.0);
        if let Some(npc) = self.npcs.get_mut(&goblin) {
            if let Some(ai) = npc.ai.as_mut() {
                ai.blackboard.waypoints = vec![center, center.add(Vec2::new(60.0, 0.0))];
            }
        }
    }
}

fn tick_bleeding(world: &mut World, target: ActorId, _now: f64) {
    apply_tick_damage(world, target, 2.0);
}

fn tick_burning(world: &mut World, target: ActorId, _now: f64) {
    apply_tick_damage(world, target, 3.0);
}

fn apply_tick_damage(world: &mut World, target: ActorId, amount: f32) {
    let generic_baseline = world.config.generic_max_health;
    let Some(actor) = world.actor_mut(target) else { return };
    let max = actor.effective_max_health(generic_baseline);
    let previous = actor.health;
    actor.health = (actor.health - amount).clamp(0.0, max);
    let applied_delta = actor.health - previous;
    if applied_delta == 0.0 {
        return;
    }
    let is_player = actor.is_player();
    let new_health = actor.health;
    let kind = if is_player { PatchKind::PlayerHealth(new_health) } else { PatchKind::NpcHealth(new_health) };
    world.journal.push(PatchEntity::Actor(target), kind);
    world.telemetry.damage(target, "status", -applied_delta);
    if new_health == 0.0 {
        world.telemetry.defeat(target, target);
    }
}

fn arrow_template() -> ProjectileTemplate {
    let mut params = BTreeMap::new();
    params.insert("healthDelta".to_string(), -8.0);
    ProjectileTemplate {
        projectile_type: "arrow".to_string(),
        speed: 300.0,
        max_distance: 400.0,
        lifetime_secs: 2.0,
        spawn_radius: 2.0,
        spawn_offset: 4.0,
        collision_shape: crate::projectile::CollisionShape::Circle,
        collision_radius: 4.0,
        impact_rules: crate::projectile::ImpactRules {
            stop_on_hit: true,
            max_targets: 1,
            affects_owner: false,
            explode_on_impact: false,
            explode_on_expiry: false,
            expiry_only_if_no_hits: false,
        },
        params,
        cooldown_secs: 1.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_counter_is_monotone() {
        let mut world = World::new(WorldConfig::default());
        let first = world.step(0.0, world.config.dt()).tick;
        let second = world.step(1.0 / 15.0, world.config.dt()).tick;
        assert_eq!(second, first + 1);
    }

    #[test]
    fn health_stays_in_bounds_after_step() {
        let mut world = World::new(WorldConfig::default());
        let id = world.spawn_player(Vec2::new(100.0, 100.0), 100.0);
        world.step(0.0, world.config.dt());
        let actor = world.actor(id).unwrap();
        assert!(actor.health >= 0.0 && actor.health <= 100.0);
    }

    #[test]
    fn duplicate_sequence_is_ignored() {
        let mut world = World::new(WorldConfig::default());
        let id = world.spawn_player(Vec2::new(100.0, 100.0), 100.0);
        world.submit_command(id, 1, Some(CommandPayload::Input { dx: 1.0, dy: 0.0, facing: None }));
        world.step(0.0, world.config.dt());
        let pos_after_first = world.actor(id).unwrap().position;

        world.submit_command(id, 1, Some(CommandPayload::Input { dx: 0.0, dy: 1.0, facing: None }));
        world.step(1.0 / 15.0, world.config.dt());
        let pos_after_duplicate = world.actor(id).unwrap().position;
        assert_eq!(pos_after_first, pos_after_duplicate);
    }

    #[test]
    fn reset_bumps_generation_and_resync() {
        let mut world = World::new(WorldConfig::default());
        world.step(0.0, world.config.dt());
        world.reset(WorldConfig::default());
        assert_eq!(world.reset_generation, 1);
        assert!(world.pending_resync);
        assert_eq!(world.tick, 0);
    }
}
