//! Projectile templates, per-tick advance, overlap resolution, and stop
//! semantics.

use std::collections::BTreeMap;

use crate::geometry::{circle_rect_overlap, Aabb, Facing, Vec2};
use crate::ids::{ActorId, EffectId};
use crate::world::World;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionShape {
    Rect,
    Circle,
}

/// Rules governing how a projectile reacts to hitting targets or expiring.
#[derive(Clone, Debug)]
pub struct ImpactRules {
    pub stop_on_hit: bool,
    pub max_targets: u32,
    pub affects_owner: bool,
    pub explode_on_impact: bool,
    pub explode_on_expiry: bool,
    /// Suppress the expiry explosion if the projectile scored at least one
    /// hit before running out of range/lifetime.
    pub expiry_only_if_no_hits: bool,
}

/// Immutable description of a projectile type, registered once per world.
#[derive(Clone, Debug)]
pub struct ProjectileTemplate {
    pub projectile_type: String,
    pub speed: f32,
    pub max_distance: f32,
    pub lifetime_secs: f64,
    pub spawn_radius: f32,
    pub spawn_offset: f32,
    pub collision_shape: CollisionShape,
    pub collision_radius: f32,
    pub impact_rules: ImpactRules,
    pub params: BTreeMap<String, f32>,
    pub cooldown_secs: f64,
}

impl ProjectileTemplate {
    /// World position a projectile of this template spawns at, given its
    /// owner's position, half-extent, and facing.
    pub fn spawn_position(&self, owner_position: Vec2, owner_half_extent: f32, facing: Facing) -> Vec2 {
        let offset = owner_half_extent + self.spawn_radius + self.spawn_offset;
        owner_position.add(facing.unit_vector().scale(offset))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Impact,
    Expiry,
    Stopped,
}

/// Mutable per-instance projectile state, stored on the owning [`crate::effect::Effect`].
#[derive(Clone, Debug)]
pub struct ProjectileState {
    pub template_type: String,
    pub velocity_unit: Vec2,
    pub remaining_range: f32,
    pub hit_count: u32,
    pub hit_set: Vec<ActorId>,
    pub expiry_resolved: bool,
}

impl ProjectileState {
    pub fn new(template: &ProjectileTemplate, velocity_unit: Vec2) -> Self {
        Self {
            template_type: template.projectile_type.clone(),
            velocity_unit,
            remaining_range: template.max_distance,
            hit_count: 0,
            hit_set: Vec::new(),
            expiry_resolved: false,
        }
    }

    pub fn has_hit(&self, target: ActorId) -> bool {
        self.hit_set.contains(&target)
    }
}

/// One candidate target for overlap resolution: an actor id, its overlap
/// center, and the radius used for the circle-rect test.
pub struct TargetCandidate {
    pub id: ActorId,
    pub center: Vec2,
    pub radius: f32,
}

/// Runs the overlap contract (spec 4.4.1) against `players` then `npcs`,
/// mutating `state`'s hit-set/hit-count and invoking `on_hit` for each newly
/// struck target. Returns whether iteration stopped early due to
/// `stop_on_hit` or `max_targets`.
pub fn resolve_overlaps(
    state: &mut ProjectileState,
    rules: &ImpactRules,
    owner: ActorId,
    aabb: &Aabb,
    players: &[TargetCandidate],
    npcs: &[TargetCandidate],
    mut on_hit: impl FnMut(ActorId),
) -> bool {
    let mut any_hit = false;
    for candidate in players.iter().chain(npcs.iter()) {
        if candidate.id == owner && !rules.affects_owner {
            continue;
        }
        if !circle_rect_overlap(candidate.center, candidate.radius, aabb) {
            continue;
        }
        if state.has_hit(candidate.id) {
            continue;
        }
        state.hit_set.push(candidate.id);
        state.hit_count += 1;
        any_hit = true;
        on_hit(candidate.id);

        if rules.stop_on_hit || (rules.max_targets > 0 && state.hit_count >= rules.max_targets) {
            return true;
        }
    }
    let _ = any_hit;
    false
}

/// Advances one projectile effect by `dt`: moves it, tests obstacles, tests
/// lifetime, then resolves target overlaps. `effect_id` must currently carry
/// `Some(ProjectileState)`; this is a logic error otherwise and the call is
/// a no-op.
pub fn advance(world: &mut World, effect_id: EffectId, now: f64, dt: f32) {
    // Gather everything needed from the effect up front so later calls can
    // borrow `world` freely without an `Effect` reference still in scope.
    let Some((template_type, velocity_unit, expiry_resolved, owner, old_expires_at, old_half_extent)) =
        world.effect(effect_id).and_then(|e| {
            let state = e.projectile.as_ref()?;
            Some((state.template_type.clone(), state.velocity_unit, state.expiry_resolved, e.owner, e.expires_at, e.aabb.half_extent))
        })
    else {
        return;
    };
    if expiry_resolved {
        return;
    }
    let Some(template) = world.projectile_templates.get(&template_type).cloned() else { return };

    let delta = velocity_unit.scale(template.speed * dt);
    let Some(effect) = world.effect(effect_id) else { return };
    let old_center = effect.aabb.center;
    let new_center = old_center.add(delta);
    if !new_center.is_finite() {
        stop(world, effect_id, now, StopReason::Stopped);
        return;
    }

    let half_extent = if template.collision_shape == CollisionShape::Circle {
        Vec2::new(template.collision_radius, template.collision_radius)
    } else {
        old_half_extent
    };
    let new_aabb = Aabb::new(new_center, half_extent);

    let remaining_range = {
        let Some(effect) = world.effect_mut(effect_id) else { return };
        effect.aabb = new_aabb;
        let Some(state) = effect.projectile.as_mut() else { return };
        state.remaining_range = (state.remaining_range - delta.length()).max(0.0);
        state.remaining_range
    };

    world.spatial_index.update(effect_id, new_aabb);
    world
        .journal
        .push(crate::journal::PatchEntity::Effect(effect_id), crate::journal::PatchKind::EffectPos(new_center));

    if world.obstacle_overlap(&new_aabb) {
        stop(world, effect_id, now, StopReason::Impact);
        return;
    }

    let is_expired = remaining_range <= 0.0 || now >= old_expires_at;

    let rules = template.impact_rules.clone();
    let players = world.player_target_candidates();
    let npcs = world.npc_target_candidates();

    let mut newly_hit = Vec::new();
    let should_stop = {
        let Some(effect) = world.effect_mut(effect_id) else { return };
        let Some(state) = effect.projectile.as_mut() else { return };
        resolve_overlaps(state, &rules, owner, &new_aabb, &players, &npcs, |hit| newly_hit.push(hit))
    };

    if !newly_hit.is_empty() {
        world.telemetry.attack_overlap(effect_id, &newly_hit);
    }
    for target in &newly_hit {
        world.dispatch_combat_hit(effect_id, *target, now);
    }

    if should_stop {
        stop(world, effect_id, now, StopReason::Impact);
    } else if is_expired {
        stop(world, effect_id, now, StopReason::Expiry);
    }
}

/// Terminates a projectile: zeroes remaining range, optionally spawns an
/// impact/expiry explosion, marks it resolved, clamps `expires_at`, and
/// emits effect-end telemetry.
pub fn stop(world: &mut World, effect_id: EffectId, now: f64, reason: StopReason) {
    let Some(effect) = world.effect_mut(effect_id) else { return };
    let Some(state) = effect.projectile.as_mut() else { return };
    if state.expiry_resolved {
        return;
    }
    state.remaining_range = 0.0;
    state.expiry_resolved = true;
    effect.expires_at = effect.expires_at.min(now);

    let hit_count = state.hit_count;
    let owner = effect.owner;
    let center = effect.aabb.center;
    let template_type = state.template_type.clone();

    let Some(template) = world.projectile_templates.get(&template_type).cloned() else {
        world.telemetry.effect_end(effect_id, reason);
        return;
    };

    let should_explode = match reason {
        StopReason::Impact => template.impact_rules.explode_on_impact,
        StopReason::Expiry => template.impact_rules.explode_on_expiry && !(template.impact_rules.expiry_only_if_no_hits && hit_count > 0),
        StopReason::Stopped => false,
    };

    if should_explode {
        let radius = template.params.get("radius").copied().unwrap_or(12.0);
        let damage = template.params.get("healthDelta").copied().unwrap_or_else(|| -template.params.get("damage").copied().unwrap_or(0.0));
        let lifetime = template.params.get("explosionLifetimeSecs").copied().unwrap_or(0.5) as f64;
        let spawn = crate::effect::EffectSpawn::area_explosion(owner, center, radius, damage, lifetime);
        world.spawn_effect(spawn, now);
    }

    world.telemetry.effect_end(effect_id, reason);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(stop_on_hit: bool, max_targets: u32) -> ImpactRules {
        ImpactRules {
            stop_on_hit,
            max_targets,
            affects_owner: false,
            explode_on_impact: false,
            explode_on_expiry: false,
            expiry_only_if_no_hits: false,
        }
    }

    #[test]
    fn max_targets_stops_after_limit() {
        let template = ProjectileTemplate {
            projectile_type: "arrow".into(),
            speed: 10.0,
            max_distance: 100.0,
            lifetime_secs: 2.0,
            spawn_radius: 0.0,
            spawn_offset: 0.0,
            collision_shape: CollisionShape::Circle,
            collision_radius: 2.0,
            impact_rules: rules(false, 2),
            params: BTreeMap::new(),
            cooldown_secs: 0.0,
        };
        let mut state = ProjectileState::new(&template, Vec2::new(1.0, 0.0));
        let owner = ActorId::new(99);
        let aabb = Aabb::square(Vec2::ZERO, 2.0);
        let targets: Vec<TargetCandidate> = (1..=3)
            .map(|i| TargetCandidate { id: ActorId::new(i), center: Vec2::ZERO, radius: 1.0 })
            .collect();
        let mut hits = Vec::new();
        let stopped = resolve_overlaps(&mut state, &template.impact_rules, owner, &aabb, &targets, &[], |id| hits.push(id));
        assert!(stopped);
        assert_eq!(hits.len(), 2);
        assert_eq!(state.hit_count, 2);
    }

    #[test]
    fn affects_owner_false_skips_self() {
        let mut state = ProjectileState {
            template_type: "arrow".into(),
            velocity_unit: Vec2::new(1.0, 0.0),
            remaining_range: 10.0,
            hit_count: 0,
            hit_set: Vec::new(),
            expiry_resolved: false,
        };
        let owner = ActorId::new(1);
        let rules = rules(false, 0);
        let targets = vec![TargetCandidate { id: owner, center: Vec2::ZERO, radius: 1.0 }];
        let mut hits = Vec::new();
        resolve_overlaps(&mut state, &rules, owner, &Aabb::square(Vec2::ZERO, 1.0), &targets, &[], |id| hits.push(id));
        assert!(hits.is_empty());
    }
}
