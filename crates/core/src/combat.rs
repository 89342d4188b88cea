//! Effect-hit resolution: health delta clamping, telemetry fan-out,
//! defeat/drop-inventory, and status application.
//!
//! The dispatcher is a set of plain functions rather than a struct of
//! trait-object hooks: the only configurable knob is the generic-actor
//! health fallback via [`crate::actor::Actor::effective_max_health`].
//! Telemetry hooks are the world's [`crate::telemetry::Publisher`],
//! constructed once and reused.

use crate::ids::{ActorId, EffectId};
use crate::journal::{PatchEntity, PatchKind};
use crate::world::World;

/// Three-valued result of attempting a generic-actor health mutation,
/// matching the spec's `(changed, appliedDelta, newHealth)` adapter.
struct HealthMutation {
    changed: bool,
    applied_delta: f32,
    new_health: f32,
}

/// Implements the combat hit dispatcher contract: given `(effect, target,
/// now)`, clamps the health delta, emits telemetry in canonical order, and
/// applies the effect's carried status (if any).
pub fn dispatch_hit(world: &mut World, effect_id: EffectId, target: ActorId, now: f64) {
    let Some(effect) = world.effect(effect_id) else { return };
    let delta = effect.health_delta();
    if delta == 0.0 || !delta.is_finite() {
        return;
    }
    let status_tag = effect.status_tag.clone();
    let source = effect.owner;

    let Some(actor) = world.actor(target) else { return };
    if actor.is_defeated() {
        return;
    }
    let current_health = actor.health;
    let max_health = actor.effective_max_health(world.config.generic_max_health);
    let desired = (current_health + delta).clamp(0.0, max_health);

    if (desired - current_health).abs() < world.config.health_epsilon {
        return;
    }

    let mutation = apply_health(world, target, desired);
    if !mutation.changed {
        return;
    }

    world.telemetry.effect_hit(effect_id, target, mutation.applied_delta);

    if mutation.applied_delta < 0.0 {
        world.telemetry.damage(target, "attack", -mutation.applied_delta);
    }

    let defeated = mutation.new_health == 0.0;
    if defeated {
        world.telemetry.defeat(target, source);
        drop_all_inventory(world, target);
    }

    if mutation.applied_delta < 0.0 {
        if let Some(status_tag) = status_tag {
            crate::status::apply(world, target, &status_tag, source, now);
        }
    }
}

fn apply_health(world: &mut World, target: ActorId, new_health: f32) -> HealthMutation {
    let Some(actor) = world.actor_mut(target) else {
        return HealthMutation { changed: false, applied_delta: 0.0, new_health: 0.0 };
    };
    let previous = actor.health;
    actor.health = new_health;
    let applied_delta = new_health - previous;
    let changed = applied_delta != 0.0;

    let kind_is_player = actor.is_player();
    if changed {
        let kind = if kind_is_player {
            PatchKind::PlayerHealth(new_health)
        } else {
            PatchKind::NpcHealth(new_health)
        };
        world.journal.push(PatchEntity::Actor(target), kind);
    }

    HealthMutation { changed, applied_delta, new_health }
}

/// Drops every stack in `target`'s inventory and equipment onto the ground,
/// one [`crate::ground_item::GroundItemLayer::upsert`] call per stack, then
/// emits an (empty) `PlayerInventory`/`NpcInventory` patch.
fn drop_all_inventory(world: &mut World, target: ActorId) {
    let Some(actor) = world.actor_mut(target) else { return };
    let position = actor.position;
    let is_player = actor.is_player();
    let inventory_stacks = actor.inventory.drain_all();
    let equipment_stacks: Vec<_> = actor.equipment.drain_all().into_iter().map(|(_, stack)| stack).collect();

    let seed = world.config.seed;
    for stack in inventory_stacks.into_iter().chain(equipment_stacks) {
        world
            .ground_items
            .upsert(&mut world.rng, seed, position, stack, "death-drop", &mut world.journal);
    }

    let kind = if is_player { PatchKind::PlayerInventory(Vec::new()) } else { PatchKind::NpcInventory(Vec::new()) };
    world.journal.push(PatchEntity::Actor(target), kind);
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    proptest! {
        /// Clamping must keep health in `[0, max]` for any starting health,
        /// delta, and max-health the dispatcher could be handed.
        #[test]
        fn clamp_keeps_health_in_bounds(
            current in 0.0f32..=1000.0,
            delta in -2000.0f32..=2000.0,
            max in 1.0f32..=1000.0,
        ) {
            let current = current.min(max);
            let desired = (current + delta).clamp(0.0, max);
            prop_assert!(desired >= 0.0 && desired <= max);
        }
    }

    #[test]
    fn epsilon_suppresses_tiny_deltas() {
        // Exercised indirectly via world-level integration tests; this module's
        // unit tests focus on the pure epsilon/clamp arithmetic path.
        let current = 50.0_f32;
        let max = 100.0_f32;
        let delta = 0.0001_f32;
        let desired = (current + delta).clamp(0.0, max);
        assert!((desired - current).abs() < 0.001);
    }

    #[test]
    fn healing_clamps_to_max() {
        let current = 95.0_f32;
        let max = 100.0_f32;
        let delta = 50.0_f32;
        let desired = (current + delta).clamp(0.0, max);
        assert_eq!(desired, max);
    }
}
