//! Cooldown-tracked ability gates: the sole place cooldown registries are
//! mutated for ability emission, and the registry mapping each ability id to
//! the effect it produces once its gate opens.

use std::collections::BTreeMap;

use crate::actor::Actor;
use crate::effect::EffectSpawn;
use crate::geometry::{Aabb, Vec2};
use crate::ids::ActorId;
use crate::world::World;

/// A snapshot of the actor that successfully passed a gate, handed to the
/// caller so it can build the resulting effect spawn without a second
/// lookup.
pub struct GatedOwner {
    pub id: ActorId,
    pub position: crate::geometry::Vec2,
    pub facing: crate::geometry::Facing,
}

impl From<&Actor> for GatedOwner {
    fn from(actor: &Actor) -> Self {
        Self { id: actor.id, position: actor.position, facing: actor.facing }
    }
}

/// The effect shape one ability id produces when it fires.
#[derive(Clone, Debug)]
pub enum AbilityEffect {
    /// A short-lived damage volume `reach` units in front of the owner,
    /// sized by `half_extent`.
    Melee { reach: f32, half_extent: f32, health_delta: f32, lifetime_secs: f64 },
    /// Instantiates the named [`crate::projectile::ProjectileTemplate`] in
    /// front of the owner, travelling along its facing.
    Projectile { template: String },
}

/// Declares an ability's cooldown and the effect it casts. Built once per
/// world and consulted (never mutated) whenever an actor acts.
#[derive(Clone, Debug)]
pub struct AbilityDefinition {
    pub ability_id: String,
    pub cooldown_secs: f64,
    pub effect: AbilityEffect,
    /// Status type applied to whatever the resulting effect hits, if any.
    pub status_tag: Option<String>,
}

/// World-scoped table of ability definitions.
#[derive(Clone, Default)]
pub struct AbilityRegistry {
    entries: BTreeMap<String, AbilityDefinition>,
}

impl AbilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: AbilityDefinition) {
        self.entries.insert(definition.ability_id.clone(), definition);
    }

    pub fn get(&self, ability_id: &str) -> Option<&AbilityDefinition> {
        self.entries.get(ability_id)
    }
}

/// Tests and atomically sets the cooldown entry for `(actor, ability_id)`.
///
/// Returns `Some(owner)` if the ability may fire (and records `now` as the
/// new cooldown baseline in the same call), or `None` if the actor is
/// unknown or still on cooldown. This is the only function that writes to
/// an actor's cooldown map.
pub fn gate(world: &mut World, actor_id: ActorId, ability_id: &str, now: f64, cooldown_secs: f64) -> Option<GatedOwner> {
    let actor = world.actor_mut(actor_id)?;
    let last = actor.cooldowns.get(ability_id).copied();
    if let Some(last) = last {
        if now - last < cooldown_secs {
            return None;
        }
    }
    actor.cooldowns.insert(ability_id.to_string(), now);
    Some(GatedOwner::from(&*actor))
}

fn melee_spawn(owner: &GatedOwner, reach: f32, half_extent: f32, health_delta: f32, lifetime_secs: f64) -> EffectSpawn {
    let center = owner.position.add(owner.facing.unit_vector().scale(reach));
    EffectSpawn::melee(owner.id, Aabb::square(center, half_extent), health_delta, lifetime_secs)
}

fn projectile_spawn(world: &World, owner: &GatedOwner, template: &crate::projectile::ProjectileTemplate) -> EffectSpawn {
    use crate::projectile::{CollisionShape, ProjectileState};

    let center = template.spawn_position(owner.position, world.config.actor_half_extent, owner.facing);
    let half_extent = match template.collision_shape {
        CollisionShape::Circle => Vec2::new(template.collision_radius, template.collision_radius),
        CollisionShape::Rect => Vec2::new(world.config.actor_half_extent, world.config.actor_half_extent),
    };
    EffectSpawn {
        kind: crate::effect::EffectKind::Projectile,
        owner: owner.id,
        aabb: Aabb::new(center, half_extent),
        circle: None,
        lifetime_secs: template.lifetime_secs,
        params: template.params.clone(),
        projectile: Some(ProjectileState::new(template, owner.facing.unit_vector())),
        follow_actor: None,
        status_tag: None,
        contract_managed: true,
    }
}

/// Looks up `ability_id` in the world's registry, gates it against the
/// actor's cooldown, and if it opens, builds the `EffectSpawn` the
/// definition declares. Returns `None` if the ability is unregistered, the
/// actor is unknown, the cooldown hasn't elapsed, or the ability names an
/// unregistered projectile template.
pub fn cast(world: &mut World, actor_id: ActorId, ability_id: &str, now: f64) -> Option<EffectSpawn> {
    let definition = world.ability_registry.get(ability_id)?.clone();
    let owner = gate(world, actor_id, ability_id, now, definition.cooldown_secs)?;
    let mut spawn = match &definition.effect {
        AbilityEffect::Melee { reach, half_extent, health_delta, lifetime_secs } => {
            melee_spawn(&owner, *reach, *half_extent, *health_delta, *lifetime_secs)
        }
        AbilityEffect::Projectile { template } => {
            let template = world.projectile_templates.get(template)?.clone();
            projectile_spawn(world, &owner, &template)
        }
    };
    spawn.status_tag = definition.status_tag.clone();
    Some(spawn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::geometry::Vec2;

    #[test]
    fn gate_blocks_within_cooldown() {
        let mut world = World::new(WorldConfig::default());
        let id = world.spawn_player(Vec2::ZERO, 100.0);
        assert!(gate(&mut world, id, "attack", 0.0, 1.0).is_some());
        assert!(gate(&mut world, id, "attack", 0.5, 1.0).is_none());
        assert!(gate(&mut world, id, "attack", 1.5, 1.0).is_some());
    }

    fn register_melee(world: &mut World) {
        world.ability_registry.register(AbilityDefinition {
            ability_id: "attack".to_string(),
            cooldown_secs: 1.0,
            effect: AbilityEffect::Melee { reach: 20.0, half_extent: 12.0, health_delta: -10.0, lifetime_secs: 0.15 },
            status_tag: Some("bleeding".to_string()),
        });
    }

    #[test]
    fn cast_spawns_a_melee_effect_in_front_of_the_owner() {
        let mut world = World::new(WorldConfig::default());
        register_melee(&mut world);
        let id = world.spawn_player(Vec2::new(50.0, 50.0), 100.0);

        let spawn = cast(&mut world, id, "attack", 0.0).expect("registered ability should cast");
        assert_eq!(spawn.owner, id);
        assert_eq!(spawn.status_tag.as_deref(), Some("bleeding"));
        assert_ne!(spawn.aabb.center, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn cast_respects_the_definitions_cooldown() {
        let mut world = World::new(WorldConfig::default());
        register_melee(&mut world);
        let id = world.spawn_player(Vec2::ZERO, 100.0);

        assert!(cast(&mut world, id, "attack", 0.0).is_some());
        assert!(cast(&mut world, id, "attack", 0.5).is_none());
    }

    #[test]
    fn cast_returns_none_for_an_unregistered_ability() {
        let mut world = World::new(WorldConfig::default());
        let id = world.spawn_player(Vec2::ZERO, 100.0);
        assert!(cast(&mut world, id, "unknown", 0.0).is_none());
    }
}
