//! Effect instances: the runtime record shared by melee swings, projectiles,
//! area explosions, status-visual attachments, and burning auras.

use std::collections::BTreeMap;

use crate::geometry::{Aabb, Vec2};
use crate::ids::{ActorId, EffectId};

/// What kind of effect this instance represents. Distinct from the effect's
/// params map: the kind decides which subsystem advances the effect each
/// tick (projectile engine vs. plain lifetime countdown).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    Melee,
    Projectile,
    AreaExplosion,
    StatusVisual,
}

/// Circular collision shape, used alongside the effect's AABB for
/// circle-rect overlap tests against actors.
#[derive(Clone, Copy, Debug)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

/// Runtime instance of an effect: one record per melee swing, projectile,
/// explosion, or status-visual attachment currently alive in the world.
#[derive(Clone, Debug)]
pub struct Effect {
    pub id: EffectId,
    pub kind: EffectKind,
    pub owner: ActorId,
    pub aabb: Aabb,
    pub circle: Option<Circle>,
    pub spawn_tick: u64,
    pub expires_at: f64,
    pub params: BTreeMap<String, f32>,
    pub projectile: Option<crate::projectile::ProjectileState>,
    pub follow_actor: Option<ActorId>,
    pub status_tag: Option<String>,
    /// Set for effects spawned indirectly (e.g. impact explosions) so
    /// cleanup knows they were registered through the allocator/registrar
    /// path rather than a direct ability gate.
    pub contract_managed: bool,
}

impl Effect {
    pub fn param(&self, key: &str) -> Option<f32> {
        self.params.get(key).copied()
    }

    pub fn health_delta(&self) -> f32 {
        self.param("healthDelta").unwrap_or(0.0)
    }

    pub fn is_expired(&self, now: f64) -> bool {
        now >= self.expires_at
    }
}

/// Spawn-time description of an effect, consumed by [`crate::world::World::spawn_effect`].
/// This is the "contract intent" the design notes describe: a normalized,
/// allocator-agnostic description that ability gates and the projectile
/// engine both produce.
pub struct EffectSpawn {
    pub kind: EffectKind,
    pub owner: ActorId,
    pub aabb: Aabb,
    pub circle: Option<Circle>,
    pub lifetime_secs: f64,
    pub params: BTreeMap<String, f32>,
    pub projectile: Option<crate::projectile::ProjectileState>,
    pub follow_actor: Option<ActorId>,
    pub status_tag: Option<String>,
    pub contract_managed: bool,
}

impl EffectSpawn {
    pub fn melee(owner: ActorId, aabb: Aabb, health_delta: f32, lifetime_secs: f64) -> Self {
        let mut params = BTreeMap::new();
        params.insert("healthDelta".to_string(), health_delta);
        Self {
            kind: EffectKind::Melee,
            owner,
            aabb,
            circle: None,
            lifetime_secs,
            params,
            projectile: None,
            follow_actor: None,
            status_tag: None,
            contract_managed: false,
        }
    }

    pub fn area_explosion(owner: ActorId, center: Vec2, radius: f32, health_delta: f32, lifetime_secs: f64) -> Self {
        let mut params = BTreeMap::new();
        params.insert("healthDelta".to_string(), health_delta);
        params.insert("radius".to_string(), radius);
        Self {
            kind: EffectKind::AreaExplosion,
            owner,
            aabb: Aabb::square(center, radius),
            circle: Some(Circle { center, radius }),
            lifetime_secs,
            params,
            projectile: None,
            follow_actor: None,
            status_tag: None,
            contract_managed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_delta_defaults_to_zero() {
        let params = BTreeMap::new();
        let effect = Effect {
            id: EffectId::new(1),
            kind: EffectKind::Melee,
            owner: ActorId::new(1),
            aabb: Aabb::square(Vec2::ZERO, 1.0),
            circle: None,
            spawn_tick: 0,
            expires_at: 0.0,
            params,
            projectile: None,
            follow_actor: None,
            status_tag: None,
            contract_managed: false,
        };
        assert_eq!(effect.health_delta(), 0.0);
    }
}
