//! Actor records: players, NPCs, and the health/inventory/equipment state
//! they share.

use std::collections::BTreeMap;

use crate::geometry::{Facing, Vec2};
use crate::ids::ActorId;
use crate::item::{Equipment, Inventory};
use crate::status::StatusInstance;

/// Archetype tag. Distinguishes a player-controlled actor from an
/// AI-controlled one for patch labeling and AI wiring; both share the same
/// health/inventory/status machinery.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActorKind {
    Player,
    Npc { archetype: String },
}

/// A path-follow target, set by a `path` command and cleared by `cancelPath`
/// or arrival.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathTarget {
    pub destination: Vec2,
}

/// Per-player bookkeeping not relevant to NPCs.
#[derive(Clone, Debug, Default)]
pub struct PlayerLink {
    pub last_heartbeat_secs: f64,
    pub last_processed_seq: u64,
}

/// Per-NPC bookkeeping: blackboard state and decision cadence.
#[derive(Clone, Debug, Default)]
pub struct AiLink {
    pub next_decision_tick: u64,
    pub blackboard: crate::ai::Blackboard,
}

/// A single actor: player or NPC, sharing one record shape so movement,
/// combat, and status code don't need to branch on identity.
#[derive(Clone, Debug)]
pub struct Actor {
    pub id: ActorId,
    pub kind: ActorKind,
    pub position: Vec2,
    pub facing: Facing,
    pub health: f32,
    pub max_health: Option<f32>,
    pub inventory: Inventory,
    pub equipment: Equipment,
    pub cooldowns: BTreeMap<String, f64>,
    pub statuses: Vec<StatusInstance>,
    pub last_intent: Vec2,
    pub path_target: Option<PathTarget>,
    pub player: Option<PlayerLink>,
    pub ai: Option<AiLink>,
}

impl Actor {
    pub fn new_player(id: ActorId, position: Vec2, max_health: f32) -> Self {
        Self {
            id,
            kind: ActorKind::Player,
            position,
            facing: Facing::Down,
            health: max_health,
            max_health: Some(max_health),
            inventory: Inventory::new(),
            equipment: Equipment::new(),
            cooldowns: BTreeMap::new(),
            statuses: Vec::new(),
            last_intent: Vec2::ZERO,
            path_target: None,
            player: Some(PlayerLink::default()),
            ai: None,
        }
    }

    pub fn new_npc(id: ActorId, archetype: impl Into<String>, position: Vec2, max_health: f32) -> Self {
        Self {
            id,
            kind: ActorKind::Npc { archetype: archetype.into() },
            position,
            facing: Facing::Down,
            health: max_health,
            max_health: Some(max_health),
            inventory: Inventory::new(),
            equipment: Equipment::new(),
            cooldowns: BTreeMap::new(),
            statuses: Vec::new(),
            last_intent: Vec2::ZERO,
            path_target: None,
            player: None,
            ai: Some(AiLink::default()),
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, ActorKind::Player)
    }

    pub fn is_npc(&self) -> bool {
        matches!(self.kind, ActorKind::Npc { .. })
    }

    /// Resolves the effective max health, falling back to the generic
    /// baseline for actors that declare none.
    pub fn effective_max_health(&self, generic_baseline: f32) -> f32 {
        self.max_health.unwrap_or(generic_baseline)
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0.0
    }

    /// Clamps `health` into `[0, max_health]`. Callers must have already
    /// rejected non-finite deltas before calling.
    pub fn clamp_health(&mut self, generic_baseline: f32) {
        let max = self.effective_max_health(generic_baseline);
        self.health = self.health.clamp(0.0, max);
    }

    pub fn find_status_mut(&mut self, status_type: &str) -> Option<&mut StatusInstance> {
        self.statuses.iter_mut().find(|s| s.status_type == status_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_actor_uses_baseline_when_unset() {
        let mut actor = Actor::new_npc(ActorId::new(1), "rat", Vec2::ZERO, 10.0);
        actor.max_health = None;
        assert_eq!(actor.effective_max_health(50.0), 50.0);
    }

    #[test]
    fn clamp_health_never_exceeds_max() {
        let mut actor = Actor::new_player(ActorId::new(1), Vec2::ZERO, 100.0);
        actor.health = 140.0;
        actor.clamp_health(100.0);
        assert_eq!(actor.health, 100.0);
    }
}
